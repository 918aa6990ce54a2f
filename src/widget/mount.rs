use crate::render::{CarouselState, ViewNode};

/// Where a widget puts its content.
pub trait MountPoint: Send {
    /// Replace everything under the mount point.
    fn replace(&mut self, content: ViewNode);

    /// Point the image with `data-image-id == image_id` at `src`.
    fn set_image_source(&mut self, image_id: &str, src: &str);

    /// Move the carousel track and update its controls.
    fn set_carousel(&mut self, state: &CarouselState);

    fn clear(&mut self);
}

/// Mount point that keeps the view tree in memory and serializes it on
/// demand.
#[derive(Debug, Default)]
pub struct HtmlMount {
    content: Option<ViewNode>,
    replacements: usize,
}

impl HtmlMount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<&ViewNode> {
        self.content.as_ref()
    }

    pub fn html(&self) -> String {
        self.content
            .as_ref()
            .map(ViewNode::to_html)
            .unwrap_or_default()
    }

    /// How many times the content was replaced.
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl MountPoint for HtmlMount {
    fn replace(&mut self, content: ViewNode) {
        self.content = Some(content);
        self.replacements += 1;
    }

    fn set_image_source(&mut self, image_id: &str, src: &str) {
        if let Some(content) = self.content.as_mut() {
            content.for_each_element_mut(&mut |e| {
                if e.tag == "img" && e.get_attr("data-image-id") == Some(image_id) {
                    e.set_attr("src", src);
                    e.remove_attr("data-src");
                    e.remove_class("brp-lazy");
                }
            });
        }
    }

    fn set_carousel(&mut self, state: &CarouselState) {
        if let Some(content) = self.content.as_mut() {
            content.for_each_element_mut(&mut |e| {
                if e.has_class("brp-track") {
                    e.set_attr("style", format!("transform: {}", state.transform()));
                } else if e.has_class("brp-prev") {
                    toggle_disabled(e, !state.can_prev());
                } else if e.has_class("brp-next") {
                    toggle_disabled(e, !state.can_next());
                }
            });
        }
    }

    fn clear(&mut self) {
        self.content = None;
    }
}

fn toggle_disabled(e: &mut crate::render::Element, disabled: bool) {
    if disabled {
        e.set_attr("disabled", "");
    } else {
        e.remove_attr("disabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Element;

    fn tree() -> ViewNode {
        Element::new("div")
            .child(
                Element::new("img")
                    .class("brp-lazy")
                    .attr("data-image-id", "w1-0")
                    .attr("src", "placeholder")
                    .attr("data-src", "real.jpg"),
            )
            .child(Element::new("div").class("brp-track").attr("style", "transform: translateX(-0%)"))
            .child(Element::new("button").class("brp-prev").attr("disabled", ""))
            .child(Element::new("button").class("brp-next"))
            .into()
    }

    #[test]
    fn test_replace_and_clear() {
        let mut mount = HtmlMount::new();
        assert_eq!(mount.html(), "");
        mount.replace(Element::new("p").text("a").into());
        mount.replace(Element::new("p").text("b").into());
        assert_eq!(mount.html(), "<p>b</p>");
        assert_eq!(mount.replacements(), 2);
        mount.clear();
        assert!(mount.content().is_none());
    }

    #[test]
    fn test_set_image_source() {
        let mut mount = HtmlMount::new();
        mount.replace(tree());
        mount.set_image_source("w1-0", "real.jpg");

        let html = mount.html();
        assert!(html.contains(r#"<img data-image-id="w1-0" src="real.jpg">"#), "{}", html);
    }

    #[test]
    fn test_set_carousel() {
        let mut mount = HtmlMount::new();
        mount.replace(tree());

        let mut state = CarouselState::new(3, 2);
        state.next();
        mount.set_carousel(&state);

        let content = mount.content().unwrap();
        assert_eq!(
            content.find_by_class("brp-track")[0].get_attr("style"),
            Some("transform: translateX(-50%)")
        );
        assert_eq!(content.find_by_class("brp-prev")[0].get_attr("disabled"), None);
        assert_eq!(content.find_by_class("brp-next")[0].get_attr("disabled"), Some(""));
    }
}
