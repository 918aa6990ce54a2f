//! A minimal element tree, independent of any DOM.

use html_escape::{encode_double_quoted_attribute, encode_text};

const VOID_ELEMENTS: &[&str] = &["img", "br", "hr", "input", "meta"];

#[derive(Debug, Clone, PartialEq)]
pub enum ViewNode {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<ViewNode>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn child(mut self, child: impl Into<ViewNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ViewNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(ViewNode::Text(text.into()))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n != name);
    }
}

impl From<Element> for ViewNode {
    fn from(element: Element) -> Self {
        ViewNode::Element(element)
    }
}

impl ViewNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            ViewNode::Element(e) => Some(e),
            ViewNode::Text(_) => None,
        }
    }

    /// All elements in document order, this one included.
    pub fn elements(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        collect(self, &mut found);
        found
    }

    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        self.elements()
            .into_iter()
            .filter(|e| e.has_class(class))
            .collect()
    }

    /// Visit every element mutably, depth first.
    pub fn for_each_element_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        if let ViewNode::Element(element) = self {
            f(element);
            for child in &mut element.children {
                child.for_each_element_mut(f);
            }
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            ViewNode::Text(t) => t.clone(),
            ViewNode::Element(e) => e.children.iter().map(ViewNode::text_content).collect(),
        }
    }

    pub fn to_html(&self) -> String {
        let mut buf = String::new();
        write_html(self, &mut buf);
        buf
    }
}

fn collect<'a>(node: &'a ViewNode, found: &mut Vec<&'a Element>) {
    if let ViewNode::Element(element) = node {
        found.push(element);
        for child in &element.children {
            collect(child, found);
        }
    }
}

fn write_html(node: &ViewNode, buf: &mut String) {
    match node {
        ViewNode::Text(text) => buf.push_str(&encode_text(text)),
        ViewNode::Element(element) => {
            buf.push('<');
            buf.push_str(&element.tag);

            if !element.classes.is_empty() {
                buf.push_str(" class=\"");
                buf.push_str(&encode_double_quoted_attribute(&element.classes.join(" ")));
                buf.push('"');
            }

            for (name, value) in &element.attrs {
                buf.push(' ');
                buf.push_str(name);
                if !value.is_empty() {
                    buf.push_str("=\"");
                    buf.push_str(&encode_double_quoted_attribute(value));
                    buf.push('"');
                }
            }
            buf.push('>');

            if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                return;
            }

            for child in &element.children {
                write_html(child, buf);
            }

            buf.push_str("</");
            buf.push_str(&element.tag);
            buf.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_nested() {
        let node: ViewNode = Element::new("div")
            .class("a")
            .class("b")
            .attr("data-x", "1")
            .child(Element::new("p").text("hi"))
            .into();

        assert_eq!(node.to_html(), r#"<div class="a b" data-x="1"><p>hi</p></div>"#);
    }

    #[test]
    fn test_escaping() {
        let node: ViewNode = Element::new("a")
            .attr("href", "https://x.test/?a=1&b=\"2\"")
            .text("<script>")
            .into();

        assert_eq!(
            node.to_html(),
            r#"<a href="https://x.test/?a=1&amp;b=&quot;2&quot;">&lt;script&gt;</a>"#
        );
    }

    #[test]
    fn test_void_and_boolean_attrs() {
        let node: ViewNode = Element::new("div")
            .child(Element::new("img").attr("src", "x.png"))
            .child(Element::new("button").attr("disabled", "").text("Next"))
            .into();

        assert_eq!(
            node.to_html(),
            r#"<div><img src="x.png"><button disabled>Next</button></div>"#
        );
    }

    #[test]
    fn test_find_and_mutate() {
        let mut node: ViewNode = Element::new("ul")
            .child(Element::new("li").class("item").text("one"))
            .child(Element::new("li").class("item").text("two"))
            .into();

        assert_eq!(node.find_by_class("item").len(), 2);
        assert_eq!(node.text_content(), "onetwo");

        node.for_each_element_mut(&mut |e| {
            if e.tag == "li" {
                e.set_attr("role", "listitem");
            }
        });
        assert!(node
            .find_by_class("item")
            .iter()
            .all(|e| e.get_attr("role") == Some("listitem")));
    }
}
