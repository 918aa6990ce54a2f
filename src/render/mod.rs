//! Turns selected posts into a view tree.
//!
//! Rendering is pure: it only reads the post list and settings, and returns
//! the tree plus the images that need source tracking. Mounting the tree and
//! driving lazy loading is the widget's job.

pub mod carousel;
pub mod date;
pub mod view;

pub use carousel::CarouselState;
pub use view::{Element, ViewNode};

use chrono::{DateTime, Utc};

use crate::config::{CardStyle, Columns, Configuration, DateFormat, Layout};
use crate::domain::Post;

/// Transparent 300x200 image shown until the real source is applied.
pub const LAZY_PLACEHOLDER: &str = "data:image/svg+xml,%3Csvg xmlns=\"http://www.w3.org/2000/svg\" width=\"300\" height=\"200\"%3E%3C/svg%3E";

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub layout: Layout,
    pub card_style: CardStyle,
    pub columns: Columns,
    pub show_thumbnail: bool,
    pub show_date: bool,
    pub show_author: bool,
    pub show_read_time: bool,
    pub show_summary: bool,
    pub show_labels: bool,
    pub max_labels: usize,
    pub date_format: DateFormat,
    pub lazy_loading: bool,
    pub fade_in: bool,
    pub stagger_delay_ms: u64,
    pub items_per_view: usize,
}

impl From<&Configuration> for RenderSettings {
    fn from(config: &Configuration) -> Self {
        let o = config.options();
        Self {
            layout: o.layout,
            card_style: o.card_style,
            columns: o.columns,
            show_thumbnail: o.show_thumbnail,
            show_date: o.show_date,
            show_author: o.show_author,
            show_read_time: o.show_read_time,
            show_summary: o.show_summary,
            show_labels: o.show_labels,
            max_labels: o.max_labels,
            date_format: o.date_format,
            lazy_loading: o.lazy_loading,
            fade_in: o.fade_in,
            stagger_delay_ms: o.stagger_delay_ms,
            items_per_view: o.items_per_view,
        }
    }
}

/// A rendered thumbnail whose final source is still to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    pub id: String,
    pub src: String,
    /// Placeholder shown until the loader applies `src`.
    pub lazy: bool,
}

#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub tree: ViewNode,
    pub images: Vec<ImageSlot>,
    pub carousel: Option<CarouselState>,
}

#[derive(Debug, Clone)]
pub struct RenderPipeline {
    settings: RenderSettings,
}

impl RenderPipeline {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(RenderSettings::from(config))
    }

    /// Build the container for `posts`. Image ids are `<image_prefix>-<index>`.
    pub fn render(&self, posts: &[Post], now: DateTime<Utc>, image_prefix: &str) -> RenderOutput {
        let mut container = self.container();
        let mut images = Vec::new();

        if posts.is_empty() {
            container = container.child(empty_view());
            return RenderOutput {
                tree: container.into(),
                images,
                carousel: None,
            };
        }

        let items: Vec<Element> = posts
            .iter()
            .enumerate()
            .map(|(index, post)| {
                let image_id = format!("{}-{}", image_prefix, index);
                let (item, image) = self.item(post, index, now, &image_id);
                images.extend(image);
                item
            })
            .collect();

        let carousel = match self.settings.layout {
            Layout::Carousel => {
                let state = CarouselState::new(items.len(), self.settings.items_per_view);
                container = container
                    .child(
                        Element::new("div").class("brp-carousel-viewport").child(
                            Element::new("div")
                                .class("brp-track")
                                .attr("style", format!("transform: {}", state.transform()))
                                .children(items),
                        ),
                    )
                    .child(carousel_nav(&state));
                Some(state)
            }
            _ => {
                container = container.children(items);
                None
            }
        };

        RenderOutput {
            tree: container.into(),
            images,
            carousel,
        }
    }

    fn container(&self) -> Element {
        let s = &self.settings;
        let mut container = Element::new("div")
            .class("brp-container")
            .class(format!("brp-layout-{}", s.layout.as_str()))
            .class(format!("brp-style-{}", s.card_style.as_str()))
            .class(format!("brp-cols-{}", s.columns));

        match s.layout {
            Layout::Masonry => {
                container = container.class("brp-masonry").attr("data-masonry", "true");
            }
            Layout::Carousel => {
                container = container
                    .class("brp-carousel")
                    .attr("data-items-per-view", s.items_per_view.to_string());
            }
            Layout::Grid | Layout::List => {}
        }

        if s.fade_in {
            container = container.class("brp-animated");
        }
        container
    }

    fn item(
        &self,
        post: &Post,
        index: usize,
        now: DateTime<Utc>,
        image_id: &str,
    ) -> (Element, Option<ImageSlot>) {
        let s = &self.settings;
        let mut item = Element::new("article")
            .class("brp-item")
            .attr("data-post-id", post.id.clone());

        if s.fade_in {
            item = item.class("brp-fade-in").attr(
                "style",
                format!("animation-delay: {}ms", index as u64 * s.stagger_delay_ms),
            );
        }

        let mut image = None;
        if s.show_thumbnail {
            let (thumbnail, slot) = self.thumbnail(post, image_id);
            item = item.child(thumbnail);
            image = Some(slot);
        }

        let mut content = Element::new("div").class("brp-content").child(
            Element::new("h3")
                .class("brp-title")
                .child(Element::new("a").attr("href", post.url.clone()).text(post.title.clone())),
        );

        if let Some(meta) = self.meta_row(post, now) {
            content = content.child(meta);
        }

        if s.show_summary && !post.summary.is_empty() {
            content = content.child(Element::new("p").class("brp-summary").text(post.summary.clone()));
        }

        if s.show_labels && !post.labels.is_empty() {
            content = content.child(self.labels(&post.labels));
        }

        (item.child(content), image)
    }

    fn thumbnail(&self, post: &Post, image_id: &str) -> (Element, ImageSlot) {
        let lazy = self.settings.lazy_loading;
        let mut img = Element::new("img")
            .attr("alt", post.title.clone())
            .attr("loading", "lazy")
            .attr("data-image-id", image_id);

        img = if lazy {
            img.class("brp-lazy")
                .attr("src", LAZY_PLACEHOLDER)
                .attr("data-src", post.thumbnail_url.clone())
        } else {
            img.attr("src", post.thumbnail_url.clone())
        };

        let thumbnail = Element::new("div")
            .class("brp-thumbnail")
            .child(Element::new("a").attr("href", post.url.clone()).child(img));

        let slot = ImageSlot {
            id: image_id.to_string(),
            src: post.thumbnail_url.clone(),
            lazy,
        };
        (thumbnail, slot)
    }

    fn meta_row(&self, post: &Post, now: DateTime<Utc>) -> Option<Element> {
        let s = &self.settings;
        let mut parts = Vec::new();

        if s.show_date {
            let text = match s.date_format {
                DateFormat::Absolute => date::format_absolute(post.published_at),
                DateFormat::Relative => date::format_relative(post.published_at, now),
            };
            parts.push(
                Element::new("time")
                    .class("brp-date")
                    .attr("datetime", post.published_at.to_rfc3339())
                    .text(text),
            );
        }

        if s.show_author && !post.author.is_empty() {
            parts.push(Element::new("span").class("brp-author").text(post.author.clone()));
        }

        if s.show_read_time && post.has_read_time() {
            parts.push(
                Element::new("span")
                    .class("brp-read-time")
                    .text(format!("{} min read", post.read_time_minutes)),
            );
        }

        if parts.is_empty() {
            None
        } else {
            Some(Element::new("div").class("brp-meta").children(parts))
        }
    }

    fn labels(&self, labels: &[String]) -> Element {
        let max = self.settings.max_labels;
        let mut chips: Vec<Element> = labels
            .iter()
            .take(max)
            .map(|label| Element::new("span").class("brp-label").text(label.clone()))
            .collect();

        if labels.len() > max {
            chips.push(
                Element::new("span")
                    .class("brp-label")
                    .class("brp-label-more")
                    .text(format!("+{} more", labels.len() - max)),
            );
        }

        Element::new("div").class("brp-labels").children(chips)
    }
}

fn carousel_nav(state: &CarouselState) -> Element {
    let mut prev = Element::new("button")
        .class("brp-prev")
        .attr("aria-label", "Previous")
        .text("\u{2039}");
    let mut next = Element::new("button")
        .class("brp-next")
        .attr("aria-label", "Next")
        .text("\u{203a}");

    if !state.can_prev() {
        prev = prev.attr("disabled", "");
    }
    if !state.can_next() {
        next = next.attr("disabled", "");
    }

    Element::new("div")
        .class("brp-carousel-nav")
        .child(prev)
        .child(next)
}

pub fn loading_view() -> ViewNode {
    Element::new("div")
        .class("brp-loading")
        .child(Element::new("div").class("brp-spinner"))
        .child(Element::new("p").text("Loading related posts..."))
        .into()
}

pub fn empty_view() -> Element {
    Element::new("div")
        .class("brp-empty")
        .child(Element::new("h3").text("No Related Posts Found"))
        .child(Element::new("p").text("Try browsing other posts on the blog."))
}

/// Shown when loading fails and the host did not take over error handling.
pub fn error_view(blog_url: &str) -> ViewNode {
    Element::new("div")
        .class("brp-error")
        .child(Element::new("h3").text("Unable to Load Related Posts"))
        .child(Element::new("p").text("Please check your blog URL configuration."))
        .child(
            Element::new("p")
                .child(Element::new("strong").text("Current URL:"))
                .text(format!(" {}", blog_url)),
        )
        .child(
            Element::new("button")
                .class("brp-retry-btn")
                .attr("type", "button")
                .text("Retry"),
        )
        .into()
}
