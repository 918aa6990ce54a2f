//! Metadata read from the page the widget is mounted on.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::domain::CurrentPostContext;

static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid meta tag pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub name: Option<String>,
    pub property: Option<String>,
    pub content: String,
}

/// The host page as seen by the widget: its address, meta tags and the
/// optional global list of the current post's labels.
#[derive(Debug, Clone, Default)]
pub struct HostPage {
    location: Option<Url>,
    meta: Vec<MetaTag>,
    post_labels: Option<Vec<String>>,
}

impl HostPage {
    pub fn new(location: Url) -> Self {
        Self {
            location: Some(location),
            ..Default::default()
        }
    }

    /// Build from a page's HTML, picking up every `<meta>` tag.
    pub fn from_html(location: Url, html: &str) -> Self {
        let meta = META_TAG
            .find_iter(html)
            .filter_map(|m| {
                let tag = m.as_str();
                let content = extract_attr(tag, "content")?;
                Some(MetaTag {
                    name: extract_attr(tag, "name"),
                    property: extract_attr(tag, "property"),
                    content,
                })
            })
            .collect();

        Self {
            location: Some(location),
            meta,
            post_labels: None,
        }
    }

    pub fn with_meta_name(mut self, name: &str, content: &str) -> Self {
        self.meta.push(MetaTag {
            name: Some(name.to_string()),
            property: None,
            content: content.to_string(),
        });
        self
    }

    pub fn with_meta_property(mut self, property: &str, content: &str) -> Self {
        self.meta.push(MetaTag {
            name: None,
            property: Some(property.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Labels the platform exposes for the current post.
    pub fn with_post_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.post_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Labels from keyword and article-tag meta tags, then the global label
    /// list. Empty values are dropped and the first occurrence wins.
    pub fn labels(&self) -> Vec<String> {
        let from_keywords = self
            .meta_named("keywords")
            .flat_map(|content| content.split(','));
        let from_tags = self
            .meta
            .iter()
            .filter(|m| m.property.as_deref() == Some("article:tag"))
            .map(|m| m.content.as_str());
        let from_global = self.post_labels.iter().flatten().map(String::as_str);

        let mut labels: Vec<String> = Vec::new();
        for label in from_keywords.chain(from_tags).chain(from_global) {
            let label = label.trim();
            if !label.is_empty() && !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
        labels
    }

    /// Guess the blog origin: a blogspot address is its own origin, and any
    /// page generated by Blogger is served from its own origin.
    pub fn detect_blog_url(&self) -> Option<String> {
        let location = self.location.as_ref()?;
        let host = location.host_str()?;

        let is_blogspot = host.ends_with(".blogspot.com");
        let generated_by_blogger = self
            .meta_named("generator")
            .any(|content| content.to_lowercase().contains("blogger"));

        if is_blogspot || generated_by_blogger {
            Some(origin_of(location))
        } else {
            None
        }
    }

    pub fn current_post(&self) -> CurrentPostContext {
        CurrentPostContext {
            url: self.location.as_ref().map(Url::to_string),
            path: self.location.as_ref().map(|l| l.path().to_string()),
            labels: self.labels(),
        }
    }

    fn meta_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.meta
            .iter()
            .filter(move |m| {
                m.name
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .map(|m| m.content.as_str())
    }
}

fn origin_of(url: &Url) -> String {
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), url.host_str().unwrap_or_default(), port),
        None => format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default()),
    }
}

/// Extract an attribute value from an HTML tag string.
fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    // Byte offsets in `lower` line up with `tag`.
    let lower = tag.to_ascii_lowercase().replace(['\n', '\t', '\r'], " ");
    for quote in ['"', '\''] {
        let pattern = format!(" {}={}", attr, quote);
        if let Some(pos) = lower.find(&pattern) {
            let start = pos + pattern.len();
            let rest = &tag[start..];
            let end = rest.find(quote)?;
            let value = &rest[..end];
            return Some(html_escape::decode_html_entities(value).to_string());
        }
    }
    None
}
