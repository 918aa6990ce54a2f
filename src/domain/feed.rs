//! The blog platform's JSON feed envelope.
//!
//! The response is kept loosely typed so it can be cached and handed to the
//! host untouched; entries are only given a shape when they are normalized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A feed response exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFeedResponse(Value);

impl RawFeedResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body).map(Self)
    }

    /// `feed.entry`, or nothing when the feed has no entries.
    pub fn entries(&self) -> &[Value] {
        self.0
            .get("feed")
            .and_then(|feed| feed.get("entry"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// `{ "$t": "..." }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextNode {
    #[serde(rename = "$t")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawLink {
    #[serde(default)]
    pub rel: String,
    #[serde(default)]
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawAuthor {
    pub name: TextNode,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCategory {
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawThumbnail {
    pub url: String,
}

/// One feed entry. `title` and `published` are required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEntry {
    pub id: Option<TextNode>,
    pub title: TextNode,
    #[serde(default)]
    pub link: Vec<RawLink>,
    pub summary: Option<TextNode>,
    pub content: Option<TextNode>,
    pub published: TextNode,
    pub updated: Option<TextNode>,
    #[serde(default)]
    pub author: Vec<RawAuthor>,
    #[serde(default)]
    pub category: Vec<RawCategory>,
    #[serde(rename = "media$thumbnail")]
    pub media_thumbnail: Option<RawThumbnail>,
}
