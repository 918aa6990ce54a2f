use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A render-ready post derived from one feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub url: String,
    pub summary: String,
    pub thumbnail_url: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub author: String,
    pub labels: Vec<String>,
    pub read_time_minutes: u32,
}

impl Post {
    /// Path component of the post URL, `None` for the `#` placeholder or any
    /// other unparseable address.
    pub fn path(&self) -> Option<String> {
        Url::parse(&self.url).ok().map(|u| u.path().to_string())
    }

    /// Zero means the entry had no readable text.
    pub fn has_read_time(&self) -> bool {
        self.read_time_minutes > 0
    }
}
