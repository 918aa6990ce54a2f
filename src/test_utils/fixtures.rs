//! Feed fixtures

use serde_json::{json, Value};

use crate::domain::RawFeedResponse;

pub const BLOG: &str = "https://example.blogspot.com";

/// One Blogger-style entry with post id `n` at `/2024/01/post-<n>.html`.
pub fn test_entry(n: usize) -> Value {
    json!({
        "id": { "$t": format!("tag:blogger.com,1999:blog-1.post-{}", n) },
        "title": { "$t": format!("Post {}", n) },
        "link": [
            { "rel": "replies", "href": format!("{}/feeds/{}/comments/default", BLOG, n) },
            { "rel": "alternate", "href": format!("{}/2024/01/post-{}.html", BLOG, n) }
        ],
        "summary": { "$t": format!("<p>Summary of post {}.</p>", n) },
        "published": { "$t": "2024-01-05T10:00:00.000-08:00" },
        "author": [ { "name": { "$t": "Ferris" } } ],
        "category": [ { "term": "rust" } ],
        "media$thumbnail": {
            "url": format!("https://blogger.googleusercontent.com/img/b/R29v/s72-c/post-{}.jpg", n)
        }
    })
}

pub fn feed_with_entries(count: usize) -> RawFeedResponse {
    let entries: Vec<Value> = (0..count).map(test_entry).collect();
    RawFeedResponse::new(json!({ "feed": { "entry": entries } }))
}
