use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::app::{Result, RelatedPostsError};
use crate::config::Configuration;
use crate::domain::feed::RawLink;
use crate::domain::{Post, RawEntry, RawFeedResponse};

pub const WORDS_PER_MINUTE: usize = 200;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Tags that end a line of text; inline tags join their neighbours.
static BREAK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:p|div|br|li|ul|ol|h[1-6]|blockquote|tr|td|th|table|pre|hr)\b[^>]*>")
        .expect("valid break tag pattern")
});

static POST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"post-(\d+)").expect("valid post id pattern"));

static INLINE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=["']([^"'>]+)["'][^>]*>"#).expect("valid img pattern")
});

/// `/s72-c/`, `/s1600/`, `/w640-h400-rw/` path segments.
static PATH_SIZE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:s\d+|w\d+-h\d+)(?:-[a-z0-9]+)*/").expect("valid size segment pattern")
});

/// `=s72-c`, `=w640-h400` suffixes.
static SUFFIX_SIZE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"=(?:s\d+|w\d+-h\d+)(?:-[a-z0-9]+)*$").expect("valid size suffix pattern")
});

const KNOWN_IMAGE_HOSTS: &[&str] = &["blogspot.com", "googleusercontent.com", "ggpht.com"];

#[derive(Debug, Clone)]
pub struct NormalizerSettings {
    pub summary_length: usize,
    pub thumbnail_width: u32,
    pub default_thumbnail: String,
}

impl From<&Configuration> for NormalizerSettings {
    fn from(config: &Configuration) -> Self {
        let options = config.options();
        Self {
            summary_length: options.summary_length,
            thumbnail_width: options.thumbnail_quality.width(),
            default_thumbnail: options.default_thumbnail.clone(),
        }
    }
}

/// Maps raw feed entries into [`Post`]s.
#[derive(Debug, Clone)]
pub struct PostNormalizer {
    settings: NormalizerSettings,
}

impl PostNormalizer {
    pub fn new(settings: NormalizerSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(NormalizerSettings::from(config))
    }

    /// Normalize every entry. One malformed entry fails the whole feed.
    pub fn normalize_feed(&self, feed: &RawFeedResponse, now: DateTime<Utc>) -> Result<Vec<Post>> {
        feed.entries()
            .iter()
            .map(|entry| self.normalize_value(entry, now))
            .collect()
    }

    pub fn normalize_value(&self, entry: &Value, now: DateTime<Utc>) -> Result<Post> {
        let entry = parse_entry(entry)?;
        self.normalize(&entry, now)
    }

    /// `now` only feeds the fallback id of entries without a post id.
    pub fn normalize(&self, entry: &RawEntry, now: DateTime<Utc>) -> Result<Post> {
        let content = entry.content.as_ref().map(|c| c.text.as_str());
        let summary_source = entry
            .summary
            .as_ref()
            .map(|s| s.text.as_str())
            .or(content)
            .unwrap_or("");

        let readable = strip_tags(content.unwrap_or(summary_source));

        Ok(Post {
            id: post_id(entry, now),
            title: decode_html_entities(&entry.title.text).to_string(),
            url: post_url(&entry.link),
            summary: truncate_summary(&strip_tags(summary_source), self.settings.summary_length),
            thumbnail_url: self.thumbnail(entry),
            published_at: parse_timestamp(&entry.published.text)?,
            updated_at: entry
                .updated
                .as_ref()
                .map(|u| parse_timestamp(&u.text))
                .transpose()?,
            author: entry
                .author
                .first()
                .map(|a| a.name.text.clone())
                .unwrap_or_default(),
            labels: entry.category.iter().map(|c| c.term.clone()).collect(),
            read_time_minutes: read_time_minutes(&readable),
        })
    }

    fn thumbnail(&self, entry: &RawEntry) -> String {
        if let Some(thumbnail) = &entry.media_thumbnail {
            return rewrite_thumbnail(&thumbnail.url, self.settings.thumbnail_width);
        }

        entry
            .content
            .as_ref()
            .and_then(|c| first_inline_image(&c.text))
            .unwrap_or_else(|| self.settings.default_thumbnail.clone())
    }
}

fn parse_entry(value: &Value) -> Result<RawEntry> {
    RawEntry::deserialize(value).map_err(|e| RelatedPostsError::FeedParse(e.to_string()))
}

/// The `alternate` link, or `#` when there is none.
pub fn post_url(links: &[RawLink]) -> String {
    links
        .iter()
        .find(|l| l.rel == "alternate")
        .map(|l| l.href.clone())
        .unwrap_or_else(|| "#".to_string())
}

/// Digits of `post-<digits>` in the entry id, else the current timestamp in
/// milliseconds.
pub fn post_id(entry: &RawEntry, now: DateTime<Utc>) -> String {
    entry
        .id
        .as_ref()
        .and_then(|id| POST_ID.captures(&id.text))
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| now.timestamp_millis().to_string())
}

/// Remove markup, decode entities and collapse whitespace. Block and break
/// tags become a space; inline tags are dropped without one.
pub fn strip_tags(html: &str) -> String {
    let with_breaks = BREAK_TAG.replace_all(html, " ");
    let without_tags = TAG.replace_all(&with_breaks, "");
    let decoded = decode_html_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `limit` characters plus an ellipsis.
///
/// The cut moves back to the last space when that space lies in the final
/// 20% of the window; otherwise the text is cut at the hard limit. A window
/// followed directly by whitespace already ends on a word and is kept whole.
pub fn truncate_summary(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let window: String = text.chars().take(limit).collect();
    let next_is_break = text.chars().nth(limit).is_some_and(char::is_whitespace);
    let window = window.trim_end();

    let cut = if next_is_break {
        window
    } else {
        match window.rfind(' ') {
            Some(pos) if window[..pos].chars().count() as f64 > limit as f64 * 0.8 => &window[..pos],
            _ => window,
        }
    };

    format!("{}...", cut.trim_end())
}

pub fn read_time_minutes(text: &str) -> u32 {
    text.split_whitespace().count().div_ceil(WORDS_PER_MINUTE) as u32
}

/// Source of the first `<img>` in `html`.
pub fn first_inline_image(html: &str) -> Option<String> {
    INLINE_IMAGE.captures(html).map(|caps| caps[1].to_string())
}

/// Request `width` pixels from a known image host. Any existing size token is
/// replaced rather than appended to, so the rewrite is idempotent. URLs on
/// other hosts are returned unchanged.
pub fn rewrite_thumbnail(url: &str, width: u32) -> String {
    if !is_known_image_host(url) {
        return url.to_string();
    }

    let token = format!("s{}-c", width);
    if PATH_SIZE_TOKEN.is_match(url) {
        return PATH_SIZE_TOKEN
            .replace(url, format!("/{}/", token).as_str())
            .into_owned();
    }

    let base = SUFFIX_SIZE_TOKEN.replace(url, "");
    format!("{}={}", base, token)
}

fn is_known_image_host(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .is_some_and(|host| {
            KNOWN_IMAGE_HOSTS
                .iter()
                .any(|known| host == *known || host.ends_with(&format!(".{}", known)))
        })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RelatedPostsError::FeedParse(format!("bad timestamp {:?}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const FEED_SAMPLE: &str = r#"{
  "version": "1.0",
  "encoding": "UTF-8",
  "feed": {
    "entry": [
      {
        "id": { "$t": "tag:blogger.com,1999:blog-123.post-4567890" },
        "published": { "$t": "2024-01-15T10:30:00.000-08:00" },
        "updated": { "$t": "2024-01-16T08:00:00.000-08:00" },
        "category": [ { "scheme": "http://www.blogger.com/atom/ns#", "term": "rust" }, { "term": "async" } ],
        "title": { "type": "text", "$t": "Tokio &amp; friends" },
        "summary": { "type": "text", "$t": "<p>A short <b>intro</b> to async.</p>" },
        "content": { "type": "html", "$t": "<p>Hello <img src=\"https://cdn.example.com/a.png\"> world</p>" },
        "link": [
          { "rel": "replies", "href": "https://example.blogspot.com/feeds/1/comments/default" },
          { "rel": "alternate", "type": "text/html", "href": "https://example.blogspot.com/2024/01/tokio.html" }
        ],
        "author": [ { "name": { "$t": "Ferris" } } ],
        "media$thumbnail": { "url": "https://blogger.googleusercontent.com/img/b/R29v/s72-c/photo.jpg", "height": "72", "width": "72" }
      },
      {
        "id": { "$t": "tag:blogger.com,1999:blog-123" },
        "published": { "$t": "2023-12-01T00:00:00Z" },
        "title": { "$t": "Bare" },
        "link": []
      }
    ]
  }
}"#;

    fn normalizer() -> PostNormalizer {
        PostNormalizer::new(NormalizerSettings {
            summary_length: 120,
            thumbnail_width: 300,
            default_thumbnail: "/placeholder.svg".into(),
        })
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
    }

    fn sample_posts() -> Vec<Post> {
        let feed = RawFeedResponse::from_json(FEED_SAMPLE).unwrap();
        normalizer().normalize_feed(&feed, now()).unwrap()
    }

    #[test]
    fn test_parse_full_entry() {
        let posts = sample_posts();
        assert_eq!(posts.len(), 2);

        let post = &posts[0];
        assert_eq!(post.id, "4567890");
        assert_eq!(post.title, "Tokio & friends");
        assert_eq!(post.url, "https://example.blogspot.com/2024/01/tokio.html");
        assert_eq!(post.summary, "A short intro to async.");
        assert_eq!(
            post.thumbnail_url,
            "https://blogger.googleusercontent.com/img/b/R29v/s300-c/photo.jpg"
        );
        assert_eq!(post.author, "Ferris");
        assert_eq!(post.labels, vec!["rust", "async"]);
        assert_eq!(post.read_time_minutes, 1);
        assert_eq!(
            post.published_at,
            Utc.with_ymd_and_hms(2024, 1, 15, 18, 30, 0).unwrap()
        );
        assert_eq!(
            post.updated_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 16, 16, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_bare_entry_uses_fallbacks() {
        let post = &sample_posts()[1];
        assert_eq!(post.url, "#");
        assert_eq!(post.id, now().timestamp_millis().to_string());
        assert_eq!(post.summary, "");
        assert_eq!(post.thumbnail_url, "/placeholder.svg");
        assert_eq!(post.author, "");
        assert!(post.labels.is_empty());
        assert_eq!(post.read_time_minutes, 0);
        assert_eq!(post.updated_at, None);
    }

    #[test]
    fn test_malformed_entry_fails_whole_feed() {
        let feed = RawFeedResponse::new(json!({ "feed": { "entry": [
            { "title": { "$t": "ok" }, "published": { "$t": "2024-01-01T00:00:00Z" } },
            { "title": { "$t": "no date" } }
        ] } }));
        let err = normalizer().normalize_feed(&feed, now()).unwrap_err();
        assert!(matches!(err, RelatedPostsError::FeedParse(_)));
    }

    #[test]
    fn test_bad_timestamp_fails() {
        let entry = json!({ "title": { "$t": "x" }, "published": { "$t": "yesterday" } });
        assert!(normalizer().normalize_value(&entry, now()).is_err());
    }

    #[test]
    fn test_empty_feed() {
        let feed = RawFeedResponse::new(json!({ "feed": {} }));
        assert!(normalizer().normalize_feed(&feed, now()).unwrap().is_empty());
    }

    #[test]
    fn test_summary_falls_back_to_content() {
        let entry = json!({
            "title": { "$t": "x" },
            "published": { "$t": "2024-01-01T00:00:00Z" },
            "content": { "$t": "<div>From&nbsp;the <i>body</i></div>" }
        });
        let post = normalizer().normalize_value(&entry, now()).unwrap();
        assert_eq!(post.summary, "From the body");
        assert_eq!(post.thumbnail_url, "/placeholder.svg");
    }

    #[test]
    fn test_inline_image_thumbnail() {
        let entry = json!({
            "title": { "$t": "x" },
            "published": { "$t": "2024-01-01T00:00:00Z" },
            "content": { "$t": "<p>text</p><IMG class='hero' SRC='https://cdn.example.com/hero.jpg' />" }
        });
        let post = normalizer().normalize_value(&entry, now()).unwrap();
        assert_eq!(post.thumbnail_url, "https://cdn.example.com/hero.jpg");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>a&lt;b</p>\n\n<p>c</p>"), "a<b c");
        assert_eq!(strip_tags(""), "");
    }

    #[test]
    fn test_strip_inline_tags_keeps_words_whole() {
        let text = strip_tags("H<sub>2</sub>O and un<b>bold</b>ed");
        assert_eq!(text, "H2O and unbolded");
        assert_eq!(text.split_whitespace().count(), 3);
        assert_eq!(strip_tags("one<br>two<br/>three"), "one two three");
        assert_eq!(strip_tags("<li>a</li><li>b</li>"), "a b");
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_summary("short text", 120), "short text");
    }

    #[test]
    fn test_truncate_at_late_space() {
        // window "aaaa bbbb cccc dd", last space at 14 > 0.8 * 17
        let text = "aaaa bbbb cccc dddd eeee";
        assert_eq!(truncate_summary(text, 17), "aaaa bbbb cccc...");
    }

    #[test]
    fn test_truncate_hard_when_space_too_early() {
        let text = "ab abcdefghijklmnopqrstuvwxyz";
        assert_eq!(truncate_summary(text, 10), "ab abcdefg...");
    }

    #[test]
    fn test_truncate_keeps_window_ending_on_word_boundary() {
        assert_eq!(truncate_summary("hello world again", 11), "hello world...");
    }

    #[test]
    fn test_truncate_length_bound() {
        let text = "word ".repeat(100);
        for limit in [1, 7, 40, 120] {
            let out = truncate_summary(text.trim(), limit);
            assert!(out.chars().count() <= limit + 3, "limit {}: {:?}", limit, out);
            assert!(out.ends_with("..."));
        }
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let text = "héllo wörld ünïcode text";
        let out = truncate_summary(text, 12);
        assert_eq!(out, "héllo wörld...");
    }

    #[test]
    fn test_read_time() {
        assert_eq!(read_time_minutes(""), 0);
        assert_eq!(read_time_minutes("one"), 1);
        assert_eq!(read_time_minutes(&"w ".repeat(200)), 1);
        assert_eq!(read_time_minutes(&"w ".repeat(201)), 2);
    }

    #[test]
    fn test_rewrite_path_token() {
        assert_eq!(
            rewrite_thumbnail("https://1.bp.blogspot.com/-x/AAA/s72-c/pic.png", 600),
            "https://1.bp.blogspot.com/-x/AAA/s600-c/pic.png"
        );
    }

    #[test]
    fn test_rewrite_suffix_token() {
        assert_eq!(
            rewrite_thumbnail("https://lh3.googleusercontent.com/abc=s72-c", 300),
            "https://lh3.googleusercontent.com/abc=s300-c"
        );
        assert_eq!(
            rewrite_thumbnail("https://lh3.googleusercontent.com/abc", 150),
            "https://lh3.googleusercontent.com/abc=s150-c"
        );
    }

    #[test]
    fn test_rewrite_idempotent() {
        for url in [
            "https://1.bp.blogspot.com/-x/AAA/s72-c/pic.png",
            "https://lh3.googleusercontent.com/abc=w640-h400",
            "https://lh3.googleusercontent.com/abc",
        ] {
            let once = rewrite_thumbnail(url, 300);
            assert_eq!(rewrite_thumbnail(&once, 300), once);
        }
    }

    #[test]
    fn test_rewrite_unknown_host_untouched() {
        let url = "https://cdn.example.com/s72-c/pic.png";
        assert_eq!(rewrite_thumbnail(url, 300), url);
    }
}
