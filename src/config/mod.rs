//! Widget configuration.
//!
//! [`WidgetOptions`] is the raw, user-supplied option set. It deserializes from
//! TOML with every field optional and can be read from
//! `~/.config/related-posts/config.toml`. [`Configuration`] is the validated,
//! read-only form a widget instance is built from.

pub mod display;

pub use display::{CardStyle, Columns, DateFormat, Layout, ThumbnailQuality};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::host::HostPage;

pub const MIN_POSTS: usize = 1;
pub const MAX_POSTS: usize = 50;
pub const DEFAULT_MAX_POSTS: usize = 6;
pub const MAX_COLUMNS: u8 = 4;

/// Default thumbnail used when an entry carries no image at all.
pub const DEFAULT_THUMBNAIL: &str = "/placeholder.svg?height=200&width=300";

/// User-facing widget options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WidgetOptions {
    /// Blog origin, e.g. `https://example.blogspot.com`.
    pub blog_url: Option<String>,
    /// Derive the origin from the host page when `blog_url` is unset.
    pub auto_detect_blog_url: bool,
    pub feed_path: String,
    /// How many entries to request; more than `max_posts` so filtering still
    /// leaves enough to show.
    pub feed_max_results: usize,

    pub max_posts: i64,
    pub summary_length: usize,

    #[serde(deserialize_with = "display::deserialize_from_str")]
    pub layout: Layout,
    #[serde(deserialize_with = "display::deserialize_from_str")]
    pub card_style: CardStyle,
    #[serde(deserialize_with = "display::deserialize_columns")]
    pub columns: Columns,
    #[serde(deserialize_with = "display::deserialize_from_str")]
    pub date_format: DateFormat,
    #[serde(deserialize_with = "display::deserialize_from_str")]
    pub thumbnail_quality: ThumbnailQuality,
    pub default_thumbnail: String,

    pub show_thumbnail: bool,
    pub show_date: bool,
    pub show_author: bool,
    pub show_read_time: bool,
    pub show_summary: bool,
    pub show_labels: bool,
    pub max_labels: usize,

    pub lazy_loading: bool,
    /// Distance outside the viewport at which images start loading.
    pub lazy_root_margin_px: u32,

    pub cache_results: bool,
    pub cache_duration_ms: u64,
    pub fetch_timeout_ms: u64,

    pub exclude_current_post: bool,
    pub shuffle_posts: bool,
    pub filter_by_labels: bool,

    pub fade_in: bool,
    pub stagger_delay_ms: u64,
    /// Carousel only.
    pub items_per_view: usize,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            blog_url: None,
            auto_detect_blog_url: true,
            feed_path: "/feeds/posts/default".to_string(),
            feed_max_results: 50,
            max_posts: DEFAULT_MAX_POSTS as i64,
            summary_length: 120,
            layout: Layout::Grid,
            card_style: CardStyle::Modern,
            columns: Columns::Auto,
            date_format: DateFormat::Absolute,
            thumbnail_quality: ThumbnailQuality::Medium,
            default_thumbnail: DEFAULT_THUMBNAIL.to_string(),
            show_thumbnail: true,
            show_date: true,
            show_author: false,
            show_read_time: false,
            show_summary: true,
            show_labels: false,
            max_labels: 3,
            lazy_loading: true,
            lazy_root_margin_px: 50,
            cache_results: true,
            cache_duration_ms: 300_000,
            fetch_timeout_ms: 10_000,
            exclude_current_post: true,
            shuffle_posts: true,
            filter_by_labels: true,
            fade_in: true,
            stagger_delay_ms: 100,
            items_per_view: 3,
        }
    }
}

impl WidgetOptions {
    /// Load options from the default path.
    ///
    /// If the file doesn't exist, a commented default one is written and the
    /// defaults are returned. Missing fields use default values.
    pub fn load() -> Result<Self, ConfigFileError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load options from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigFileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// `~/.config/related-posts/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigFileError> {
        let config_dir = dirs::config_dir().ok_or(ConfigFileError::NoConfigDir)?;
        Ok(config_dir.join("related-posts").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigFileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigFileError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# Related posts widget configuration
#
# blog_url is required unless it can be detected from the page
# (a *.blogspot.com address or a Blogger generator meta tag).
# blog_url = "https://example.blogspot.com"
auto_detect_blog_url = true

# Feed
feed_path = "/feeds/posts/default"
feed_max_results = 50

# Selection
max_posts = 6
exclude_current_post = true
shuffle_posts = true
filter_by_labels = true

# Layout: grid, list, masonry, carousel
layout = "grid"
# Card style: modern, classic, minimal
card_style = "modern"
# "auto" or 1-4
columns = "auto"
# Carousel items visible at once
items_per_view = 3

# Content
show_thumbnail = true
show_date = true
show_author = false
show_read_time = false
show_summary = true
show_labels = false
max_labels = 3
summary_length = 120
# absolute ("Jan 5, 2024") or relative ("3 days ago")
date_format = "absolute"
# low (150px), medium (300px), high (600px)
thumbnail_quality = "medium"
default_thumbnail = "/placeholder.svg?height=200&width=300"

# Performance
lazy_loading = true
lazy_root_margin_px = 50
cache_results = true
cache_duration_ms = 300000
fetch_timeout_ms = 10000

# Animation
fade_in = true
stagger_delay_ms = 100
"##
        .to_string()
    }
}

/// Validated, immutable configuration of one widget instance.
#[derive(Debug, Clone)]
pub struct Configuration {
    blog_origin: String,
    max_posts: usize,
    options: WidgetOptions,
}

impl Configuration {
    /// Validate `options` once. A missing or malformed blog origin is fatal;
    /// out-of-range values are corrected with a warning.
    pub fn new(mut options: WidgetOptions, page: &HostPage) -> Result<Self, ConfigError> {
        let blog_url = match options.blog_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ if options.auto_detect_blog_url => {
                page.detect_blog_url().ok_or(ConfigError::MissingBlogUrl)?
            }
            _ => return Err(ConfigError::MissingBlogUrl),
        };

        let parsed = Url::parse(&blog_url)
            .map_err(|_| ConfigError::InvalidBlogUrl(blog_url.clone()))?;
        if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
            return Err(ConfigError::InvalidBlogUrl(blog_url));
        }
        let blog_origin = blog_url.trim_end_matches('/').to_string();

        let requested = options.max_posts;
        let max_posts = requested.clamp(MIN_POSTS as i64, MAX_POSTS as i64) as usize;
        if requested != max_posts as i64 {
            tracing::warn!(
                "max_posts should be between {} and {}, using {}",
                MIN_POSTS,
                MAX_POSTS,
                max_posts
            );
            options.max_posts = max_posts as i64;
        }

        if let Columns::Fixed(n) = options.columns {
            let clamped = n.clamp(1, MAX_COLUMNS);
            if clamped != n {
                tracing::warn!("columns should be auto or 1-{}, using {}", MAX_COLUMNS, clamped);
                options.columns = Columns::Fixed(clamped);
            }
        }

        if options.items_per_view == 0 {
            tracing::warn!("items_per_view must be at least 1, using 1");
            options.items_per_view = 1;
        }

        if options.feed_max_results < max_posts {
            options.feed_max_results = max_posts;
        }

        options.blog_url = Some(blog_origin.clone());

        Ok(Self {
            blog_origin,
            max_posts,
            options,
        })
    }

    /// Blog origin without trailing slash.
    pub fn blog_origin(&self) -> &str {
        &self.blog_origin
    }

    pub fn max_posts(&self) -> usize {
        self.max_posts
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_millis(self.options.cache_duration_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.options.fetch_timeout_ms)
    }
}

/// Fatal configuration problems; the widget does not mount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing blogUrl configuration")]
    MissingBlogUrl,

    #[error("Invalid blogUrl format: {0}")]
    InvalidBlogUrl(String),
}

/// Errors reading an options file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
