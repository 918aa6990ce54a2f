//! # related-posts
//!
//! A "related posts" widget for Blogger-hosted blogs: fetch the blog's JSON
//! feed, pick a few posts that relate to the page being read, and render
//! them into the page with caching and progressive image loading.
//!
//! ## Architecture
//!
//! The data pipeline and the view builder are separate; a widget instance
//! connects them:
//!
//! ```text
//! FeedAddressBuilder → ResultCache? → Fetcher → PostNormalizer → PostSelector
//!                                                                    │
//!                     LazyImageLoader ← MountPoint ← RenderPipeline ←┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Print the widget for a post
//! related-posts render --blog-url https://example.blogspot.com \
//!     --page-url https://example.blogspot.com/2024/01/post.html --label rust
//!
//! # Print the feed address only
//! related-posts address --blog-url https://example.blogspot.com --label rust
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context, clock and error types
//! - [`config`]: Widget options and validated configuration
//! - [`host`]: Host page metadata
//! - [`fetcher`]: Feed address building and HTTP fetching
//! - [`cache`]: TTL-gated feed cache
//! - [`normalizer`]: Feed entries to posts
//! - [`selector`]: Current-post exclusion, shuffle, truncation
//! - [`render`]: View tree construction
//! - [`lazy`]: Viewport-driven image loading
//! - [`widget`]: Per-instance state machine and hooks

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) owns the shared cache, image loader,
/// fetcher and clock, and builds widget instances from them.
pub mod app;

/// In-memory feed cache keyed by (origin, labels, max posts).
pub mod cache;

/// Command-line interface using clap.
///
/// - `render` - Fetch and print the widget as HTML
/// - `address` - Print the feed request address
pub mod cli;

/// Configuration.
///
/// [`WidgetOptions`](config::WidgetOptions) loads from
/// `~/.config/related-posts/config.toml`; [`Configuration`](config::Configuration)
/// is the validated form.
pub mod config;

/// Core domain models.
///
/// - [`Post`](domain::Post): a normalized, render-ready post
/// - [`RawFeedResponse`](domain::RawFeedResponse): the feed envelope as fetched
/// - [`CurrentPostContext`](domain::CurrentPostContext): the page being read
pub mod domain;

/// Feed fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`FeedAddressBuilder`](fetcher::FeedAddressBuilder): request address
pub mod fetcher;

/// Meta tags, post labels and blog origin detection for the host page.
pub mod host;

pub mod lazy;

/// Feed entry normalization: ids, links, summaries, thumbnails, read time.
pub mod normalizer;

pub mod render;

pub mod selector;

/// Widget instances.
///
/// Lifecycle `Idle → Loading → Rendered | Errored`, host callbacks, and the
/// [`MountPoint`](widget::MountPoint) the view is written to.
pub mod widget;

#[cfg(test)]
pub(crate) mod test_utils;
