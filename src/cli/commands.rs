use std::path::Path;

use url::Url;

use crate::app::{AppContext, Result};
use crate::cli::PageArgs;
use crate::config::{Configuration, WidgetOptions};
use crate::fetcher::FeedAddressBuilder;
use crate::host::HostPage;
use crate::widget::{Hooks, HtmlMount, LoadOutcome};

/// Options from `config` (or the default file), overridden by flags.
pub fn load_options(config: Option<&Path>, args: &PageArgs) -> Result<WidgetOptions> {
    let mut options = match config {
        Some(path) => WidgetOptions::load_from(path)?,
        None => WidgetOptions::load()?,
    };

    if let Some(blog_url) = &args.blog_url {
        options.blog_url = Some(blog_url.clone());
    }
    if let Some(max_posts) = args.max_posts {
        options.max_posts = max_posts;
    }
    Ok(options)
}

/// The host page described by the flags. Without `--page-url` the blog
/// origin itself is the page.
pub fn host_page(args: &PageArgs) -> Result<HostPage> {
    let location = args.page_url.as_deref().or(args.blog_url.as_deref());
    let page = match (location, &args.page_html) {
        (Some(location), Some(html_path)) => {
            let html = std::fs::read_to_string(html_path)?;
            HostPage::from_html(Url::parse(location)?, &html)
        }
        (Some(location), None) => HostPage::new(Url::parse(location)?),
        (None, _) => HostPage::default(),
    };

    if args.labels.is_empty() {
        Ok(page)
    } else {
        Ok(page.with_post_labels(args.labels.iter().cloned()))
    }
}

pub fn feed_address(options: WidgetOptions, page: &HostPage) -> Result<String> {
    let config = Configuration::new(options, page)?;
    Ok(FeedAddressBuilder::for_widget(&config, &page.current_post()).build())
}

/// Load one widget and return its markup. A failed load still yields the
/// error view.
pub async fn render(ctx: &AppContext, options: WidgetOptions, page: &HostPage) -> Result<String> {
    let widget = ctx.initialize(HtmlMount::new(), options, page, Hooks::new())?;

    match widget.load().await {
        LoadOutcome::Rendered(count) => tracing::info!("Rendered {} posts", count),
        outcome => tracing::warn!("Widget did not render: {:?}", outcome),
    }

    Ok(widget.with_mount(HtmlMount::html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ManualClock;
    use crate::test_utils::{feed_with_entries, StaticFetcher, BLOG};
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn args() -> PageArgs {
        PageArgs {
            blog_url: Some(BLOG.to_string()),
            page_url: Some(format!("{}/2024/01/post-3.html", BLOG)),
            ..Default::default()
        }
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_posts = 9\nlayout = \"list\"").unwrap();

        let mut page = args();
        page.max_posts = Some(4);
        let options = load_options(Some(file.path()), &page).unwrap();
        assert_eq!(options.max_posts, 4);
        assert_eq!(options.blog_url.as_deref(), Some(BLOG));
        assert_eq!(options.layout, crate::config::Layout::List);
    }

    #[test]
    fn test_host_page_from_html() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"<html><head><meta name="keywords" content="rust, tokio"></head></html>"#
        )
        .unwrap();

        let mut page = args();
        page.page_html = Some(file.path().to_path_buf());
        page.labels = vec!["async".into()];
        let host = host_page(&page).unwrap();
        assert_eq!(host.labels(), vec!["rust", "tokio", "async"]);
        assert_eq!(host.current_post().path.as_deref(), Some("/2024/01/post-3.html"));
    }

    #[test]
    fn test_feed_address() {
        let mut page = args();
        page.labels = vec!["rust".into()];
        let host = host_page(&page).unwrap();
        let options = WidgetOptions {
            blog_url: Some(BLOG.to_string()),
            ..Default::default()
        };

        assert_eq!(
            feed_address(options, &host).unwrap(),
            "https://example.blogspot.com/feeds/posts/default?alt=json-in-script&max-results=50&category=rust"
        );
    }

    #[tokio::test]
    async fn test_render_prints_items() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
        let fetcher = Arc::new(StaticFetcher::new(feed_with_entries(5)));
        let ctx = AppContext::with_parts(fetcher, clock, false).with_seed(1);
        let options = WidgetOptions {
            blog_url: Some(BLOG.to_string()),
            max_posts: 2,
            ..Default::default()
        };

        let html = render(&ctx, options, &host_page(&args()).unwrap()).await.unwrap();
        assert_eq!(html.matches("<article").count(), 2);
        assert!(!html.contains("brp-lazy"));
        assert!(!html.contains("data-post-id=\"3\""));
    }
}
