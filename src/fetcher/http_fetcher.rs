use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::{Result, RelatedPostsError};
use crate::domain::RawFeedResponse;
use crate::fetcher::Fetcher;

/// Only bounds establishing the connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// No overall request timeout is set on the client: each widget bounds
    /// its own fetch with its configured `fetch_timeout_ms`.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .gzip(true)
            .brotli(true)
            .user_agent("related-posts/0.1.0")
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawFeedResponse> {
        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let body = response.text().await?;
        tracing::debug!("Fetched {} bytes from {}", body.len(), url);

        RawFeedResponse::from_json(unwrap_jsonp(&body))
            .map_err(|e| RelatedPostsError::FeedParse(e.to_string()))
    }
}

/// `json-in-script` responses wrap the document in a callback call such as
/// `gdata.io.handleScriptLoaded({...});`. Bare JSON passes through.
pub fn unwrap_jsonp(body: &str) -> &str {
    let trimmed = body.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }

    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(open), Some(close)) if open < close => trimmed[open + 1..close].trim(),
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_bare_json() {
        assert_eq!(unwrap_jsonp("  {\"feed\":{}}\n"), "{\"feed\":{}}");
    }

    #[test]
    fn test_unwrap_callback() {
        let body = "// API callback\ngdata.io.handleScriptLoaded({\"feed\":{\"entry\":[]}});";
        assert_eq!(unwrap_jsonp(body), "{\"feed\":{\"entry\":[]}}");
    }

    #[test]
    fn test_unwrap_garbage_passes_through() {
        assert_eq!(unwrap_jsonp("not json"), "not json");
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpFetcher::new().is_ok());
    }
}
