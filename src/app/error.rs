use std::time::Duration;

use thiserror::Error;

use crate::config::{ConfigError, ConfigFileError};

#[derive(Error, Debug)]
pub enum RelatedPostsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure reported by a non-HTTP fetcher.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Feed request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelatedPostsError {
    /// Network failures, timeouts and malformed feeds all take the same
    /// recovery path: the error view (or the host's `on_error` hook).
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            RelatedPostsError::Http(_)
                | RelatedPostsError::Network(_)
                | RelatedPostsError::Timeout(_)
                | RelatedPostsError::FeedParse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RelatedPostsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_grouping() {
        assert!(RelatedPostsError::Timeout(Duration::from_secs(10)).is_fetch_error());
        assert!(RelatedPostsError::FeedParse("bad entry".into()).is_fetch_error());
        assert!(!RelatedPostsError::Config(ConfigError::MissingBlogUrl).is_fetch_error());
    }

    #[test]
    fn test_timeout_message() {
        let err = RelatedPostsError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "Feed request timed out after 10s");
    }
}
