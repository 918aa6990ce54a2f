pub mod address;
pub mod http_fetcher;

pub use address::FeedAddressBuilder;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::RawFeedResponse;

/// Retrieves a feed envelope from a request address.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<RawFeedResponse>;
}
