//! In-memory fetcher doubles that record how they were called.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::app::{RelatedPostsError, Result};
use crate::domain::RawFeedResponse;
use crate::fetcher::Fetcher;

/// Answers every request with the configured response.
pub struct StaticFetcher {
    response: Mutex<Option<RawFeedResponse>>,
    calls: AtomicUsize,
    addresses: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new(response: RawFeedResponse) -> Self {
        Self {
            response: Mutex::new(Some(response)),
            calls: AtomicUsize::new(0),
            addresses: Mutex::new(Vec::new()),
        }
    }

    /// Fails every request with a network error.
    pub fn failing() -> Self {
        Self {
            response: Mutex::new(None),
            calls: AtomicUsize::new(0),
            addresses: Mutex::new(Vec::new()),
        }
    }

    pub fn set_response(&self, response: RawFeedResponse) {
        *self.response.lock().unwrap() = Some(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_address(&self) -> Option<String> {
        self.addresses.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<RawFeedResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.addresses.lock().unwrap().push(url.to_string());
        self.response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RelatedPostsError::Network("connection refused".into()))
    }
}

/// Holds every request open until [`GatedFetcher::release`] is called.
pub struct GatedFetcher {
    response: RawFeedResponse,
    calls: AtomicUsize,
    called: Notify,
    gate: Notify,
}

impl GatedFetcher {
    pub fn new(response: RawFeedResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            called: Notify::new(),
            gate: Notify::new(),
        }
    }

    pub async fn wait_until_called(&self) {
        self.called.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for GatedFetcher {
    async fn fetch(&self, _url: &str) -> Result<RawFeedResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.called.notify_one();
        self.gate.notified().await;
        Ok(self.response.clone())
    }
}

/// Answers after a fixed delay on the tokio clock.
pub struct SlowFetcher {
    response: RawFeedResponse,
    delay: Duration,
}

impl SlowFetcher {
    pub fn new(response: RawFeedResponse, delay: Duration) -> Self {
        Self { response, delay }
    }
}

#[async_trait]
impl Fetcher for SlowFetcher {
    async fn fetch(&self, _url: &str) -> Result<RawFeedResponse> {
        tokio::time::sleep(self.delay).await;
        Ok(self.response.clone())
    }
}
