use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::app::clock::{Clock, SystemClock};
use crate::app::error::{RelatedPostsError, Result};
use crate::cache::ResultCache;
use crate::config::{Configuration, WidgetOptions};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::host::HostPage;
use crate::lazy::LazyImageLoader;
use crate::widget::{Hooks, MountPoint, Widget, WidgetServices};

/// Owns what widget instances share: the feed cache, the image loader, the
/// fetcher and the clock.
pub struct AppContext {
    pub cache: Arc<ResultCache>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub loader: Arc<LazyImageLoader>,
    pub clock: Arc<dyn Clock>,
    seed: Option<u64>,
    next_instance: AtomicU64,
}

impl AppContext {
    /// HTTP fetching, system time, viewport-driven image loading.
    pub fn new() -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new()?);
        Ok(Self::with_parts(fetcher, Arc::new(SystemClock), true))
    }

    /// HTTP fetching and system time with no viewport: lazy images get
    /// their real source as soon as they are rendered.
    pub fn headless() -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new()?);
        Ok(Self::with_parts(fetcher, Arc::new(SystemClock), false))
    }

    pub fn with_parts(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        clock: Arc<dyn Clock>,
        intersection_supported: bool,
    ) -> Self {
        Self {
            cache: Arc::new(ResultCache::new(clock.clone())),
            fetcher,
            loader: Arc::new(LazyImageLoader::new(intersection_supported)),
            clock,
            seed: None,
            next_instance: AtomicU64::new(1),
        }
    }

    /// Seed every widget's shuffle so output is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate `options` against `page` and build an idle widget on `mount`.
    ///
    /// Configuration errors are reported through `on_config_error` and the
    /// log, and nothing is mounted.
    pub fn initialize<M: MountPoint>(
        &self,
        mount: M,
        options: WidgetOptions,
        page: &HostPage,
        hooks: Hooks,
    ) -> Result<Widget<M>> {
        let config = match Configuration::new(options, page) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Related posts: {}", e);
                if let Some(on_config_error) = &hooks.on_config_error {
                    on_config_error(&e.to_string());
                }
                return Err(RelatedPostsError::Config(e));
            }
        };

        let number = self.next_instance.fetch_add(1, Ordering::Relaxed);
        let rng: Box<dyn RngCore + Send> = match self.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed.wrapping_add(number))),
            None => Box::new(StdRng::from_entropy()),
        };

        let services = WidgetServices {
            cache: self.cache.clone(),
            fetcher: self.fetcher.clone(),
            loader: self.loader.clone(),
            clock: self.clock.clone(),
        };

        tracing::debug!("Initialized widget w{} for {}", number, config.blog_origin());
        Ok(Widget::new(
            format!("w{}", number),
            config,
            page.current_post(),
            hooks,
            services,
            rng,
            mount,
        ))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn destroy<M: MountPoint>(&self, widget: &Widget<M>) {
        widget.destroy();
    }
}
