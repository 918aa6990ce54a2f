//! One widget instance: the adapter between the data pipeline
//! (address → fetch → normalize → select) and the view tree.
//!
//! ```text
//!            load()                 ok
//!   Idle ───────────▶ Loading ──────────▶ Rendered
//!    ▲                   │                   │
//!    │ retry()/reset()   │ error             │ reset()
//!    └────────────── Errored ◀───────────────┘ (back to Idle)
//! ```
//!
//! A load is only started from `Idle`. `destroy()` is terminal; a fetch that
//! completes after it is dropped without touching the mount point or hooks.

pub mod hooks;
pub mod mount;

pub use hooks::{Hooks, ImageRef};
pub use mount::{HtmlMount, MountPoint};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::RngCore;

use crate::app::{Clock, RelatedPostsError, Result};
use crate::cache::{cache_key_for, ResultCache};
use crate::config::Configuration;
use crate::domain::{CurrentPostContext, Post, RawFeedResponse};
use crate::fetcher::{FeedAddressBuilder, Fetcher};
use crate::lazy::{Intersection, LazyImageLoader, SourceUpdate};
use crate::normalizer::PostNormalizer;
use crate::render::{self, CarouselState, RenderPipeline};
use crate::selector::PostSelector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Idle,
    Loading,
    Rendered,
    Errored,
    Destroyed,
}

/// What a call to [`Widget::load`] ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Number of posts rendered; zero means the empty view.
    Rendered(usize),
    Failed,
    /// Not started because the widget was not idle.
    Rejected(WidgetState),
    /// The widget was destroyed while the load was in flight.
    Discarded,
}

/// Shared services a widget is built from.
#[derive(Clone)]
pub struct WidgetServices {
    pub cache: Arc<ResultCache>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub loader: Arc<LazyImageLoader>,
    pub clock: Arc<dyn Clock>,
}

struct WidgetInner<M> {
    state: WidgetState,
    mount: M,
    posts: Vec<Post>,
    carousel: Option<CarouselState>,
    /// Real source of each rendered image, by image id.
    images: HashMap<String, String>,
}

pub struct Widget<M: MountPoint> {
    instance_id: String,
    config: Configuration,
    context: CurrentPostContext,
    hooks: Hooks,
    services: WidgetServices,
    normalizer: PostNormalizer,
    selector: PostSelector,
    renderer: RenderPipeline,
    cache_key: String,
    rng: Mutex<Box<dyn RngCore + Send>>,
    inner: Mutex<WidgetInner<M>>,
}

impl<M: MountPoint> Widget<M> {
    pub fn new(
        instance_id: String,
        config: Configuration,
        context: CurrentPostContext,
        hooks: Hooks,
        services: WidgetServices,
        rng: Box<dyn RngCore + Send>,
        mount: M,
    ) -> Self {
        let cache_key = cache_key_for(&config, &context);
        Self {
            normalizer: PostNormalizer::from_config(&config),
            selector: PostSelector::from_config(&config),
            renderer: RenderPipeline::from_config(&config),
            instance_id,
            config,
            context,
            hooks,
            services,
            cache_key,
            rng: Mutex::new(rng),
            inner: Mutex::new(WidgetInner {
                state: WidgetState::Idle,
                mount,
                posts: Vec::new(),
                carousel: None,
                images: HashMap::new(),
            }),
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn context(&self) -> &CurrentPostContext {
        &self.context
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn state(&self) -> WidgetState {
        self.lock().state
    }

    /// Posts currently on screen.
    pub fn posts(&self) -> Vec<Post> {
        self.lock().posts.clone()
    }

    pub fn carousel(&self) -> Option<CarouselState> {
        self.lock().carousel
    }

    /// Run `f` against the mount point.
    pub fn with_mount<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.lock().mount)
    }

    /// The feed address this widget requests.
    pub fn feed_address(&self) -> String {
        FeedAddressBuilder::for_widget(&self.config, &self.context).build()
    }

    pub async fn load(&self) -> LoadOutcome {
        {
            let mut inner = self.lock();
            if inner.state != WidgetState::Idle {
                tracing::debug!("Widget {} is {:?}, ignoring load", self.instance_id, inner.state);
                return LoadOutcome::Rejected(inner.state);
            }
            inner.state = WidgetState::Loading;
            inner.mount.replace(render::loading_view());
        }

        let fetched = self.fetch_feed().await;

        if self.state() == WidgetState::Destroyed {
            tracing::debug!("Widget {} destroyed during load, dropping result", self.instance_id);
            return LoadOutcome::Discarded;
        }

        let (feed, from_cache) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => return self.fail(e),
        };

        if let Some(on_load) = &self.hooks.on_load {
            on_load(&feed);
        }
        if self.config.options().cache_results && !from_cache {
            self.services.cache.set(&self.cache_key, feed.clone());
        }

        match self.select_posts(&feed) {
            Ok(posts) => self.show(posts),
            Err(e) => self.fail(e),
        }
    }

    /// Reload after a failure.
    pub async fn retry(&self) -> LoadOutcome {
        {
            let mut inner = self.lock();
            if inner.state != WidgetState::Errored {
                return LoadOutcome::Rejected(inner.state);
            }
            inner.state = WidgetState::Idle;
        }
        self.load().await
    }

    /// Return a settled widget to `Idle` so it can load again. Returns
    /// whether the state changed.
    pub fn reset(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            WidgetState::Rendered | WidgetState::Errored => {
                inner.state = WidgetState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn destroy(&self) {
        let mut inner = self.lock();
        if inner.state == WidgetState::Destroyed {
            return;
        }
        inner.state = WidgetState::Destroyed;
        inner.mount.clear();
        inner.posts.clear();
        inner.images.clear();
        inner.carousel = None;
        self.services.loader.forget(&self.image_prefix());
        tracing::debug!("Widget {} destroyed", self.instance_id);
    }

    /// Feed viewport distances to the loader. Entries for other widgets'
    /// images are ignored.
    pub fn on_viewport(&self, entries: &[Intersection]) {
        let prefix = self.image_prefix();
        let own: Vec<Intersection> = entries
            .iter()
            .filter(|entry| entry.image_id.starts_with(&prefix))
            .cloned()
            .collect();
        let updates = self.services.loader.on_intersections(&own);
        let mut inner = self.lock();
        for update in updates {
            inner.mount.set_image_source(&update.image_id, &update.src);
        }
    }

    pub fn image_loaded(&self, image_id: &str) {
        if !self.services.loader.mark_loaded(image_id) {
            return;
        }
        let image = self.image_ref(image_id);
        if let Some(on_image_load) = &self.hooks.on_image_load {
            on_image_load(&image);
        }
    }

    /// Swap in the default thumbnail for an image that failed to load.
    pub fn image_failed(&self, image_id: &str) {
        let Some(SourceUpdate { src, .. }) = self.services.loader.mark_errored(image_id) else {
            return;
        };
        let image = self.image_ref(image_id);
        self.lock().mount.set_image_source(image_id, &src);
        if let Some(on_image_error) = &self.hooks.on_image_error {
            on_image_error(&image);
        }
    }

    pub fn carousel_next(&self) -> bool {
        self.move_carousel(CarouselState::next)
    }

    pub fn carousel_prev(&self) -> bool {
        self.move_carousel(CarouselState::prev)
    }

    fn move_carousel(&self, step: fn(&mut CarouselState) -> bool) -> bool {
        let mut inner = self.lock();
        let Some(mut carousel) = inner.carousel else {
            return false;
        };
        if !step(&mut carousel) {
            return false;
        }
        inner.carousel = Some(carousel);
        inner.mount.set_carousel(&carousel);
        true
    }

    async fn fetch_feed(&self) -> Result<(RawFeedResponse, bool)> {
        if self.config.options().cache_results {
            if let Some(feed) = self
                .services
                .cache
                .get(&self.cache_key, self.config.cache_duration())
            {
                // Keep success asynchronous on a hit too.
                tokio::task::yield_now().await;
                return Ok((feed, true));
            }
        }

        let address = self.feed_address();
        tracing::info!("Fetching related posts from {}", address);

        let timeout = self.config.fetch_timeout();
        let feed = tokio::time::timeout(timeout, self.services.fetcher.fetch(&address))
            .await
            .map_err(|_| RelatedPostsError::Timeout(timeout))??;
        Ok((feed, false))
    }

    fn select_posts(&self, feed: &RawFeedResponse) -> Result<Vec<Post>> {
        let posts = self
            .normalizer
            .normalize_feed(feed, self.services.clock.now())?;
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.selector.select(posts, &self.context, &mut **rng))
    }

    fn show(&self, posts: Vec<Post>) -> LoadOutcome {
        if let Some(before_render) = &self.hooks.before_render {
            before_render(&posts);
        }

        let output = self
            .renderer
            .render(&posts, self.services.clock.now(), &self.instance_id);
        let options = self.config.options();
        let margin = f64::from(options.lazy_root_margin_px);

        {
            let mut inner = self.lock();
            if inner.state == WidgetState::Destroyed {
                return LoadOutcome::Discarded;
            }

            let loader = &self.services.loader;
            loader.forget(&self.image_prefix());
            inner.images.clear();
            inner.mount.replace(output.tree);

            for slot in &output.images {
                inner.images.insert(slot.id.clone(), slot.src.clone());
                if let Some(update) = loader.observe(slot, &options.default_thumbnail, margin) {
                    inner.mount.set_image_source(&update.image_id, &update.src);
                }
            }

            inner.carousel = output.carousel;
            inner.posts = posts.clone();
            inner.state = WidgetState::Rendered;
        }

        tracing::info!("Rendered {} related posts", posts.len());
        if let Some(after_render) = &self.hooks.after_render {
            after_render(&posts);
        }
        LoadOutcome::Rendered(posts.len())
    }

    fn fail(&self, error: RelatedPostsError) -> LoadOutcome {
        {
            let mut inner = self.lock();
            if inner.state == WidgetState::Destroyed {
                return LoadOutcome::Discarded;
            }
            if error.is_fetch_error() {
                tracing::error!("Failed to load related posts: {}", error);
            } else {
                tracing::error!("Related posts widget error: {}", error);
            }
            inner.state = WidgetState::Errored;
            if self.hooks.on_error.is_none() {
                inner.mount.replace(render::error_view(self.config.blog_origin()));
            }
        }
        if let Some(on_error) = &self.hooks.on_error {
            on_error(&error);
        }
        LoadOutcome::Failed
    }

    fn image_ref(&self, image_id: &str) -> ImageRef {
        ImageRef {
            image_id: image_id.to_string(),
            src: self
                .lock()
                .images
                .get(image_id)
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn image_prefix(&self) -> String {
        format!("{}-", self.instance_id)
    }

    fn lock(&self) -> MutexGuard<'_, WidgetInner<M>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
