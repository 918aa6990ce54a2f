use std::fmt;
use std::sync::Arc;

use crate::app::RelatedPostsError;
use crate::domain::{Post, RawFeedResponse};

pub type Hook<T> = Arc<dyn Fn(&T) + Send + Sync>;
pub type PostsHook = Arc<dyn Fn(&[Post]) + Send + Sync>;
pub type MessageHook = Arc<dyn Fn(&str) + Send + Sync>;

/// An image whose load has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub image_id: String,
    pub src: String,
}

/// Optional host callbacks, each invoked synchronously at its lifecycle point.
///
/// Setting `on_error` hands error presentation to the host: the widget then
/// leaves its mount point as it was instead of rendering the error view.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_load: Option<Hook<RawFeedResponse>>,
    pub on_error: Option<Hook<RelatedPostsError>>,
    pub on_config_error: Option<MessageHook>,
    pub before_render: Option<PostsHook>,
    pub after_render: Option<PostsHook>,
    pub on_image_load: Option<Hook<ImageRef>>,
    pub on_image_error: Option<Hook<ImageRef>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_load(mut self, f: impl Fn(&RawFeedResponse) + Send + Sync + 'static) -> Self {
        self.on_load = Some(Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&RelatedPostsError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub fn on_config_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_config_error = Some(Arc::new(f));
        self
    }

    pub fn before_render(mut self, f: impl Fn(&[Post]) + Send + Sync + 'static) -> Self {
        self.before_render = Some(Arc::new(f));
        self
    }

    pub fn after_render(mut self, f: impl Fn(&[Post]) + Send + Sync + 'static) -> Self {
        self.after_render = Some(Arc::new(f));
        self
    }

    pub fn on_image_load(mut self, f: impl Fn(&ImageRef) + Send + Sync + 'static) -> Self {
        self.on_image_load = Some(Arc::new(f));
        self
    }

    pub fn on_image_error(mut self, f: impl Fn(&ImageRef) + Send + Sync + 'static) -> Self {
        self.on_image_error = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_load", &self.on_load.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_config_error", &self.on_config_error.is_some())
            .field("before_render", &self.before_render.is_some())
            .field("after_render", &self.after_render.is_some())
            .field("on_image_load", &self.on_image_load.is_some())
            .field("on_image_error", &self.on_image_error.is_some())
            .finish()
    }
}
