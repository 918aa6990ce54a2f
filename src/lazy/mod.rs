//! Progressive image loading.
//!
//! Each tracked image moves `Pending → Loading → Loaded | Errored`. The host
//! reports how far images are from the viewport and whether a load
//! succeeded; the loader answers with the source changes to apply. Without
//! viewport-intersection support every image skips straight to `Loading`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::render::ImageSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    /// Placeholder shown, real source recorded but not applied.
    Pending,
    /// Real source applied, waiting for load or error.
    Loading,
    Loaded,
    Errored,
}

impl ImageState {
    pub fn is_observed(&self) -> bool {
        matches!(self, ImageState::Pending | ImageState::Loading)
    }
}

/// A source the mount point must apply to one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUpdate {
    pub image_id: String,
    pub src: String,
}

/// How far an image is outside the viewport, in pixels. Zero or negative
/// means it is at least partly visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub image_id: String,
    pub distance_px: f64,
}

impl Intersection {
    pub fn new(image_id: &str, distance_px: f64) -> Self {
        Self {
            image_id: image_id.to_string(),
            distance_px,
        }
    }
}

#[derive(Debug, Clone)]
struct TrackedImage {
    src: String,
    fallback_src: String,
    root_margin_px: f64,
    state: ImageState,
}

#[derive(Debug)]
pub struct LazyImageLoader {
    intersection_supported: bool,
    images: Mutex<HashMap<String, TrackedImage>>,
}

impl LazyImageLoader {
    pub fn new(intersection_supported: bool) -> Self {
        Self {
            intersection_supported,
            images: Mutex::new(HashMap::new()),
        }
    }

    pub fn intersection_supported(&self) -> bool {
        self.intersection_supported
    }

    /// Start tracking a rendered image. Returns the source to apply right
    /// away, if any: eager images already carry theirs, lazy images wait for
    /// the viewport unless intersection is unsupported.
    pub fn observe(&self, slot: &ImageSlot, fallback_src: &str, root_margin_px: f64) -> Option<SourceUpdate> {
        let (state, update) = if !slot.lazy {
            (ImageState::Loading, None)
        } else if !self.intersection_supported {
            (
                ImageState::Loading,
                Some(SourceUpdate {
                    image_id: slot.id.clone(),
                    src: slot.src.clone(),
                }),
            )
        } else {
            (ImageState::Pending, None)
        };

        self.lock().insert(
            slot.id.clone(),
            TrackedImage {
                src: slot.src.clone(),
                fallback_src: fallback_src.to_string(),
                root_margin_px,
                state,
            },
        );
        update
    }

    /// Apply the real source to pending images within their margin.
    pub fn on_intersections(&self, entries: &[Intersection]) -> Vec<SourceUpdate> {
        let mut images = self.lock();
        entries
            .iter()
            .filter_map(|entry| {
                let image = images.get_mut(&entry.image_id)?;
                if image.state != ImageState::Pending || entry.distance_px > image.root_margin_px {
                    return None;
                }
                image.state = ImageState::Loading;
                tracing::debug!("Image {} entered viewport margin", entry.image_id);
                Some(SourceUpdate {
                    image_id: entry.image_id.clone(),
                    src: image.src.clone(),
                })
            })
            .collect()
    }

    /// Returns whether the image moved to `Loaded`.
    pub fn mark_loaded(&self, image_id: &str) -> bool {
        let mut images = self.lock();
        match images.get_mut(image_id) {
            Some(image) if image.state == ImageState::Loading => {
                image.state = ImageState::Loaded;
                true
            }
            _ => false,
        }
    }

    /// Move a loading image to `Errored` and hand back its fallback source.
    pub fn mark_errored(&self, image_id: &str) -> Option<SourceUpdate> {
        let mut images = self.lock();
        let image = images.get_mut(image_id)?;
        if image.state != ImageState::Loading {
            return None;
        }
        image.state = ImageState::Errored;
        tracing::debug!("Image {} failed, using fallback", image_id);
        Some(SourceUpdate {
            image_id: image_id.to_string(),
            src: image.fallback_src.clone(),
        })
    }

    pub fn state(&self, image_id: &str) -> Option<ImageState> {
        self.lock().get(image_id).map(|image| image.state)
    }

    /// Number of images still waiting on the viewport or a load result.
    pub fn observed_count(&self) -> usize {
        self.lock()
            .values()
            .filter(|image| image.state.is_observed())
            .count()
    }

    /// Forget every image whose id starts with `prefix`.
    pub fn forget(&self, prefix: &str) {
        self.lock().retain(|id, _| !id.starts_with(prefix));
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, TrackedImage>> {
        self.images.lock().unwrap_or_else(|e| e.into_inner())
    }
}
