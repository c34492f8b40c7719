//! Marker image resources.
//!
//! Images are addressed by `(source, width, height)`. A marker whose size is
//! not configured requests its image under the unsized key `(source, None,
//! None)`; once drawn, the symbolizer adds the same image again under the
//! sized key. The unsized entry is never removed and nothing is evicted.
//!
//! Loading is the only asynchronous boundary. Loaders receive a
//! [`LoadSender`] and may complete at any later point on the same thread;
//! completions are applied when the renderer drains the channel, never in
//! the middle of a render pass.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use mapcanvas_core::GeometryId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Failed to decode image '{key}': {message}")]
    Decode { key: String, message: String },
}

/// Cache address of an image: source identifier plus requested size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceKey {
    pub source: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl ResourceKey {
    pub fn new(source: &str, width: Option<f64>, height: Option<f64>) -> Self {
        Self {
            source: source.to_string(),
            width,
            height,
        }
    }

    /// A key with no configured size; the image keeps its intrinsic size.
    pub fn auto(source: &str) -> Self {
        Self::new(source, None, None)
    }

    pub fn is_sized(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

fn dim_bits(dim: Option<f64>) -> Option<u64> {
    // 0.0 and -0.0 compare equal, so they must hash equal.
    dim.map(|d| if d == 0.0 { 0u64 } else { d.to_bits() })
}

impl PartialEq for ResourceKey {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && dim_bits(self.width) == dim_bits(other.width)
            && dim_bits(self.height) == dim_bits(other.height)
    }
}

impl Eq for ResourceKey {}

impl Hash for ResourceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        dim_bits(self.width).hash(state);
        dim_bits(self.height).hash(state);
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dim = |d: Option<f64>| d.map_or_else(|| "auto".to_string(), |v| v.to_string());
        write!(f, "{} [{}x{}]", self.source, dim(self.width), dim(self.height))
    }
}

/// A loaded image with its intrinsic pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageHandle {
    pub id: Uuid,
    pub source: String,
    pub width: f64,
    pub height: f64,
}

impl ImageHandle {
    pub fn new(source: &str, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: source.to_string(),
            width,
            height,
        }
    }
}

/// Loaded images by key.
#[derive(Debug, Default)]
pub struct ResourceCache {
    images: HashMap<ResourceKey, ImageHandle>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resource_loaded(&self, key: &ResourceKey) -> bool {
        self.images.contains_key(key)
    }

    /// Stores `image` under `key`, replacing any previous entry.
    pub fn add_resource(&mut self, key: ResourceKey, image: ImageHandle) {
        log::debug!("Caching {} ({}x{})", key, image.width, image.height);
        self.images.insert(key, image);
    }

    pub fn get_image(&self, key: &ResourceKey) -> Option<&ImageHandle> {
        self.images.get(key)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

pub type LoadResult = Result<ImageHandle, LoadError>;

type Completions = Rc<RefCell<Vec<(ResourceKey, LoadResult)>>>;

/// Handed to a loader; reports the outcome of one or more requests.
#[derive(Clone)]
pub struct LoadSender {
    completed: Completions,
}

impl LoadSender {
    pub fn complete(&self, key: ResourceKey, result: LoadResult) {
        self.completed.borrow_mut().push((key, result));
    }
}

impl fmt::Debug for LoadSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadSender")
            .field("queued", &self.completed.borrow().len())
            .finish()
    }
}

/// Fetches images for the renderer.
pub trait ResourceLoader {
    /// Starts loading `key`. Must eventually call `sender.complete` at most once for it;
    /// may do so before returning.
    fn load(&mut self, key: ResourceKey, sender: LoadSender);
}

/// Tracks in-flight requests and queues their completions.
#[derive(Debug, Default)]
pub struct LoadChannel {
    completed: Completions,
    requesters: HashMap<ResourceKey, Vec<GeometryId>>,
    failed: HashSet<ResourceKey>,
}

impl LoadChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> LoadSender {
        LoadSender {
            completed: Rc::clone(&self.completed),
        }
    }

    pub fn is_pending(&self, key: &ResourceKey) -> bool {
        self.requesters.contains_key(key)
    }

    pub fn has_failed(&self, key: &ResourceKey) -> bool {
        self.failed.contains(key)
    }

    /// Asks the loader for `key` on behalf of `geometry`.
    ///
    /// Returns `true` if a new load was started. Keys already in flight only
    /// record the extra requester; keys that failed before are not retried.
    pub fn request(
        &mut self,
        key: ResourceKey,
        geometry: GeometryId,
        loader: &mut dyn ResourceLoader,
    ) -> bool {
        if self.failed.contains(&key) {
            return false;
        }
        if let Some(waiting) = self.requesters.get_mut(&key) {
            if !waiting.contains(&geometry) {
                waiting.push(geometry);
            }
            return false;
        }
        log::debug!("Requesting {}", key);
        self.requesters.insert(key.clone(), vec![geometry]);
        loader.load(key, self.sender());
        true
    }

    /// Applies queued completions to `cache`.
    ///
    /// Returns the geometries whose render output is now stale.
    pub fn drain(&mut self, cache: &mut ResourceCache) -> Vec<GeometryId> {
        let completed = std::mem::take(&mut *self.completed.borrow_mut());
        let mut stale = Vec::new();
        for (key, result) in completed {
            let requesters = self.requesters.remove(&key).unwrap_or_default();
            match result {
                Ok(image) => {
                    cache.add_resource(key, image);
                    for id in requesters {
                        if !stale.contains(&id) {
                            stale.push(id);
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Failed to load {}: {}", key, e);
                    self.failed.insert(key);
                }
            }
        }
        stale
    }
}
