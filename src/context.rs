//! Explicit owner of the boundary cache, classifier and thresholds.
//!
//! Nothing in this crate is process-global except the one-time CPU
//! capability check. Callers that share a context across threads wrap it in
//! their own lock; read-only transform calls take `&self`.

use crate::cache::CacheStore;
use crate::classifier::Classifier;
use crate::config::GuardConfig;
use crate::error::Result;
use crate::transform::{ColorTransform, TransformId};

/// Cache, classifier and configuration used by every guarded entry point.
#[derive(Clone, Debug)]
pub struct GuardContext {
    pub(crate) cache: CacheStore,
    pub(crate) classifier: Classifier,
    pub(crate) config: GuardConfig,
}

impl Default for GuardContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardContext {
    /// Empty cache, default thresholds, detected classifier.
    pub fn new() -> Self {
        Self::with_config(GuardConfig::default())
    }

    /// Like [`new`](Self::new) with thresholds from [`GuardConfig::from_env`].
    pub fn from_env() -> Self {
        Self::with_config(GuardConfig::from_env())
    }

    /// Empty cache with `config`.
    pub fn with_config(config: GuardConfig) -> Self {
        Self {
            cache: CacheStore::new(),
            classifier: Classifier::from_config(&config),
            config,
        }
    }

    /// Replace the classifier.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Precompute boundary responses for `transform` (see [`CacheStore::register`]).
    pub fn register<T: ColorTransform + ?Sized>(&mut self, transform: &T) -> Result<usize> {
        self.cache.register(transform)
    }

    /// Register with explicit channel counts (see [`CacheStore::init`]).
    pub fn init<T: ColorTransform + ?Sized>(
        &mut self,
        transform: &T,
        input_channels: u32,
        output_channels: u32,
    ) -> Result<usize> {
        self.cache.init(transform, input_channels, output_channels)
    }

    /// Forget the cache entry for `id`.
    pub fn release(&mut self, id: TransformId) {
        self.cache.clear(id);
    }

    /// Forget every cache entry.
    pub fn clear_all(&mut self) {
        self.cache.clear_all();
    }

    /// The boundary cache.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Active classifier.
    pub fn classifier(&self) -> Classifier {
        self.classifier
    }

    /// Active thresholds.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }
}
