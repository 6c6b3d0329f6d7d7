//! Loading documents into shared [`Composition`]s, with a process-wide cache.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::foundation::error::{LottieError, LottieResult};
use crate::model::Composition;
use crate::model::parser;
use crate::paint::Bitmap;

/// Decodes image asset bytes into premultiplied pixels.
pub trait ImageLoader: Send + Sync {
    /// Decode `bytes` (PNG, JPEG, ...).
    fn load(&self, bytes: &[u8]) -> LottieResult<Bitmap>;
}

/// [`ImageLoader`] backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultImageLoader;

impl ImageLoader for DefaultImageLoader {
    fn load(&self, bytes: &[u8]) -> LottieResult<Bitmap> {
        let rgba = image::load_from_memory(bytes)
            .context("decode image from memory")?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        Bitmap::from_rgba8(width, height, rgba.as_raw())
    }
}

/// Options for loading a document.
#[derive(Clone)]
pub struct LoadOpts {
    /// Look up and store the parsed model in the process-wide cache.
    pub use_cache: bool,
    /// Image decoder; `None` uses [`DefaultImageLoader`].
    pub image_loader: Option<Arc<dyn ImageLoader>>,
}

impl Default for LoadOpts {
    fn default() -> Self {
        Self {
            use_cache: true,
            image_loader: None,
        }
    }
}

impl fmt::Debug for LoadOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOpts")
            .field("use_cache", &self.use_cache)
            .field("image_loader", &self.image_loader.as_ref().map(|_| "custom"))
            .finish()
    }
}

static CACHE: Lazy<Mutex<HashMap<String, Arc<Composition>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Process-wide map from cache key to parsed model.
pub struct ModelCache;

impl ModelCache {
    /// Cached model for `key`.
    pub fn find(key: &str) -> Option<Arc<Composition>> {
        CACHE.lock().get(key).cloned()
    }

    /// Store `model` under `key`, replacing any previous entry.
    pub fn insert(key: &str, model: Arc<Composition>) {
        CACHE.lock().insert(key.to_owned(), model);
    }

    /// Drop every entry.
    pub fn clear() {
        CACHE.lock().clear();
    }

    /// Number of entries.
    pub fn len() -> usize {
        CACHE.lock().len()
    }

    /// Return `true` when the cache holds nothing.
    pub fn is_empty() -> bool {
        CACHE.lock().is_empty()
    }
}

/// Read and parse the document at `path`; the path string is the cache key.
#[tracing::instrument(skip(opts))]
pub fn load_from_path(path: &Path, opts: &LoadOpts) -> LottieResult<Arc<Composition>> {
    let key = path.to_string_lossy();
    if opts.use_cache
        && let Some(model) = ModelCache::find(&key)
    {
        tracing::debug!("model cache hit");
        return Ok(model);
    }
    let json = std::fs::read_to_string(path)
        .map_err(|e| LottieError::io(format!("read {}: {e}", path.display())))?;
    let model = Arc::new(parse(&json, path.parent(), opts)?);
    if opts.use_cache {
        tracing::debug!("model cache miss, inserting");
        ModelCache::insert(&key, Arc::clone(&model));
    }
    Ok(model)
}

/// Parse `json`. An empty `cache_key` bypasses the cache.
#[tracing::instrument(skip(json, opts), fields(len = json.len()))]
pub fn load_from_data(
    json: &str,
    cache_key: &str,
    resource_dir: Option<&Path>,
    opts: &LoadOpts,
) -> LottieResult<Arc<Composition>> {
    let cached = opts.use_cache && !cache_key.is_empty();
    if cached && let Some(model) = ModelCache::find(cache_key) {
        tracing::debug!("model cache hit");
        return Ok(model);
    }
    let model = Arc::new(parse(json, resource_dir, opts)?);
    if cached {
        tracing::debug!("model cache miss, inserting");
        ModelCache::insert(cache_key, Arc::clone(&model));
    }
    Ok(model)
}

fn parse(json: &str, resource_dir: Option<&Path>, opts: &LoadOpts) -> LottieResult<Composition> {
    match &opts.image_loader {
        Some(loader) => parser::parse(json, resource_dir, loader.as_ref()),
        None => parser::parse(json, resource_dir, &DefaultImageLoader),
    }
}

#[cfg(test)]
#[path = "../tests/unit/loader.rs"]
mod tests;
