//! Session-scoped disk cache.
//!
//! Each [`SessionCache`] owns one directory under a configured root, named by
//! a fresh UUID. The directory holds at most one text array file and any
//! number of image files. `new_cache` swaps in a fresh directory and
//! `delete_current_cache` tears it down; both swallow filesystem errors.
//!
//! Mutating operations take `&mut self`. Callers sharing one cache across
//! tasks must serialize access themselves (the demo server wraps it in a
//! `Mutex`).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use uuid::Uuid;

use crate::codec::{self, ImageCodec, PixelArray};
use crate::error::{DemoError, DemoResult};
use crate::shape;

/// File name of the cached text array inside a session directory.
pub const TEXT_CACHE_FILE: &str = "text_array.json";

/// A per-session cache directory.
#[derive(Debug)]
pub struct SessionCache {
    root: PathBuf,
    cache_id: Option<Uuid>,
    cache_dir: Option<PathBuf>,
    /// Orders image files by write time within the current directory.
    sequence: AtomicU64,
}

impl SessionCache {
    /// Create the root if needed and allocate a first session directory.
    pub fn new(root: impl Into<PathBuf>) -> DemoResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            DemoError::FileHandling(format!(
                "Error when creating cache root :: {}: {}",
                root.display(),
                e
            ))
        })?;

        let mut cache = Self {
            root,
            cache_id: None,
            cache_dir: None,
            sequence: AtomicU64::new(0),
        };
        cache.create_cache()?;
        Ok(cache)
    }

    fn create_cache(&mut self) -> DemoResult<Uuid> {
        let id = Uuid::new_v4();
        let dir = self.root.join(id.to_string());
        fs::create_dir_all(&dir).map_err(|e| {
            DemoError::FileHandling(format!(
                "Error when creating directory for cache :: {}: {}",
                dir.display(),
                e
            ))
        })?;

        tracing::debug!(cache_id = %id, dir = %dir.display(), "Session cache created");
        self.cache_id = Some(id);
        self.cache_dir = Some(dir);
        *self.sequence.get_mut() = 0;
        Ok(id)
    }

    /// Replace the current directory with a fresh one.
    pub fn new_cache(&mut self) -> DemoResult<Uuid> {
        self.delete_current_cache();
        self.create_cache()
    }

    /// Remove the current directory. Idempotent; errors are ignored.
    pub fn delete_current_cache(&mut self) {
        if let Some(dir) = self.cache_dir.take() {
            if let Err(e) = fs::remove_dir_all(&dir) {
                tracing::debug!(dir = %dir.display(), error = %e, "Ignoring cache removal failure");
            }
        }
        self.cache_id = None;
    }

    pub fn cache_id(&self) -> Option<Uuid> {
        self.cache_id
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn active_dir(&self) -> DemoResult<&Path> {
        self.cache_dir
            .as_deref()
            .ok_or_else(|| DemoError::InvalidCachePath("No active cache directory".to_string()))
    }

    fn text_cache_path(&self) -> DemoResult<PathBuf> {
        Ok(self.active_dir()?.join(TEXT_CACHE_FILE))
    }

    /// Persist an array of strings, replacing any earlier one.
    pub fn save_text_array<T: Serialize + ?Sized>(&self, texts: &T) -> DemoResult<PathBuf> {
        let texts = shape::string_array(texts)?;
        let path = self.text_cache_path()?;

        let encoded = serde_json::to_vec(&texts)
            .map_err(|e| DemoError::FileHandling(format!("Failed to encode text array: {}", e)))?;
        fs::write(&path, encoded).map_err(|e| {
            DemoError::FileHandling(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::debug!(count = texts.len(), path = %path.display(), "Text array cached");
        Ok(path)
    }

    /// Whether a text array has been cached in the current directory.
    pub fn has_text_array(&self) -> bool {
        self.text_cache_path().map(|p| p.is_file()).unwrap_or(false)
    }

    /// Read back the cached text array.
    pub fn load_text_array(&self) -> DemoResult<Vec<String>> {
        let path = self.text_cache_path()?;
        if !path.is_file() {
            return Err(DemoError::InvalidCachePath(format!(
                "No valid cache file found :: {}",
                path.display()
            )));
        }

        let content = fs::read(&path).map_err(|e| {
            DemoError::FileHandling(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_slice(&content).map_err(|e| {
            DemoError::MalformedCache(format!(
                "Text cache does not contain a valid string array: {}",
                e
            ))
        })
    }

    /// Write each image to its own file and return the paths in input order.
    ///
    /// Names combine a per-directory sequence number, a UUID for this call
    /// and the input index, so concurrent batches never collide.
    pub fn cache_image_file_array<B: AsRef<[u8]>>(&self, images: &[B]) -> DemoResult<Vec<PathBuf>> {
        let dir = self.active_dir()?;
        let batch = Uuid::new_v4();

        let mut paths = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            let bytes = image.as_ref();
            let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
            let path = dir.join(format!(
                "{:020}-{}-{}.{}",
                seq,
                batch,
                index,
                codec::file_extension(bytes)
            ));
            fs::write(&path, bytes).map_err(|e| {
                DemoError::FileHandling(format!("Failed to write {}: {}", path.display(), e))
            })?;
            paths.push(path);
        }

        tracing::debug!(count = paths.len(), batch = %batch, "Image files cached");
        Ok(paths)
    }

    /// PNG-encode decoded images into the cache.
    pub fn cache_pixel_array(
        &self,
        images: &[PixelArray],
        codec: &dyn ImageCodec,
    ) -> DemoResult<Vec<PathBuf>> {
        let encoded = images
            .iter()
            .map(|pixels| codec.encode_png(pixels))
            .collect::<DemoResult<Vec<_>>>()?;
        self.cache_image_file_array(&encoded)
    }

    /// Every cached image file, oldest first.
    pub fn cached_image_paths(&self) -> DemoResult<Vec<PathBuf>> {
        let dir = self.active_dir()?;
        let entries = fs::read_dir(dir).map_err(|e| {
            DemoError::InvalidCachePath(format!("Cannot list {}: {}", dir.display(), e))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .filter(|p| p.file_name().is_some_and(|n| n != TEXT_CACHE_FILE))
            .collect();
        paths.sort();
        Ok(paths)
    }
}
