//! Capability boundaries for the two external services the engine consumes:
//! bitmap loading and blob persistence.
//!
//! Both are narrow traits injected by the host instead of global singletons,
//! so the geometry and export code stays headlessly testable. The crate
//! ships an EXIF-aware loader; real blob storage (object store, CDN, ...)
//! lives in the host, with an in-memory implementation here for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::decode::{decode_bitmap, DecodeError};
use crate::raster::Raster;

/// Turns an encoded image source into a decoded, orientation-corrected
/// bitmap.
pub trait BitmapLoader {
    fn load_bitmap(&self, source: &[u8]) -> Result<Raster, DecodeError>;
}

/// Persists an encoded image buffer under a path and returns its URL.
pub trait BlobStore {
    fn upload(&self, data: &[u8], path: &str) -> Result<String, BlobStoreError>;
}

/// Errors surfaced by a [`BlobStore`].
#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// The destination path is not acceptable to the store.
    #[error("invalid destination path: {0}")]
    InvalidPath(String),

    /// The store could not persist the buffer.
    #[error("upload failed: {0}")]
    UploadFailed(String),
}

/// The default loader: EXIF-aware decode via [`decode_bitmap`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifBitmapLoader;

impl BitmapLoader for ExifBitmapLoader {
    fn load_bitmap(&self, source: &[u8]) -> Result<Raster, DecodeError> {
        decode_bitmap(source)
    }
}

/// A [`BlobStore`] that keeps uploads in memory. Intended for tests and
/// local tooling.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a previously uploaded blob by path.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.lock().ok()?.get(path).cloned()
    }
}

impl BlobStore for MemoryBlobStore {
    fn upload(&self, data: &[u8], path: &str) -> Result<String, BlobStoreError> {
        if path.is_empty() {
            return Err(BlobStoreError::InvalidPath(path.to_string()));
        }
        self.blobs
            .lock()
            .map_err(|e| BlobStoreError::UploadFailed(e.to_string()))?
            .insert(path.to_string(), data.to_vec());
        Ok(format!("memory://{path}"))
    }
}
