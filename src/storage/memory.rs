//! In-process object store
//!
//! Used for dry runs, where nothing should leave the machine, and by tests.

use super::{ObjectHandle, ObjectStore, ProgressCallback, UploadProgress};
use crate::error::{AppError, AppResult};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Stored object
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Object store backed by a map
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    url_prefix: String,
}

impl MemoryObjectStore {
    /// Create an empty store whose URLs start with `memory://`
    pub fn new() -> Self {
        Self::with_url_prefix("memory://")
    }

    /// Create an empty store with a custom URL prefix
    pub fn with_url_prefix(url_prefix: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            url_prefix: url_prefix.into(),
        }
    }

    /// Fetch a stored object by path; the CLI lists these after a dry run
    pub fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().get(path).cloned()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// True when nothing was stored
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Stored paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
        progress: Option<ProgressCallback>,
    ) -> AppResult<ObjectHandle> {
        let total_bytes = body.len() as u64;

        self.objects.write().insert(
            path.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );

        if let Some(progress) = progress {
            progress(UploadProgress {
                bytes_transferred: total_bytes,
                total_bytes,
            });
        }

        tracing::debug!(path = %path, bytes = total_bytes, "Stored object in memory");

        Ok(ObjectHandle {
            path: path.to_string(),
            token: None,
        })
    }

    async fn public_url(&self, handle: &ObjectHandle) -> AppResult<String> {
        if !self.objects.read().contains_key(&handle.path) {
            return Err(AppError::Storage(format!(
                "Object not found: {}",
                handle.path
            )));
        }

        Ok(format!("{}{}", self.url_prefix, handle.path))
    }
}
