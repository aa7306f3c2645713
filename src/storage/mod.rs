//! Object store clients
//!
//! Images and metadata documents are written through the [`ObjectStore`]
//! trait, which mirrors the two calls the launch flow needs: write an
//! object, then ask for its public URL.

pub mod firebase;
pub mod memory;

pub use firebase::FirebaseStorage;
pub use memory::MemoryObjectStore;

use crate::error::AppResult;
use std::sync::Arc;

/// Opaque reference to a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHandle {
    /// Full object path inside the bucket
    pub path: String,
    /// Download token issued by the store, if any
    pub token: Option<String>,
}

/// Bytes sent so far for one upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl UploadProgress {
    /// Whole percentage, 100 for empty bodies
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 100;
        }
        ((self.bytes_transferred.min(self.total_bytes) * 100) / self.total_bytes) as u8
    }
}

/// Upload progress callback
pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// Object store trait
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` at `path`
    async fn put(
        &self,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
        progress: Option<ProgressCallback>,
    ) -> AppResult<ObjectHandle>;

    /// Public retrieval URL of a stored object
    async fn public_url(&self, handle: &ObjectHandle) -> AppResult<String>;
}

/// Join a prefix and a name with exactly one `/`
pub fn object_path(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}
