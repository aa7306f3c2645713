//! Token image validation and upload

use crate::constants::image::{ACCEPTED_TYPES, MAX_IMAGE_BYTES};
use crate::error::{AppError, AppResult};
use crate::storage::{object_path, ObjectStore, ProgressCallback};
use std::path::Path;
use std::sync::Arc;

/// Image file selected by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name, used as the object name
    pub file_name: String,
    /// Raw bytes
    pub bytes: Vec<u8>,
    /// MIME type derived from the extension
    pub content_type: String,
}

impl ImageFile {
    /// Build from a name and bytes, deriving the content type
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> AppResult<Self> {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).ok_or_else(|| {
            AppError::Validation(format!(
                "Unsupported image type: {} (accepted: PNG, JPG, GIF)",
                file_name
            ))
        })?;

        Ok(Self {
            file_name,
            bytes,
            content_type: content_type.to_string(),
        })
    }

    /// Read an image from disk
    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AppError::Validation(format!("Invalid image path: {}", path.display()))
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        Self::new(file_name, bytes)
    }

    /// Check size limits
    pub fn validate(&self, max_bytes: usize) -> AppResult<()> {
        if self.bytes.is_empty() {
            return Err(AppError::Validation(format!(
                "Image {} is empty",
                self.file_name
            )));
        }

        if self.bytes.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "Image {} is {} bytes, the limit is {} bytes",
                self.file_name,
                self.bytes.len(),
                max_bytes
            )));
        }

        Ok(())
    }
}

/// Content type for an accepted image extension
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();

    ACCEPTED_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
}

/// Uploads token images under the image prefix
pub struct ImageUploader {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    max_bytes: usize,
}

impl ImageUploader {
    /// Create an uploader writing under `prefix`
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    /// Override the size limit
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Upload the image and return its public URL
    ///
    /// The object name is the file name, so uploading the same file name
    /// twice replaces the earlier object.
    pub async fn upload(
        &self,
        image: &ImageFile,
        progress: Option<ProgressCallback>,
    ) -> AppResult<String> {
        image.validate(self.max_bytes)?;

        let path = object_path(&self.prefix, &image.file_name);

        let handle = self
            .store
            .put(&path, image.bytes.clone(), &image.content_type, progress)
            .await
            .map_err(|e| AppError::ImageUpload(e.to_string()))?;

        let url = self
            .store
            .public_url(&handle)
            .await
            .map_err(|e| AppError::ImageUpload(e.to_string()))?;

        tracing::info!(path = %path, url = %url, "Image uploaded");

        Ok(url)
    }
}
