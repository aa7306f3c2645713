//! Firebase Storage client
//!
//! Talks to the Firebase Storage REST API:
//! - Upload: `POST {base}/v0/b/{bucket}/o?name={path}`
//! - Metadata: `GET {base}/v0/b/{bucket}/o/{path}`
//! - Download URL: `{base}/v0/b/{bucket}/o/{path}?alt=media&token={token}`
//!
//! Object paths are a single URL segment, so `/` inside a path is sent
//! percent-encoded.

use super::{ObjectHandle, ObjectStore, ProgressCallback, UploadProgress};
use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// Upload body chunk size; progress is reported once per chunk
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Object metadata returned by upload and metadata requests
#[derive(Debug, Deserialize)]
struct ObjectMetadata {
    name: String,
    /// Comma-separated download tokens
    #[serde(rename = "downloadTokens", default)]
    download_tokens: Option<String>,
}

impl ObjectMetadata {
    fn first_token(&self) -> Option<String> {
        self.download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }
}

/// Firebase Storage REST client
pub struct FirebaseStorage {
    /// HTTP client
    client: reqwest::Client,
    /// API base URL
    api_base_url: String,
    /// Bucket name
    bucket: String,
    /// Optional bearer token
    auth_token: Option<String>,
}

impl FirebaseStorage {
    /// Create a client from storage configuration
    pub fn new(config: &StorageConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Http(format!("Failed to create HTTP client: {}", e)))?;

        if config.bucket.is_empty() {
            return Err(AppError::Validation(
                "Storage bucket is not configured".to_string(),
            ));
        }

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            bucket: config.bucket.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// Replace the auth token (e.g. with one loaded from the vault)
    pub fn with_auth_token(mut self, auth_token: Option<String>) -> Self {
        if auth_token.is_some() {
            self.auth_token = auth_token;
        }
        self
    }

    /// `{base}/v0/b/{bucket}/o`
    fn objects_url(&self) -> AppResult<Url> {
        let mut url = Url::parse(&self.api_base_url).map_err(|e| {
            AppError::Validation(format!("Invalid storage URL {}: {}", self.api_base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                AppError::Validation(format!(
                    "Storage URL cannot be a base: {}",
                    self.api_base_url
                ))
            })?
            .pop_if_empty()
            .extend(["v0", "b", self.bucket.as_str(), "o"]);

        Ok(url)
    }

    /// `{base}/v0/b/{bucket}/o/{encoded path}`
    fn object_url(&self, path: &str) -> AppResult<Url> {
        let mut url = self.objects_url()?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Storage URL lost its path".to_string()))?
            .push(path);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Read object metadata
    async fn fetch_metadata(&self, path: &str) -> AppResult<ObjectMetadata> {
        let url = self.object_url(path)?;

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Metadata request for {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Metadata request for {} returned {}: {}",
                path, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse object metadata: {}", e)))
    }
}

#[async_trait::async_trait]
impl ObjectStore for FirebaseStorage {
    async fn put(
        &self,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
        progress: Option<ProgressCallback>,
    ) -> AppResult<ObjectHandle> {
        let mut url = self.objects_url()?;
        url.query_pairs_mut().append_pair("name", path);

        let total_bytes = body.len() as u64;
        let chunks: Vec<Vec<u8>> = body
            .chunks(UPLOAD_CHUNK_SIZE)
            .map(|chunk| chunk.to_vec())
            .collect();

        let chunk_progress = progress.clone();
        let mut sent = 0u64;
        let stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(callback) = &chunk_progress {
                callback(UploadProgress {
                    bytes_transferred: sent,
                    total_bytes,
                });
            }
            Ok::<_, std::io::Error>(chunk)
        }));

        tracing::debug!(path = %path, bytes = total_bytes, content_type = %content_type, "Uploading object");

        let response = self
            .authorize(self.client.post(url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CONTENT_LENGTH, total_bytes)
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Upload of {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Upload of {} returned {}: {}",
                path, status, body
            )));
        }

        let metadata: ObjectMetadata = response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse upload response: {}", e)))?;

        if let Some(callback) = &progress {
            callback(UploadProgress {
                bytes_transferred: total_bytes,
                total_bytes,
            });
        }

        tracing::info!(path = %metadata.name, bytes = total_bytes, "Object uploaded");

        Ok(ObjectHandle {
            token: metadata.first_token(),
            path: metadata.name,
        })
    }

    async fn public_url(&self, handle: &ObjectHandle) -> AppResult<String> {
        let token = match &handle.token {
            Some(token) => token.clone(),
            None => self
                .fetch_metadata(&handle.path)
                .await?
                .first_token()
                .ok_or_else(|| {
                    AppError::Storage(format!("No download token for {}", handle.path))
                })?,
        };

        let mut url = self.object_url(&handle.path)?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", &token);

        Ok(url.to_string())
    }
}
