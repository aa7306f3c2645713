//! Metadata document publishing

use crate::constants::storage::METADATA_CONTENT_TYPE;
use crate::error::{AppError, AppResult};
use crate::models::{MetadataDocument, TokenForm};
use crate::storage::{object_path, ObjectStore};
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Published metadata document
#[derive(Debug, Clone)]
pub struct PublishedMetadata {
    /// Storage key (`symbol-timestamp`)
    pub key: String,
    /// Object path inside the store
    pub path: String,
    /// Public URL, used as the on-chain `uri`
    pub uri: String,
    /// Document that was stored
    pub document: MetadataDocument,
}

/// Builds metadata documents and writes them to the object store
pub struct MetadataPublisher {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    /// Last timestamp handed out, keeps keys unique within one publisher
    last_stamp: AtomicI64,
}

impl MetadataPublisher {
    /// Create a publisher writing under `prefix`
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            last_stamp: AtomicI64::new(0),
        }
    }

    /// Current time in milliseconds, bumped past the previous stamp if needed
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut previous = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(previous + 1);
            match self.last_stamp.compare_exchange_weak(
                previous,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(current) => previous = current,
            }
        }
    }

    /// Storage key for a symbol: `symbol-timestamp`
    pub fn next_key(&self, symbol: &str) -> String {
        format!("{}-{}", symbol, self.next_stamp())
    }

    /// Build, store and resolve the metadata document for a form
    ///
    /// Every call writes a new object; nothing is overwritten or cleaned up.
    pub async fn publish(
        &self,
        form: &TokenForm,
        image_url: Option<&str>,
    ) -> AppResult<PublishedMetadata> {
        let document = MetadataDocument::from_form(form, image_url);
        let json = document
            .to_json()
            .map_err(|e| AppError::Internal(format!("Failed to serialize metadata: {}", e)))?;

        let key = self.next_key(&form.symbol);
        let path = object_path(&self.prefix, &format!("{}.json", key));

        let handle = self
            .store
            .put(&path, json.into_bytes(), METADATA_CONTENT_TYPE, None)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, path = %path, "Error uploading metadata");
                AppError::MetadataUpload(e.to_string())
            })?;

        let uri = self.store.public_url(&handle).await.map_err(|e| {
            tracing::error!(error = %e, path = %path, "Error resolving metadata URL");
            AppError::MetadataUpload(e.to_string())
        })?;

        tracing::info!(key = %key, uri = %uri, "Metadata uploaded");

        Ok(PublishedMetadata {
            key,
            path,
            uri,
            document,
        })
    }
}
