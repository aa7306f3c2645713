//! Metadata publisher and image uploader tests

use super::support::{png_bytes, CountingStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use token_launchpad::error::AppError;
use token_launchpad::models::{MetadataDocument, TokenForm};
use token_launchpad::storage::{MemoryObjectStore, UploadProgress};
use token_launchpad::token::{ImageFile, ImageUploader, MetadataPublisher};

#[tokio::test]
async fn test_sequential_publishes_get_distinct_keys_and_urls() {
    let store = Arc::new(MemoryObjectStore::with_url_prefix("https://store.test/"));
    let publisher = MetadataPublisher::new(store.clone(), "token-metadata");
    let form = TokenForm::new("Foo", "FOO", 1000);

    let first = publisher.publish(&form, None).await.unwrap();
    let second = publisher.publish(&form, None).await.unwrap();

    assert_ne!(first.key, second.key);
    assert_ne!(first.uri, second.uri);
    assert_eq!(store.len(), 2);

    for published in [&first, &second] {
        assert!(published.key.starts_with("FOO-"));
        let stamp: i64 = published.key["FOO-".len()..].parse().unwrap();
        assert!(stamp > 0);
        assert_eq!(published.path, format!("token-metadata/{}.json", published.key));
        assert_eq!(published.uri, format!("https://store.test/{}", published.path));
    }
}

#[tokio::test]
async fn test_published_body_matches_document() {
    let store = Arc::new(MemoryObjectStore::new());
    let publisher = MetadataPublisher::new(store.clone(), "token-metadata");
    let form = TokenForm::new("Foo", "FOO", 1000);

    let published = publisher
        .publish(&form, Some("memory://token_images/logo.png"))
        .await
        .unwrap();

    let stored = store.get(&published.path).unwrap();
    assert_eq!(stored.content_type, "application/json");
    assert_eq!(stored.body, published.document.to_json().unwrap().into_bytes());

    let parsed: MetadataDocument = serde_json::from_slice(&stored.body).unwrap();
    assert_eq!(parsed.image, "memory://token_images/logo.png");
    assert_eq!(parsed.properties.files[0].uri, "memory://token_images/logo.png");
}

#[tokio::test]
async fn test_store_failure_is_metadata_upload_error() {
    let store = Arc::new(CountingStore::failing("token-metadata/"));
    let publisher = MetadataPublisher::new(store.clone(), "token-metadata");

    let err = publisher
        .publish(&TokenForm::new("Foo", "FOO", 1), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::MetadataUpload(_)));
    assert_eq!(err.user_message(), format!("Error uploading metadata: {}", AppError::Storage("bucket unavailable".to_string())));
    // No URL is requested after a failed write
    assert_eq!(store.url_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_image_uploaded_under_file_name() {
    let store = Arc::new(MemoryObjectStore::new());
    let uploader = ImageUploader::new(store.clone(), "token_images");
    let image = ImageFile::new("Logo.JPG", png_bytes()).unwrap();

    let seen = Arc::new(parking_lot::Mutex::new(Vec::<UploadProgress>::new()));
    let sink = seen.clone();
    let url = uploader
        .upload(&image, Some(Arc::new(move |p| sink.lock().push(p))))
        .await
        .unwrap();

    assert_eq!(url, "memory://token_images/Logo.JPG");
    assert_eq!(store.get("token_images/Logo.JPG").unwrap().content_type, "image/jpeg");
    assert_eq!(seen.lock().last().map(|p| p.percent()), Some(100));
}

#[tokio::test]
async fn test_same_file_name_overwrites() {
    let store = Arc::new(MemoryObjectStore::new());
    let uploader = ImageUploader::new(store.clone(), "token_images");

    uploader
        .upload(&ImageFile::new("logo.png", vec![1u8; 8]).unwrap(), None)
        .await
        .unwrap();
    uploader
        .upload(&ImageFile::new("logo.png", vec![2u8; 8]).unwrap(), None)
        .await
        .unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("token_images/logo.png").unwrap().body, vec![2u8; 8]);
}

#[tokio::test]
async fn test_oversized_image_rejected_without_upload() {
    let store = Arc::new(CountingStore::new());
    let uploader = ImageUploader::new(store.clone(), "token_images").with_max_bytes(64);

    let err = uploader
        .upload(&ImageFile::new("logo.png", vec![0u8; 65]).unwrap(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(store.calls(), 0);
}

#[test]
fn test_unsupported_extension_rejected() {
    assert!(ImageFile::new("logo.webp", png_bytes()).is_err());
    assert!(ImageFile::new("logo", png_bytes()).is_err());
}

#[tokio::test]
async fn test_image_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo.gif");
    std::fs::write(&path, b"GIF89a....").unwrap();

    let image = ImageFile::from_path(&path).await.unwrap();
    assert_eq!(image.file_name, "logo.gif");
    assert_eq!(image.content_type, "image/gif");
    assert_eq!(image.bytes, b"GIF89a....".to_vec());

    let missing = ImageFile::from_path(dir.path().join("missing.png")).await;
    assert!(matches!(missing, Err(AppError::Io(_))));
}
