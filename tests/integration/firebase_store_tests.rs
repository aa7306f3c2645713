//! Firebase Storage client tests against a local HTTP endpoint

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use token_launchpad::config::StorageConfig;
use token_launchpad::error::AppError;
use token_launchpad::storage::{FirebaseStorage, ObjectHandle, ObjectStore, UploadProgress};

#[derive(Debug, Clone)]
struct Received {
    bucket: String,
    name: String,
    content_type: Option<String>,
    authorization: Option<String>,
    body: Vec<u8>,
}

#[derive(Default)]
struct FakeBucket {
    uploads: Mutex<Vec<Received>>,
    tokens: Mutex<HashMap<String, String>>,
    fail_uploads: bool,
}

#[derive(Deserialize)]
struct UploadQuery {
    name: String,
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn upload(
    State(bucket): State<Arc<FakeBucket>>,
    Path(bucket_name): Path<String>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    if bucket.fail_uploads {
        return Err((StatusCode::FORBIDDEN, "permission denied".to_string()));
    }

    let token = format!("tok-{}", bucket.uploads.lock().len() + 1);
    bucket.tokens.lock().insert(query.name.clone(), token.clone());
    bucket.uploads.lock().push(Received {
        bucket: bucket_name,
        name: query.name.clone(),
        content_type: header(&headers, "content-type"),
        authorization: header(&headers, "authorization"),
        body: body.to_vec(),
    });

    Ok(Json(serde_json::json!({
        "name": query.name,
        "bucket": "test-bucket",
        "downloadTokens": format!("{},spare", token),
    })))
}

async fn metadata(
    State(bucket): State<Arc<FakeBucket>>,
    Path((_bucket_name, object)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let token = bucket
        .tokens
        .lock()
        .get(&object)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(serde_json::json!({
        "name": object,
        "downloadTokens": token,
    })))
}

async fn serve(bucket: Arc<FakeBucket>) -> String {
    let app = Router::new()
        .route("/v0/b/:bucket/o", post(upload))
        .route("/v0/b/:bucket/o/:object", get(metadata))
        .with_state(bucket);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client(base: &str, auth_token: Option<&str>) -> FirebaseStorage {
    let config = StorageConfig {
        api_base_url: base.to_string(),
        bucket: "test-bucket".to_string(),
        auth_token: auth_token.map(str::to_string),
        ..Default::default()
    };
    FirebaseStorage::new(&config).unwrap()
}

#[tokio::test]
async fn test_upload_and_public_url() {
    let bucket = Arc::new(FakeBucket::default());
    let base = serve(bucket.clone()).await;
    let storage = client(&base, Some("secret"));

    let body = vec![7u8; 200 * 1024];
    let seen = Arc::new(Mutex::new(Vec::<UploadProgress>::new()));
    let sink = seen.clone();

    let handle = storage
        .put(
            "token_images/logo.png",
            body.clone(),
            "image/png",
            Some(Arc::new(move |p| sink.lock().push(p))),
        )
        .await
        .unwrap();

    assert_eq!(handle.path, "token_images/logo.png");
    assert_eq!(handle.token.as_deref(), Some("tok-1"));

    let uploads = bucket.uploads.lock().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].bucket, "test-bucket");
    assert_eq!(uploads[0].name, "token_images/logo.png");
    assert_eq!(uploads[0].content_type.as_deref(), Some("image/png"));
    assert_eq!(uploads[0].authorization.as_deref(), Some("Bearer secret"));
    assert_eq!(uploads[0].body, body);

    let progress = seen.lock().clone();
    assert!(progress.len() >= 2, "expected per-chunk progress, got {:?}", progress);
    assert!(progress.windows(2).all(|w| w[0].bytes_transferred <= w[1].bytes_transferred));
    assert_eq!(progress.last().map(|p| p.percent()), Some(100));

    let url = storage.public_url(&handle).await.unwrap();
    assert_eq!(
        url,
        format!("{}/v0/b/test-bucket/o/token_images%2Flogo.png?alt=media&token=tok-1", base)
    );
}

#[tokio::test]
async fn test_public_url_fetches_token_when_missing() {
    let bucket = Arc::new(FakeBucket::default());
    let base = serve(bucket.clone()).await;
    let storage = client(&base, None);

    storage
        .put("token-metadata/FOO-1.json", b"{}".to_vec(), "application/json", None)
        .await
        .unwrap();

    let handle = ObjectHandle {
        path: "token-metadata/FOO-1.json".to_string(),
        token: None,
    };
    let url = storage.public_url(&handle).await.unwrap();
    assert_eq!(
        url,
        format!("{}/v0/b/test-bucket/o/token-metadata%2FFOO-1.json?alt=media&token=tok-1", base)
    );

    assert_eq!(bucket.uploads.lock()[0].authorization, None);
}

#[tokio::test]
async fn test_public_url_for_unknown_object() {
    let bucket = Arc::new(FakeBucket::default());
    let base = serve(bucket).await;
    let storage = client(&base, None);

    let handle = ObjectHandle {
        path: "token-metadata/missing.json".to_string(),
        token: None,
    };
    let err = storage.public_url(&handle).await.unwrap_err();
    assert!(matches!(err, AppError::Storage(ref msg) if msg.contains("404")));
}

#[tokio::test]
async fn test_rejected_upload_is_storage_error() {
    let bucket = Arc::new(FakeBucket {
        fail_uploads: true,
        ..Default::default()
    });
    let base = serve(bucket).await;
    let storage = client(&base, None);

    let err = storage
        .put("token_images/logo.png", vec![1, 2, 3], "image/png", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Storage(ref msg) if msg.contains("403") && msg.contains("permission denied")));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_http_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let storage = client(&format!("http://{}", addr), None);
    let err = storage
        .put("token_images/logo.png", vec![1, 2, 3], "image/png", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Http(_)));
}
