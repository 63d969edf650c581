use mockito::Matcher;
use pawplanet_api_client::{MediaUploadOrchestrator, UploadHandlers};
use pawplanet_core::{
    MediaClientConfig, MediaError, MediaFile, UploadContext, UploadPhase, UploadResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn config_for(server: &mockito::ServerGuard) -> MediaClientConfig {
    MediaClientConfig {
        api_url: server.url(),
        api_token: Some("session-token".to_string()),
        upload_base_url: format!("{}/v1_1", server.url()),
        http_timeout_secs: 5,
        progress_interval_ms: 20,
        ..MediaClientConfig::default()
    }
}

fn sign_body(folder: &str) -> String {
    serde_json::json!({
        "signature": "signed-abc",
        "timestamp": chrono::Utc::now().timestamp(),
        "api_key": "cloud-key",
        "cloud_name": "demo",
        "asset_folder": folder,
        "resource_type": "image"
    })
    .to_string()
}

fn provider_body() -> serde_json::Value {
    serde_json::json!({
        "public_id": "users/42/a",
        "version": 1712345678,
        "signature": "provider-sig",
        "width": 640,
        "height": 480,
        "format": "jpg",
        "resource_type": "image",
        "created_at": "2024-04-05T12:00:00Z",
        "bytes": 15,
        "type": "upload",
        "url": "http://x/a.jpg",
        "secure_url": "https://x/a.jpg"
    })
}

fn jpeg() -> MediaFile {
    MediaFile::new("a.jpg", "image/jpeg", b"fake-jpeg-bytes".to_vec())
}

#[tokio::test]
async fn user_avatar_upload_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let sign = server
        .mock("POST", "/api/v1/media/sign")
        .match_header("authorization", "Bearer session-token")
        .match_body(Matcher::Json(serde_json::json!({
            "context": "USER_AVATAR",
            "ownerId": 42
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(sign_body("users/42"))
        .expect(1)
        .create_async()
        .await;
    let provider = server
        .mock("POST", "/v1_1/demo/image/upload")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("signed-abc".to_string()),
            Matcher::Regex("cloud-key".to_string()),
            Matcher::Regex("users/42".to_string()),
            Matcher::Regex("fake-jpeg-bytes".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(provider_body().to_string())
        .expect(1)
        .create_async()
        .await;

    let delivered = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = delivered.clone();
    let orchestrator = MediaUploadOrchestrator::from_config(
        config_for(&server),
        UploadHandlers::new().on_success(move |result| {
            sink.lock().unwrap().push(result.secure_url.clone())
        }),
    )
    .unwrap();

    let result = orchestrator.upload_user_avatar(jpeg(), 42).await.unwrap();

    assert_eq!(result.secure_url, "https://x/a.jpg");
    assert_eq!(*delivered.lock().unwrap(), vec!["https://x/a.jpg".to_string()]);

    let expected: UploadResult = serde_json::from_value(serde_json::json!({
        "publicId": "users/42/a",
        "version": 1712345678,
        "signature": "provider-sig",
        "width": 640,
        "height": 480,
        "format": "jpg",
        "resourceType": "image",
        "createdAt": "2024-04-05T12:00:00Z",
        "bytes": 15,
        "type": "upload",
        "url": "http://x/a.jpg",
        "secureUrl": "https://x/a.jpg"
    }))
    .unwrap();
    assert_eq!(result, expected);

    let state = orchestrator.state();
    assert_eq!(state.phase, UploadPhase::Succeeded);
    assert_eq!(state.progress.map(|p| p.percentage), Some(100.0));

    sign.assert_async().await;
    provider.assert_async().await;
}

#[tokio::test]
async fn encyclopedia_breed_signs_with_slug_only() {
    let mut server = mockito::Server::new_async().await;
    let sign = server
        .mock("POST", "/api/v1/media/sign")
        .match_body(Matcher::Json(serde_json::json!({
            "context": "ENCYCLOPEDIA_BREED",
            "slug": "golden-retriever"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(sign_body("encyclopedia/breeds/golden-retriever"))
        .expect(1)
        .create_async()
        .await;
    let _provider = server
        .mock("POST", "/v1_1/demo/image/upload")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(provider_body().to_string())
        .create_async()
        .await;

    let orchestrator =
        MediaUploadOrchestrator::from_config(config_for(&server), UploadHandlers::new()).unwrap();
    orchestrator
        .upload_encyclopedia_breed(jpeg(), "golden-retriever")
        .await
        .unwrap();

    sign.assert_async().await;
}

#[tokio::test]
async fn signing_failure_never_contacts_provider() {
    let mut server = mockito::Server::new_async().await;
    let _sign = server
        .mock("POST", "/api/v1/media/sign")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;
    let provider = server
        .mock("POST", Matcher::Regex("^/v1_1/".to_string()))
        .expect(0)
        .create_async()
        .await;

    let errors = Arc::new(AtomicUsize::new(0));
    let error_count = errors.clone();
    let orchestrator = MediaUploadOrchestrator::from_config(
        config_for(&server),
        UploadHandlers::new().on_error(move |_| {
            error_count.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .unwrap();

    let err = orchestrator.upload_pet_avatar(jpeg(), 7).await.unwrap_err();

    assert!(matches!(err, MediaError::Signing(_)));
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(orchestrator.phase(), UploadPhase::Failed);
    provider.assert_async().await;
}

#[tokio::test]
async fn provider_rejection_is_transfer_error() {
    let mut server = mockito::Server::new_async().await;
    let _sign = server
        .mock("POST", "/api/v1/media/sign")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(sign_body("posts/9"))
        .create_async()
        .await;
    let _provider = server
        .mock("POST", "/v1_1/demo/image/upload")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"Invalid Signature"}}"#)
        .create_async()
        .await;

    let orchestrator =
        MediaUploadOrchestrator::from_config(config_for(&server), UploadHandlers::new()).unwrap();
    let err = orchestrator.upload_post_media(jpeg(), 9).await.unwrap_err();

    assert_eq!(err.to_string(), "Upload failed: 400 Bad Request: Invalid Signature");
    let state = orchestrator.state();
    assert_eq!(state.phase, UploadPhase::Failed);
    assert!(state.result.is_none());

    orchestrator.reset();
    assert_eq!(orchestrator.phase(), UploadPhase::Idle);
    assert!(orchestrator.error().is_none());
}
