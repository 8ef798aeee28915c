//! HTTP client tests against a mock backend.

mod common;

use common::mock_backend::{MockBackend, MockResponse};
use lofy_client::api::{ApiError, FormData, RequestOptions};
use lofy_client::config::{store_token, SecureString};
use serde_json::json;

#[tokio::test]
async fn test_post_json_sets_content_type_and_body() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::json(r#"{"id": 3}"#)).await;
    let (client, _) = common::api_client(&mock.base_url(), 2_000);

    let body = json!({"title": "Lost wallet", "tags": ["brown", "leather"], "reward": null});
    let data = client
        .post("/post/create", body.clone(), RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(data, json!({"id": 3}));

    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/post/create");
    assert_eq!(requests[0].header("content-type"), Some("application/json"));
    assert_eq!(requests[0].header("accept"), Some("application/json"));
    assert_eq!(requests[0].json_body(), body);
    assert!(requests[0].header("authorization").is_none());
}

#[tokio::test]
async fn test_form_data_leaves_content_type_to_encoder() {
    let mock = MockBackend::start().await;
    let (client, _) = common::api_client(&mock.base_url(), 2_000);

    let form = FormData::new()
        .text("start_date", "2025-11-01T00:00:00Z")
        .file("image", "wallet.png", "image/png", vec![0x89, b'P', b'N', b'G']);
    client
        .post("/others/reports", form, RequestOptions::default())
        .await
        .unwrap();

    let requests = mock.captured_requests().await;
    let content_type = requests[0].header("content-type").unwrap();
    assert!(
        content_type.starts_with("multipart/form-data; boundary="),
        "unexpected content type {}",
        content_type
    );
    let body = requests[0].body_text();
    assert!(body.contains("name=\"start_date\""));
    assert!(body.contains("2025-11-01T00:00:00Z"));
    assert!(body.contains("filename=\"wallet.png\""));
}

#[tokio::test]
async fn test_forced_form_flag_encodes_object_fields() {
    let mock = MockBackend::start().await;
    let (client, _) = common::api_client(&mock.base_url(), 2_000);

    client
        .post(
            "/others/reports",
            json!({"start_date": "a", "end_date": "b"}),
            RequestOptions::default().form_data(true),
        )
        .await
        .unwrap();

    let requests = mock.captured_requests().await;
    assert!(requests[0]
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data"));
    assert!(requests[0].body_text().contains("name=\"end_date\""));
}

#[tokio::test]
async fn test_every_method_times_out_with_timeout_message() {
    let mock = MockBackend::start().await;
    let (client, _) = common::api_client(&mock.base_url(), 100);
    for _ in 0..4 {
        mock.enqueue_response(MockResponse::json("{}").with_delay(1_000))
            .await;
    }

    let results = vec![
        client.get("/slow").await,
        client
            .post("/slow", json!({}), RequestOptions::default())
            .await,
        client
            .patch("/slow", json!({}), RequestOptions::default())
            .await,
        client.delete("/slow", ()).await,
    ];

    for result in results {
        let err = result.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {:?}", err);
        assert!(err.message().contains("Timeout"));
    }
}

#[tokio::test]
async fn test_per_request_timeout_overrides_default() {
    let mock = MockBackend::start().await;
    let (client, _) = common::api_client(&mock.base_url(), 5_000);
    mock.enqueue_response(MockResponse::json("{}").with_delay(1_000))
        .await;

    let err = client
        .post(
            "/slow",
            json!({}),
            RequestOptions::default().with_timeout_ms(100),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Timeout { duration_ms: 100 }));
}

#[tokio::test]
async fn test_non_json_error_body_becomes_message() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::text(500, "Server error"))
        .await;
    let (client, _) = common::api_client(&mock.base_url(), 2_000);

    let err = client.get("/oops").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "Server error");
    assert_eq!(err.error_type(), "server_error");
}

#[tokio::test]
async fn test_unparsable_success_body_is_server_error() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::text(200, "<html>gateway</html>"))
        .await;
    let (client, _) = common::api_client(&mock.base_url(), 2_000);

    let err = client.get("/html").await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 200, .. }));
}

#[tokio::test]
async fn test_json_error_uses_detail() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::detail(400, "Bad request"))
        .await;
    mock.enqueue_response(MockResponse::json_status(404, r#"{"error": "x"}"#))
        .await;
    let (client, _) = common::api_client(&mock.base_url(), 2_000);

    let err = client.get("/bad").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "Bad request");

    let err = client.get("/missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), "The server reported an error");
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    let port = common::free_port();
    let (client, _) = common::api_client(&format!("http://127.0.0.1:{}", port), 2_000);

    let err = client.get("/anything").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
    assert_eq!(err.error_type(), "network_error");
}

#[tokio::test]
async fn test_stored_token_sent_as_bearer() {
    let mock = MockBackend::start().await;
    let (client, storage) = common::api_client(&mock.base_url(), 2_000);
    store_token(storage.as_ref(), &SecureString::new("abc123".to_string())).unwrap();

    client.get("/user/me").await.unwrap();

    let requests = mock.captured_requests().await;
    assert_eq!(requests[0].header("authorization"), Some("Bearer abc123"));
}
