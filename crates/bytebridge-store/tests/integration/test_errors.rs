//! Integration tests for error classification

use std::time::Duration;

use bytebridge_core::domain::RemoteId;
use bytebridge_core::ports::StoreError;
use bytebridge_store::client::StoreClient;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::common::{self, FILES_PATH};

#[tokio::test]
async fn test_list_server_error_is_status() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
        .mount(&server)
        .await;

    let err = client.list_files().await.unwrap_err();
    match err {
        StoreError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database offline");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_malformed_json_is_invalid_response() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.list_files().await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_download_404_is_not_found() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("{FILES_PATH}/99")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.download_file(RemoteId::from_raw(99)).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_upload_rejected_is_status() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("POST"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("Name is required"))
        .mount(&server)
        .await;

    let err = client.upload_file("c.txt", b"x".to_vec()).await.unwrap_err();
    match err {
        StoreError::Status { status, context, .. } => {
            assert_eq!(status, 400);
            assert!(context.contains("c.txt"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_server_error_is_status() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{FILES_PATH}/5")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.delete_file(RemoteId::from_raw(5)).await.unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_long_error_body_is_truncated() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("x".repeat(10_000)))
        .mount(&server)
        .await;

    match client.list_files().await.unwrap_err() {
        StoreError::Status { body, .. } => assert!(body.len() <= 512),
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_store_times_out_as_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = StoreClient::new(
        format!("{}{FILES_PATH}", server.uri()),
        Duration::from_millis(200),
    )
    .unwrap();

    let err = client.list_files().await.unwrap_err();
    assert!(matches!(err, StoreError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_store_is_network_error() {
    // Port 9 (discard) is not expected to have an HTTP listener.
    let client = StoreClient::new("http://127.0.0.1:9/api/v1/File", Duration::from_secs(2)).unwrap();
    let err = client.list_files().await.unwrap_err();
    assert!(matches!(err, StoreError::Network(_)), "got {err:?}");
}
