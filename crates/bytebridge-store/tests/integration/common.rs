//! Shared test helpers for store integration tests
//!
//! Each helper mounts mock endpoints for the file collection resource and
//! the setup function returns a client pointing at the mock server.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bytebridge_store::client::StoreClient;

pub const FILES_PATH: &str = "/api/v1/File";

/// Starts a mock server and returns a (MockServer, StoreClient) tuple.
pub async fn setup_store_mock() -> (MockServer, StoreClient) {
    let server = MockServer::start().await;
    let client = StoreClient::with_base_url(server.uri()).expect("build client");
    (server, client)
}

/// Builds a listing entry the way the store serializes it.
pub fn record_json(id: i64, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "path": format!("/data/files/{name}"),
        "hash": "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae",
        "extension": name.rsplit_once('.').map(|(_, ext)| format!(".{ext}")),
        "createdOn": "2024-06-01T08:00:00.000",
        "updatedOn": "2024-06-01T08:00:00.000"
    })
}

/// Mounts `GET /api/v1/File` returning the given records.
pub async fn mount_listing(server: &MockServer, records: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .mount(server)
        .await;
}

/// Mounts `GET /api/v1/File/{id}` returning raw bytes.
pub async fn mount_download(server: &MockServer, id: i64, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("{FILES_PATH}/{id}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .append_header("Content-Type", "application/octet-stream"),
        )
        .mount(server)
        .await;
}
