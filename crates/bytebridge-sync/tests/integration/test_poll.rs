//! Poll cycles against the HTTP store

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use bytebridge_sync::{PollReconciler, SyncError};

use crate::common::{mount_download, mount_listing, record_json, Fixture, FILES_PATH};

#[tokio::test]
async fn test_poll_downloads_listing_into_empty_folder() {
    let fx = Fixture::new().await;
    mount_listing(
        &fx.server,
        serde_json::json!([record_json(1, "a.txt"), record_json(2, "b.txt")]),
    )
    .await;
    mount_download(&fx.server, 1, b"alpha", 1).await;
    mount_download(&fx.server, 2, b"bravo", 1).await;

    let poller = PollReconciler::new(fx.store.clone(), fx.folder.clone());
    let report = poller.run_cycle().await.unwrap();

    assert_eq!(report.downloaded, 2);
    assert_eq!(fx.local_names(), vec!["a.txt", "b.txt"]);
    assert_eq!(std::fs::read(fx.local("a.txt")).unwrap(), b"alpha");
    assert_eq!(std::fs::read(fx.local("b.txt")).unwrap(), b"bravo");
}

#[tokio::test]
async fn test_second_poll_issues_no_downloads() {
    let fx = Fixture::new().await;
    mount_listing(&fx.server, serde_json::json!([record_json(1, "a.txt")])).await;
    // Verified on drop: one download across both cycles.
    mount_download(&fx.server, 1, b"alpha", 1).await;

    let poller = PollReconciler::new(fx.store.clone(), fx.folder.clone());
    poller.run_cycle().await.unwrap();
    let second = poller.run_cycle().await.unwrap();

    assert_eq!(second.downloaded, 0);
    assert_eq!(second.present, 1);
}

#[tokio::test]
async fn test_existing_local_file_is_kept() {
    let fx = Fixture::new().await;
    std::fs::write(fx.local("a.txt"), b"mine").unwrap();
    mount_listing(&fx.server, serde_json::json!([record_json(1, "a.txt")])).await;
    mount_download(&fx.server, 1, b"theirs", 0).await;

    let poller = PollReconciler::new(fx.store.clone(), fx.folder.clone());
    poller.run_cycle().await.unwrap();

    assert_eq!(std::fs::read(fx.local("a.txt")).unwrap(), b"mine");
}

#[tokio::test]
async fn test_failed_download_does_not_block_later_files() {
    let fx = Fixture::new().await;
    mount_listing(
        &fx.server,
        serde_json::json!([
            record_json(1, "one.txt"),
            record_json(2, "two.txt"),
            record_json(3, "three.txt")
        ]),
    )
    .await;
    mount_download(&fx.server, 1, b"1", 1).await;
    Mock::given(method("GET"))
        .and(path(format!("{FILES_PATH}/2")))
        .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
        .mount(&fx.server)
        .await;
    mount_download(&fx.server, 3, b"3", 1).await;

    let poller = PollReconciler::new(fx.store.clone(), fx.folder.clone());
    let report = poller.run_cycle().await.unwrap();

    assert_eq!(report.downloaded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "two.txt");
    assert_eq!(fx.local_names(), vec!["one.txt", "three.txt"]);
}

#[tokio::test]
async fn test_unreachable_listing_fails_cycle() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&fx.server)
        .await;

    let poller = PollReconciler::new(fx.store.clone(), fx.folder.clone());
    let result = poller.run_cycle().await;

    assert!(matches!(result, Err(SyncError::Store(_))));
    assert!(fx.local_names().is_empty());
}
