//! HTTP fetcher, file transfer, and full runs against a wiremock server

use crate::support::{thread_page, RecordingReporter};
use std::sync::Arc;
use std::time::Duration;
use threadget::config::{Config, EngineConfig, PoolSize};
use threadget::engine::{
    build_http_client, BoardPageParser, Coordinator, CoordinatorSettings, EngineParts,
    FileTransfer, HttpFetcher, HttpTransfer, PageFetcher, ResourceRef, SkipReason,
    TransferOutcome,
};
use threadget::output::ProgressEvent;
use threadget::{run_thread, ThreadState, TransportError};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resource(server: &MockServer, route: &str, name: &str) -> ResourceRef {
    ResourceRef::new(
        Url::parse(&format!("{}{}", server.uri(), route)).unwrap(),
        name,
    )
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wg/thread/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&EngineConfig::default()).unwrap();
    let url = Url::parse(&format!("{}/wg/thread/1", mock_server.uri())).unwrap();

    assert_eq!(fetcher.fetch(&url).await.unwrap(), "<html>ok</html>");
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&EngineConfig::default()).unwrap();
    let url = Url::parse(&format!("{}/wg/thread/1", mock_server.uri())).unwrap();

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let client = build_http_client("TestAgent/1.0", Duration::from_millis(100)).unwrap();
    let fetcher = HttpFetcher::with_client(client);
    let url = Url::parse(&format!("{}/wg/thread/1", mock_server.uri())).unwrap();

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout { .. }));
}

#[tokio::test]
async fn test_transfer_writes_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/media/1001.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let transfer = HttpTransfer::new(&EngineConfig::default()).unwrap();

    let outcome = transfer
        .transfer(&resource(&mock_server, "/media/1001.jpg", "sunset.jpg"), dir.path())
        .await;

    assert!(matches!(outcome, TransferOutcome::Downloaded { .. }));
    assert_eq!(
        std::fs::read(dir.path().join("sunset.jpg")).unwrap(),
        vec![7u8; 4096]
    );
}

#[tokio::test]
async fn test_transfer_skips_existing_without_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("new"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("kept.jpg"), b"old").unwrap();
    let transfer = HttpTransfer::new(&EngineConfig::default()).unwrap();

    for _ in 0..3 {
        let outcome = transfer
            .transfer(&resource(&mock_server, "/media/kept.jpg", "kept.jpg"), dir.path())
            .await;
        assert_eq!(outcome, TransferOutcome::Skipped(SkipReason::AlreadyExists));
    }
    assert_eq!(std::fs::read(dir.path().join("kept.jpg")).unwrap(), b"old");
}

#[tokio::test]
async fn test_transfer_failure_leaves_no_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let transfer = HttpTransfer::new(&EngineConfig::default()).unwrap();

    let outcome = transfer
        .transfer(&resource(&mock_server, "/media/gone.jpg", "gone.jpg"), dir.path())
        .await;

    assert!(matches!(
        outcome,
        TransferOutcome::Skipped(SkipReason::Transport(_))
    ));
    assert!(!dir.path().join("gone.jpg").exists());
}

#[tokio::test]
async fn test_transfer_timeout_removes_partial_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![1u8; 64])
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = build_http_client("TestAgent/1.0", Duration::from_millis(100)).unwrap();
    let transfer = HttpTransfer::with_client(client);

    let outcome = transfer
        .transfer(&resource(&mock_server, "/media/slow.jpg", "slow.jpg"), dir.path())
        .await;

    assert!(matches!(
        outcome,
        TransferOutcome::Skipped(SkipReason::Transport(_))
    ));
    assert!(!dir.path().join("slow.jpg").exists());
}

/// Mounts an archived thread at /wg/thread/123456 with two images
async fn mount_archived_thread(mock_server: &MockServer) {
    let first = format!("{}/media/1001.jpg", mock_server.uri());
    let second = format!("{}/media/1002.png", mock_server.uri());
    let page = thread_page(&[(&first, "beach.jpg"), (&second, "image.png")], true);

    Mock::given(method("GET"))
        .and(path("/wg/thread/123456"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(1)
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/1001.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .expect(1)
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/1002.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes".to_vec()))
        .expect(1)
        .mount(mock_server)
        .await;
}

fn local_config(base_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.thread.hosts = vec!["127.0.0.1".to_string()];
    config.output.base_dir = base_dir.display().to_string();
    config
}

#[tokio::test]
async fn test_run_thread_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_archived_thread(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = local_config(dir.path());
    let url = format!("{}/wg/thread/123456", mock_server.uri());

    let summary = run_thread(
        &url,
        PoolSize {
            workers: 2,
            concurrency: 2,
        },
        &config,
    )
    .await
    .unwrap();

    assert_eq!(summary.final_state, ThreadState::Archived);
    assert_eq!(summary.total_downloaded, 2);
    assert_eq!(summary.total_skipped, 0);

    let thread_dir = dir.path().join("wg_123456");
    assert_eq!(
        std::fs::read(thread_dir.join("beach.jpg")).unwrap(),
        b"jpeg-bytes"
    );
    // Generic uploader name falls back to the name in the link
    assert_eq!(
        std::fs::read(thread_dir.join("1002.png")).unwrap(),
        b"png-bytes"
    );
}

#[tokio::test]
async fn test_second_run_skips_everything() {
    let mock_server = MockServer::start().await;
    let first = format!("{}/media/1001.jpg", mock_server.uri());
    let page = thread_page(&[(&first, "beach.jpg")], true);
    Mock::given(method("GET"))
        .and(path("/wg/thread/123456"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/1001.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = local_config(dir.path());
    let url = format!("{}/wg/thread/123456", mock_server.uri());
    let pool = PoolSize {
        workers: 1,
        concurrency: 1,
    };

    let first_run = run_thread(&url, pool, &config).await.unwrap();
    let second_run = run_thread(&url, pool, &config).await.unwrap();

    assert_eq!(first_run.total_downloaded, 1);
    assert_eq!(second_run.total_downloaded, 0);
    assert_eq!(second_run.total_skipped, 1);
}

#[tokio::test]
async fn test_page_404_ends_run_as_dead() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wg/thread/404"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = local_config(dir.path());
    let reporter = Arc::new(RecordingReporter::default());
    let parts = EngineParts {
        fetcher: Arc::new(HttpFetcher::new(&config.engine).unwrap()),
        parser: Arc::new(BoardPageParser::new(&config.parser).unwrap()),
        transfer: Arc::new(HttpTransfer::new(&config.engine).unwrap()),
        reporter: reporter.clone(),
    };
    let settings = CoordinatorSettings::from_config(
        &config,
        PoolSize {
            workers: 2,
            concurrency: 4,
        },
    );

    let url = format!("{}/wg/thread/404", mock_server.uri());
    let summary = Coordinator::start(&url, settings, parts)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.final_state, ThreadState::Dead);
    assert!(reporter.dispatches().is_empty());
    assert_eq!(
        reporter.count(|e| matches!(e, ProgressEvent::Finished { .. })),
        1
    );
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_duplicate_names_first_writer_wins() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/media/1001.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"first-body".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/1002.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"second-body".to_vec()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let transfer = HttpTransfer::new(&EngineConfig::default()).unwrap();

    let first = transfer
        .transfer(&resource(&mock_server, "/media/1001.jpg", "same.jpg"), dir.path())
        .await;
    let second = transfer
        .transfer(&resource(&mock_server, "/media/1002.jpg", "same.jpg"), dir.path())
        .await;

    assert!(matches!(first, TransferOutcome::Downloaded { .. }));
    assert_eq!(second, TransferOutcome::Skipped(SkipReason::AlreadyExists));
    assert_eq!(
        std::fs::read(dir.path().join("same.jpg")).unwrap(),
        b"first-body"
    );
}

#[tokio::test]
async fn test_concurrent_duplicate_names_write_one_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"same-bytes".to_vec())
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let transfer = HttpTransfer::new(&EngineConfig::default()).unwrap();
    let one = resource(&mock_server, "/media/1001.jpg", "dup.jpg");
    let two = resource(&mock_server, "/media/1002.jpg", "dup.jpg");

    let (a, b) = tokio::join!(
        transfer.transfer(&one, dir.path()),
        transfer.transfer(&two, dir.path())
    );

    let outcomes = [a, b];
    let downloaded = outcomes
        .iter()
        .filter(|o| matches!(o, TransferOutcome::Downloaded { .. }))
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| **o == TransferOutcome::Skipped(SkipReason::AlreadyExists))
        .count();
    assert_eq!((downloaded, skipped), (1, 1));
    assert_eq!(
        std::fs::read(dir.path().join("dup.jpg")).unwrap(),
        b"same-bytes"
    );
}
