//! Fetcher behaviour against a local HTTP server.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{StatusCode, header::LOCATION},
    routing::get,
    serve,
};
use dlpro_core::{ArtifactFetcher, FetchError};
use dlpro_runtime::{FetchSettings, HttpFetcher};
use tempfile::tempdir;
use tokio::net::TcpListener;

const TOOL_BYTES: &[u8] = b"#!/bin/sh\necho managed tool\n";

struct TestHttpServer {
    base: String,
    error_hits: Arc<AtomicUsize>,
}

impl TestHttpServer {
    async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let error_hits = Arc::new(AtomicUsize::new(0));

        let hits = Arc::clone(&error_hits);
        let router = Router::new()
            .route("/tool", get(|| async { TOOL_BYTES }))
            .route(
                "/redirect",
                get(|| async { (StatusCode::FOUND, [(LOCATION, "/tool")]) }),
            )
            .route(
                "/nested/redirect",
                get(|| async { (StatusCode::MOVED_PERMANENTLY, [(LOCATION, "../tool")]) }),
            )
            .route(
                "/loop",
                get(|| async { (StatusCode::FOUND, [(LOCATION, "/loop")]) }),
            )
            .route(
                "/error",
                get(move || {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    TOOL_BYTES
                }),
            )
            .route("/empty", get(|| async { StatusCode::OK }))
            .route(
                "/truncated",
                get(|| async {
                    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
                        Ok(Bytes::from_static(b"#!/bin/sh\npartial")),
                        Err(std::io::Error::other("connection dropped")),
                    ];
                    Body::from_stream(futures_util::stream::iter(chunks))
                }),
            );

        let server = serve(listener, router);
        tokio::spawn(async move {
            let _ = server.await;
        });

        Self {
            base: format!("http://{addr}"),
            error_hits,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

fn fetcher(attempts: u32, timeout: Duration) -> HttpFetcher {
    HttpFetcher::new(FetchSettings {
        timeout,
        attempts,
        base_delay: Duration::from_millis(10),
        max_redirects: 10,
        user_agent: "dlpro-tests".to_string(),
    })
    .unwrap()
}

fn tmp_of(dest: &Path) -> std::path::PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".tmp");
    name.into()
}

#[tokio::test]
async fn fetch_installs_body_and_creates_parents() {
    let server = TestHttpServer::spawn().await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bin").join("nested").join("yt-dlp");

    tokio_test::assert_ok!(
        fetcher(1, Duration::from_secs(5))
            .fetch(&server.url("/tool"), &dest)
            .await
    );

    assert_eq!(std::fs::read(&dest).unwrap(), TOOL_BYTES);
    assert!(!tmp_of(&dest).exists());
}

#[tokio::test]
async fn redirect_is_followed_to_original_destination() {
    let server = TestHttpServer::spawn().await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("yt-dlp");

    fetcher(1, Duration::from_secs(5))
        .fetch(&server.url("/redirect"), &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), TOOL_BYTES);
}

#[tokio::test]
async fn relative_redirect_resolves_against_current_url() {
    let server = TestHttpServer::spawn().await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("yt-dlp");

    fetcher(1, Duration::from_secs(5))
        .fetch(&server.url("/nested/redirect"), &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), TOOL_BYTES);
}

#[tokio::test]
async fn redirect_loop_hits_cap() {
    let server = TestHttpServer::spawn().await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("yt-dlp");

    let err = fetcher(1, Duration::from_secs(5))
        .fetch(&server.url("/loop"), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::RedirectLoop { limit: 10, .. }));
    assert!(!dest.exists());
}

#[tokio::test]
async fn always_failing_fetch_makes_exactly_n_attempts() {
    let server = TestHttpServer::spawn().await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("yt-dlp");
    let fetcher = fetcher(3, Duration::from_secs(5));

    let err = fetcher
        .fetch_artifact(&server.url("/error"), &dest)
        .await
        .unwrap_err();

    assert_eq!(server.error_hits.load(Ordering::SeqCst), 3);
    assert!(matches!(err, FetchError::HttpStatus { status: 500, .. }));
    assert_eq!(fetcher.max_attempts(), 3);
}

#[tokio::test]
async fn failing_fetch_preserves_existing_destination() {
    let server = TestHttpServer::spawn().await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("yt-dlp");
    std::fs::write(&dest, b"previous complete version").unwrap();

    let result = fetcher(2, Duration::from_secs(5))
        .fetch_with_retry(&server.url("/error"), &dest)
        .await;

    assert!(result.is_err());
    assert_eq!(std::fs::read(&dest).unwrap(), b"previous complete version");
    assert!(!tmp_of(&dest).exists());
}

#[tokio::test]
async fn body_cut_off_midway_preserves_existing_destination() {
    let server = TestHttpServer::spawn().await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("yt-dlp");
    std::fs::write(&dest, b"previous complete version").unwrap();

    let err = fetcher(2, Duration::from_secs(5))
        .fetch_with_retry(&server.url("/truncated"), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network { .. }), "unexpected error: {err:?}");
    assert_eq!(std::fs::read(&dest).unwrap(), b"previous complete version");
    assert!(!tmp_of(&dest).exists());
}

#[tokio::test]
async fn successful_fetch_replaces_existing_destination() {
    let server = TestHttpServer::spawn().await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("yt-dlp");
    std::fs::write(&dest, b"old").unwrap();
    std::fs::write(tmp_of(&dest), b"stale partial").unwrap();

    fetcher(1, Duration::from_secs(5))
        .fetch(&server.url("/tool"), &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), TOOL_BYTES);
    assert!(!tmp_of(&dest).exists());
}

#[tokio::test]
async fn timeout_aborts_attempt_and_cleans_up() {
    let server = TestHttpServer::spawn().await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("yt-dlp");

    let err = fetcher(1, Duration::from_millis(200))
        .fetch_with_retry(&server.url("/slow"), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout { .. }));
    assert!(!dest.exists());
    assert!(!tmp_of(&dest).exists());
}

#[tokio::test]
async fn empty_body_is_rejected() {
    let server = TestHttpServer::spawn().await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("yt-dlp");

    let err = fetcher(2, Duration::from_secs(5))
        .fetch_with_retry(&server.url("/empty"), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::EmptyArtifact { .. }));
    assert!(!dest.exists());
}

#[tokio::test]
async fn not_found_reports_status() {
    let server = TestHttpServer::spawn().await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("yt-dlp");

    let err = fetcher(1, Duration::from_secs(5))
        .fetch(&server.url("/nope"), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn invalid_url_is_not_retried() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("yt-dlp");

    let err = fetcher(3, Duration::from_secs(5))
        .fetch_with_retry("not a url", &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::InvalidUrl { .. }));
}
