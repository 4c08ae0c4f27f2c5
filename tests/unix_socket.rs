//! Exchanges routed through a Unix domain socket.
#![cfg(unix)]

mod helpers;

use std::sync::{Arc, Mutex};

use curlkit::ExitSignal;
use helpers::{config_for, run, test_router};
use tempfile::TempDir;
use tokio::net::UnixListener;

async fn start_socket_server(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("curlkit-test.sock");
    let listener = UnixListener::bind(&path).expect("Failed to bind Unix socket");
    let app = test_router(Arc::new(Mutex::new(Vec::new())));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Socket server failed");
    });
    path
}

#[tokio::test]
async fn test_bare_path_is_sent_over_socket() {
    let dir = TempDir::new().unwrap();
    let socket = start_socket_server(&dir).await;

    let mut config = config_for("/ok".to_string());
    config.unix_socket = Some(socket);

    let out = run(&config).await;
    assert_eq!(*out.result.as_ref().unwrap(), ExitSignal::Success);
    assert_eq!(out.primary_text(), "hello\n");
}

#[tokio::test]
async fn test_host_in_url_is_ignored_by_socket_dialer() {
    let dir = TempDir::new().unwrap();
    let socket = start_socket_server(&dir).await;

    let mut config = config_for("http://unreachable.invalid/echo".to_string());
    config.unix_socket = Some(socket);
    config.data = Some("ping".to_string());

    let out = run(&config).await;
    assert!(out.result.is_ok());
    assert_eq!(out.primary_text(), "POST ping\n");
}

#[tokio::test]
async fn test_missing_socket_is_network_error() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for("/ok".to_string());
    config.unix_socket = Some(dir.path().join("absent.sock"));

    let err = run(&config).await.result.unwrap_err();
    assert_eq!(err.category(), curlkit::ErrorCategory::Network);
}
