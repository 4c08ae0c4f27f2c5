// Shared test helpers: a local axum server and a captured-output runner.
//
// Every test talks to 127.0.0.1 only; nothing reaches the public network.

#![allow(dead_code)] // Each test file uses a different subset

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;

use curlkit::{execute_with, CurlError, ExitSignal, RequestConfiguration};

/// Authorization header seen per request path, in arrival order.
pub type AuthLog = Arc<Mutex<Vec<(String, Option<String>)>>>;

/// Builds the router used by the exchange tests.
///
/// - `/ok` → 200 `hello`
/// - `/missing` → 404 `not here`
/// - `/echo` (any method) → `<METHOD> <body>`, with the request Content-Type
///   mirrored in `x-seen-content-type`
/// - `/cookies` → two `Set-Cookie` headers
/// - `/auth/start` → 302 `/auth/next` → 302 `/auth/end` → 200
/// - `/loop/0` .. `/loop/9` → 302 to the next index
/// - `/slow` → 200 after two seconds
pub fn test_router(auth_log: AuthLog) -> Router {
    Router::new()
        .route("/ok", get(|| async { "hello" }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "not here") }),
        )
        .route("/echo", any(echo))
        .route(
            "/cookies",
            get(|| async {
                let mut headers = HeaderMap::new();
                headers.append(
                    header::SET_COOKIE,
                    "session=abc; Path=/; HttpOnly".parse().expect("header"),
                );
                headers.append(
                    header::SET_COOKIE,
                    "theme=dark; Max-Age=3600".parse().expect("header"),
                );
                (headers, "cookies set")
            }),
        )
        .route("/auth/start", get(auth_hop))
        .route("/auth/next", get(auth_hop))
        .route("/auth/end", get(auth_hop))
        .route(
            "/loop/{index}",
            get(
                |axum::extract::Path(index): axum::extract::Path<usize>| async move {
                    (
                        StatusCode::FOUND,
                        [(header::LOCATION, format!("/loop/{}", index + 1))],
                    )
                },
            ),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "finally"
            }),
        )
        .with_state(auth_log)
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none")
        .to_string();
    let mut payload = format!("{} ", method).into_bytes();
    payload.extend_from_slice(&body);
    ([("x-seen-content-type", content_type)], payload)
}

async fn auth_hop(
    State(log): State<AuthLog>,
    uri: axum::http::Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    log.lock()
        .expect("auth log lock")
        .push((uri.path().to_string(), auth));

    match uri.path() {
        "/auth/start" => (StatusCode::FOUND, [(header::LOCATION, "/auth/next")]).into_response(),
        "/auth/next" => (StatusCode::FOUND, [(header::LOCATION, "/auth/end")]).into_response(),
        _ => "authorized end".into_response(),
    }
}

/// Starts the test router on an ephemeral port and returns its base URL.
pub async fn start_server() -> (String, AuthLog) {
    let auth_log: AuthLog = Arc::new(Mutex::new(Vec::new()));
    let app = test_router(auth_log.clone());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    (format!("http://{}", addr), auth_log)
}

/// Result of one exchange with captured primary and trace output.
pub struct Captured {
    pub result: Result<ExitSignal, CurlError>,
    pub primary: Vec<u8>,
    pub trace: Vec<u8>,
}

impl Captured {
    pub fn primary_text(&self) -> String {
        String::from_utf8_lossy(&self.primary).into_owned()
    }

    pub fn trace_text(&self) -> String {
        String::from_utf8_lossy(&self.trace).into_owned()
    }
}

pub async fn run(config: &RequestConfiguration) -> Captured {
    let mut primary = Vec::new();
    let mut trace = Vec::new();
    let result = execute_with(config, &mut primary, &mut trace).await;
    Captured {
        result,
        primary,
        trace,
    }
}

pub fn config_for(url: String) -> RequestConfiguration {
    RequestConfiguration {
        url,
        ..Default::default()
    }
}
