// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use todo_board::config::Config;
use todo_board::db::{Backend, FirestoreDb};
use todo_board::routes::create_router;
use todo_board::services::LocalAssetStore;
use todo_board::AppState;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Name that will not collide with earlier runs against a shared emulator.
#[allow(dead_code)]
pub fn unique_name(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

/// Router plus the state and upload directory behind it.
///
/// The upload directory is removed when the app is dropped.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub upload_dir: TempDir,
}

/// Create a test app over the in-memory backend.
#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    create_test_app_with(Backend::memory()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with(backend: Backend) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = Config {
        upload_dir: upload_dir.path().to_path_buf(),
        ..Config::test_default()
    };
    let assets = LocalAssetStore::new(upload_dir.path()).await.unwrap();
    let state = Arc::new(AppState::new(config, backend, Arc::new(assets)));

    TestApp {
        router: create_router(state.clone()),
        state,
        upload_dir,
    }
}

#[allow(dead_code)]
impl TestApp {
    /// Send one request and decode the JSON body (`Null` when empty).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn send_json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(method, uri, &body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Register a user and return the id reported by login.
    pub async fn register_user(&self, username: &str) -> u64 {
        let credentials = serde_json::json!({"username": username, "password": "secret1"});
        let (status, _) = self
            .send_json(Method::POST, "/api/register", credentials.clone())
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .send_json(Method::POST, "/api/login", credentials)
            .await;
        assert_eq!(status, StatusCode::OK);
        body["userId"].as_u64().unwrap()
    }

    /// Create a todo and return its JSON.
    pub async fn create_todo(&self, author: &str, title: &str) -> Value {
        let (status, body) = self
            .send_json(
                Method::POST,
                "/api/todos",
                serde_json::json!({"title": title, "author": author}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body
    }
}

#[allow(dead_code)]
pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "todo-board-test-boundary";

/// Build a `multipart/form-data` upload with a single file field.
#[allow(dead_code)]
pub fn multipart_request(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Serve a fresh in-memory app on an ephemeral port.
///
/// Returns the base URL and the upload directory guard.
#[allow(dead_code)]
pub async fn spawn_server() -> (String, TempDir) {
    let app = create_test_app().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let TestApp {
        router, upload_dir, ..
    } = app;
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), upload_dir)
}
