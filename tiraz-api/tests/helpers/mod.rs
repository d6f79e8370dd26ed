//! Shared helpers for tiraz-api integration tests
#![allow(dead_code)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tiraz_api::{build_router, AppState};
use tiraz_common::Settings;

pub const TEST_SECRET: &str = "q7Lm2Zx9Tt4Rv8Pw1Ny6Hb3Kc5Jd0Fg-unique";
pub const BOUNDARY: &str = "tiraz-test-boundary";

/// Smallest byte prefix `infer` recognises as JPEG
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
/// PNG signature plus padding
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

/// Router plus the state and temp upload dir backing it
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    // Held so the directory outlives the test
    pub upload_dir: TempDir,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> axum::response::Response {
        use tower::ServiceExt;
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

pub fn test_settings(ai_service_url: &str, upload_dir: &std::path::Path) -> Settings {
    let upload_dir = upload_dir.display().to_string();
    let lookup = move |key: &str| -> Option<String> {
        match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "SECRET_KEY" => Some(TEST_SECRET.to_string()),
            "ENVIRONMENT" => Some("test".to_string()),
            "AI_SERVICE_URL" => Some(ai_service_url.to_string()),
            "UPLOAD_DIR" => Some(upload_dir.clone()),
            _ => None,
        }
    };
    Settings::from_lookup(lookup).expect("test settings are valid")
}

/// App with in-memory SQLite and a fresh upload directory
pub async fn test_app(ai_service_url: &str) -> TestApp {
    let upload_dir = TempDir::new().unwrap();
    let settings = test_settings(ai_service_url, upload_dir.path());
    test_app_with_settings(settings, upload_dir).await
}

pub async fn test_app_with_settings(settings: Settings, upload_dir: TempDir) -> TestApp {
    let pool = tiraz_common::db::init_database(&settings.database_url)
        .await
        .unwrap();
    let state = AppState::new(pool, settings).unwrap();
    let router = build_router(state.clone());

    TestApp {
        router,
        state,
        upload_dir,
    }
}

/// Stand-in for the AI service on an ephemeral port
///
/// Answers every `POST /process_measurements` with the configured status and
/// body, and keeps each request body for inspection.
pub struct FakeAi {
    pub url: String,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeAi {
    pub fn received(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct FakeAiState {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn fake_process(
    State(state): State<FakeAiState>,
    Json(body): Json<Value>,
) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    state.requests.lock().unwrap().push(body);
    (
        state.status,
        [("content-type", "application/json")],
        state.body.clone(),
    )
}

pub async fn spawn_fake_ai(status: StatusCode, body: &str) -> FakeAi {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/process_measurements", post(fake_process))
        .with_state(FakeAiState {
            status,
            body: body.to_string(),
            requests: requests.clone(),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeAi {
        url: format!("http://{}", addr),
        requests,
    }
}

/// URL of a port that was free a moment ago; connecting is refused
pub fn unreachable_ai_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// One file part: (file name, content type, bytes)
pub type FilePart<'a> = (&'a str, &'a str, &'a [u8]);

pub fn multipart_body(user_id: Option<&str>, files: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(user_id) = user_id {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"userId\"\r\n\r\n");
        body.extend_from_slice(user_id.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for (name, content_type, bytes) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(uri: &str, user_id: Option<&str>, files: &[FilePart<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(user_id, files)))
        .unwrap()
}

/// Upload with one part that carries a content type but no filename
pub fn unnamed_part_request(
    uri: &str,
    user_id: &str,
    content_type: &str,
    bytes: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"userId\"\r\n\r\n");
    body.extend_from_slice(user_id.as_bytes());
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"notes\"\r\n");
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
