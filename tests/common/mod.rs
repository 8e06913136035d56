//! Shared fixtures: content documents on disk, a mock identity provider,
//! and an smlt server bound to an ephemeral port.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{json, Value};
use smlt::api::{create_router, AppState};
use smlt::config::Config;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const PROVIDER_SECRET: &[u8] = b"mock-provider-secret";
pub const PASSWORD: &str = "secret123";

pub fn courses_json() -> Value {
    json!([
        {"id": 1, "title": "Thinking Like a Scientist", "description": "Intro course", "image": "/img/c1.png", "summary": "Start here", "lessons": [2, 4]},
        {"id": 2, "title": "Experiments", "description": "", "image": "", "summary": "", "lessons": []}
    ])
}

pub fn lessons_json() -> Value {
    json!([
        {"id": 2, "title": "Asking Questions", "summary": "", "intro": "Why?", "image": "", "quiz_id": 1,
         "sections": [{"title": "Curiosity", "content": "Start with a question", "key_points": ["Be specific"]}],
         "key_takeaways": ["Questions drive inquiry"]},
        {"id": 4, "title": "Forming Hypotheses", "summary": "", "intro": "", "image": "", "quiz_id": 2,
         "sections": [], "key_takeaways": [],
         "glossary": [{"term": "Hypothesis", "definition": "A testable explanation"}]},
        {"id": 5, "title": "Drawing Conclusions", "summary": "", "intro": "", "image": "", "quiz_id": 3,
         "sections": [], "key_takeaways": [], "connection_to_scientific_method": "Final step"}
    ])
}

pub fn quizzes_json() -> Value {
    json!([
        {"id": 1, "title": "Questions Quiz", "description": "", "lesson_id": 2, "next_lesson_id": 4,
         "questions": [{"id": 1, "text": "What starts an investigation?", "answers": [
             {"id": 1, "text": "A question", "correct": true, "explanation": "Curiosity first"},
             {"id": 2, "text": "A conclusion", "correct": false}
         ]}]}
    ])
}

/// Write the three content documents under `<dir>/data`
pub fn write_content(dir: &std::path::Path) {
    let data = dir.join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("courses.json"), courses_json().to_string()).unwrap();
    std::fs::write(data.join("lessons.json"), lessons_json().to_string()).unwrap();
    std::fs::write(data.join("quizzes.json"), quizzes_json().to_string()).unwrap();
}

/// Issue a token signed by the mock provider
pub fn issue_token(record_id: &str, ttl_secs: i64) -> String {
    static NONCE: AtomicUsize = AtomicUsize::new(0);
    let claims = json!({
        "id": record_id,
        "type": "auth",
        "collectionId": "pbc_smlt_users",
        "exp": chrono::Utc::now().timestamp() + ttl_secs,
        "nonce": NONCE.fetch_add(1, Ordering::SeqCst),
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(PROVIDER_SECRET)).unwrap()
}

pub fn user_record(id: &str, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{}@example.com", username),
        "collectionId": "pbc_smlt_users",
        "collectionName": "smlt_users",
        "verified": true,
    })
}

/// In-memory stand-in for the PocketBase record auth API
#[derive(Default)]
pub struct MockProvider {
    pub users: Mutex<Vec<Value>>,
    pub revoked: Mutex<HashSet<String>>,
    pub refresh_calls: AtomicUsize,
}

impl MockProvider {
    pub fn with_user(id: &str, username: &str) -> Arc<Self> {
        let provider = Self::default();
        provider.users.lock().unwrap().push(user_record(id, username));
        Arc::new(provider)
    }

    pub fn revoke(&self, token: &str) {
        self.revoked.lock().unwrap().insert(token.to_string());
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn find_user(&self, id: &str) -> Option<Value> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u["id"] == id)
            .cloned()
    }
}

fn provider_error(status: StatusCode, message: &str, data: Value) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({"status": status.as_u16(), "message": message, "data": data})),
    )
}

async fn auth_with_password(
    State(provider): State<Arc<MockProvider>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let identity = body["identity"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let user = provider
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|u| u["username"] == identity || u["email"] == identity)
        .cloned();

    match user {
        Some(user) if password == PASSWORD => {
            let token = issue_token(user["id"].as_str().unwrap_or_default(), 3600);
            (StatusCode::OK, Json(json!({"token": token, "record": user})))
        }
        _ => provider_error(StatusCode::BAD_REQUEST, "Failed to authenticate.", json!({})),
    }
}

async fn auth_refresh(
    State(provider): State<Arc<MockProvider>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    provider.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let unauthorized = || {
        provider_error(
            StatusCode::UNAUTHORIZED,
            "The request requires valid record authorization token.",
            json!({}),
        )
    };

    if provider.revoked.lock().unwrap().contains(&token) {
        return unauthorized();
    }

    let Ok(data) = decode::<Value>(
        &token,
        &DecodingKey::from_secret(PROVIDER_SECRET),
        &Validation::default(),
    ) else {
        return unauthorized();
    };

    let id = data.claims["id"].as_str().unwrap_or_default().to_string();
    match provider.find_user(&id) {
        Some(user) => (
            StatusCode::OK,
            Json(json!({"token": issue_token(&id, 3600), "record": user})),
        ),
        None => unauthorized(),
    }
}

async fn create_record(
    State(provider): State<Arc<MockProvider>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if body["password"] != body["passwordConfirm"] {
        return provider_error(
            StatusCode::BAD_REQUEST,
            "Failed to create record.",
            json!({"passwordConfirm": {"code": "validation_values_mismatch", "message": "Values don't match."}}),
        );
    }

    let username = body["username"].as_str().unwrap_or_default().to_string();
    let mut users = provider.users.lock().unwrap();
    if users.iter().any(|u| u["username"] == username.as_str()) {
        return provider_error(
            StatusCode::BAD_REQUEST,
            "Failed to create record.",
            json!({"username": {"code": "validation_not_unique", "message": "Value must be unique."}}),
        );
    }

    let mut record = user_record(&format!("u{}", users.len() + 1), &username);
    record["email"] = body["email"].clone();
    record["verified"] = json!(false);
    users.push(record.clone());
    (StatusCode::OK, Json(record))
}

/// Serve the mock provider on an ephemeral port and return its base URL
pub async fn spawn_provider(provider: Arc<MockProvider>) -> String {
    let app = Router::new()
        .route(
            "/api/collections/smlt_users/auth-with-password",
            post(auth_with_password),
        )
        .route("/api/collections/smlt_users/auth-refresh", post(auth_refresh))
        .route("/api/collections/smlt_users/records", post(create_record))
        .with_state(provider);

    let addr = serve(app).await;
    format!("http://{}", addr)
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A running smlt server with its content directory
pub struct TestApp {
    pub base_url: String,
    pub config: Config,
    pub client: reqwest::Client,
    _dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Config pointing at a provider URL and a content directory
pub fn test_config(provider_url: &str, dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.auth.url = provider_url.to_string();
    config.auth.cookie_secure = false;
    config.auth.timeout_secs = Some(5);
    config.server.static_dir = dir.to_path_buf();
    config.content.source = dir.to_string_lossy().to_string();
    config.storage.path = dir.join("storage.json");
    config
}

pub async fn spawn_app(provider_url: &str) -> TestApp {
    let dir = TempDir::new().unwrap();
    write_content(dir.path());
    let config = test_config(provider_url, dir.path());

    let state = Arc::new(AppState::new(config.clone()).unwrap());
    let addr = serve(create_router(state)).await;

    TestApp {
        base_url: format!("http://{}", addr),
        config,
        client: reqwest::Client::new(),
        _dir: dir,
    }
}

/// Collect the `Set-Cookie` headers of a response
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Turn a `Set-Cookie` value into the `Cookie` header a browser would send back
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().to_string()
}
