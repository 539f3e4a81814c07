// Shared mock of the hosted stats/auth service for integration tests.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

pub const API_KEY: &str = "test-anon-key";
pub const PASSWORD: &str = "correct-horse-battery";
// Bearer token the mock treats as expired.
pub const EXPIRED_TOKEN: &str = "expired-token";

// Global base URL used by all tests after the mock publishes its bound address.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the mock bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();
// Every row the mock accepted, across all tests. Tests isolate by user id.
static ROWS: OnceLock<Mutex<Vec<StoredRow>>> = OnceLock::new();
static LOGOUTS: OnceLock<Mutex<Vec<String>>> = OnceLock::new();
// Usernames by user id, filled by sign-ups.
static PROFILES: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct StoredRow {
    pub body: Value,
    pub api_key: Option<String>,
    pub authorization: Option<String>,
}

fn rows() -> &'static Mutex<Vec<StoredRow>> {
    ROWS.get_or_init(|| Mutex::new(Vec::new()))
}

fn logouts() -> &'static Mutex<Vec<String>> {
    LOGOUTS.get_or_init(|| Mutex::new(Vec::new()))
}

fn profiles() -> &'static Mutex<HashMap<String, String>> {
    PROFILES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Rows stored for `user_id`, oldest first.
pub fn stored_rows(user_id: &str) -> Vec<StoredRow> {
    rows()
        .lock()
        .expect("rows mutex")
        .iter()
        .filter(|row| row.body["user_id"] == user_id)
        .cloned()
        .collect()
}

/// Polls until `user_id` has `count` rows; background reporting lands late.
pub async fn wait_for_rows(user_id: &str, count: usize) -> Vec<StoredRow> {
    for _ in 0..100 {
        let found = stored_rows(user_id);
        if found.len() >= count {
            return found;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("expected {count} rows for {user_id}");
}

pub fn logged_out(token: &str) -> bool {
    logouts()
        .lock()
        .expect("logouts mutex")
        .iter()
        .any(|t| t == token)
}

/// User id the mock issues for `email`.
pub fn user_id_for(email: &str) -> String {
    format!("user-{email}")
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    header(headers, "authorization")
        .and_then(|value| value.strip_prefix("Bearer ").map(str::to_string))
}

// Mirrors how the hosted REST layer rejects bad keys and stale tokens.
fn check_auth(headers: &HeaderMap) -> Result<(), Response> {
    if header(headers, "apikey").as_deref() != Some(API_KEY) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid API key" })),
        )
            .into_response());
    }
    match bearer(headers).as_deref() {
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "missing bearer token" })),
        )
            .into_response()),
        Some(EXPIRED_TOKEN) => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "JWT expired" })),
        )
            .into_response()),
        Some(_) => Ok(()),
    }
}

async fn insert_row(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(rejection) = check_auth(&headers) {
        return rejection;
    }
    rows().lock().expect("rows mutex").push(StoredRow {
        body,
        api_key: header(&headers, "apikey"),
        authorization: header(&headers, "authorization"),
    });
    StatusCode::CREATED.into_response()
}

fn eq_filter(params: &HashMap<String, String>, column: &str) -> Option<String> {
    params
        .get(column)
        .and_then(|value| value.strip_prefix("eq."))
        .map(str::to_string)
}

async fn select_rows(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if let Err(rejection) = check_auth(&headers) {
        return rejection;
    }
    let user_id = eq_filter(&params, "user_id");
    let game_id = eq_filter(&params, "game_id");

    let mut found: Vec<Value> = rows()
        .lock()
        .expect("rows mutex")
        .iter()
        .map(|row| row.body.clone())
        .filter(|body| user_id.as_deref().is_none_or(|id| body["user_id"] == id))
        .filter(|body| game_id.as_deref().is_none_or(|id| body["game_id"] == id))
        .collect();

    match params.get("order").map(String::as_str) {
        Some("score.desc") => found.sort_by_key(|body| std::cmp::Reverse(body["score"].as_i64())),
        Some("score.asc") => found.sort_by_key(|body| body["score"].as_i64()),
        Some("played_at.desc") => found.sort_by(|a, b| {
            b["played_at"]
                .as_str()
                .unwrap_or_default()
                .cmp(a["played_at"].as_str().unwrap_or_default())
        }),
        _ => {}
    }
    if let Some(limit) = params.get("limit").and_then(|l| l.parse::<usize>().ok()) {
        found.truncate(limit);
    }
    match params.get("select").map(String::as_str) {
        Some("score") => {
            found = found
                .into_iter()
                .map(|body| json!({ "score": body["score"] }))
                .collect();
        }
        Some("user_id,score,played_at,profiles(username)") => {
            let names = profiles().lock().expect("profiles mutex");
            found = found
                .into_iter()
                .map(|body| {
                    let profile = body["user_id"]
                        .as_str()
                        .and_then(|id| names.get(id))
                        .map(|name| json!({ "username": name }));
                    json!({
                        "user_id": body["user_id"],
                        "score": body["score"],
                        "played_at": body["played_at"],
                        "profiles": profile,
                    })
                })
                .collect();
        }
        _ => {}
    }
    Json(found).into_response()
}

async fn token(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if header(&headers, "apikey").as_deref() != Some(API_KEY)
        || params.get("grant_type").map(String::as_str) != Some("password")
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "Invalid API key" })),
        )
            .into_response();
    }
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] != PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })),
        )
            .into_response();
    }
    Json(json!({
        "access_token": format!("token-for-{email}"),
        "token_type": "bearer",
        "user": { "id": user_id_for(email), "email": email }
    }))
    .into_response()
}

// Emails containing `+confirm` wait for confirmation instead of getting a session.
async fn signup(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if header(&headers, "apikey").as_deref() != Some(API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "Invalid API key" })),
        )
            .into_response();
    }
    let email = body["email"].as_str().unwrap_or_default();
    let user_id = user_id_for(email);
    let username = body["data"]["username"].as_str().unwrap_or_default();

    let mut names = profiles().lock().expect("profiles mutex");
    if names.contains_key(&user_id) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "code": 422, "msg": "User already registered" })),
        )
            .into_response();
    }
    names.insert(user_id.clone(), username.to_string());

    if email.contains("+confirm") {
        return Json(json!({ "id": user_id, "email": email })).into_response();
    }
    Json(json!({
        "access_token": format!("token-for-{email}"),
        "token_type": "bearer",
        "user": { "id": user_id, "email": email }
    }))
    .into_response()
}

async fn logout(headers: HeaderMap) -> Response {
    let Some(token) = bearer(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    logouts().lock().expect("logouts mutex").push(token);
    StatusCode::NO_CONTENT.into_response()
}

fn router() -> Router {
    Router::new()
        .route("/rest/v1/game_stats", post(insert_row).get(select_rows))
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/signup", post(signup))
        .route("/auth/v1/logout", post(logout))
}

// Ensure the mock service is running and return the shared base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        // Slot where the server thread publishes its selected URL.
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // Own OS thread so the mock outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                axum::serve(listener, router()).await.expect("mock failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// Wait for URL publication and then for the socket to accept TCP connections.
fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("mock server did not become ready in time");
}
