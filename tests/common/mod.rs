#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use notebox::{
    AppState,
    auth::SessionManager,
    config::Config,
    create_router,
    database::{MemoryStore, NoteStore, UserStore},
};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const PASSWORD: &str = "Abcdef1!";

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some("test-secret".to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        "VIEWS_DIR" => Some(concat!(env!("CARGO_MANIFEST_DIR"), "/views").to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn state_with(users: Arc<dyn UserStore>, notes: Arc<dyn NoteStore>) -> AppState {
    let config = test_config();
    let sessions = SessionManager::new(&config.jwt_secret).unwrap();
    AppState::new(users, notes, sessions, config)
}

pub fn memory_app() -> (Router, AppState) {
    let store = MemoryStore::new();
    let state = state_with(Arc::new(store.clone()), Arc::new(store));
    (create_router(state.clone()), state)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub json: Value,
}

impl TestResponse {
    /// `name=value` of the `token` cookie set by the response, if any.
    pub fn token_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("token="))
            .map(str::to_string)
    }
}

pub async fn send_request(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    TestResponse {
        status,
        headers,
        text,
        json,
    }
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send_request(app, request).await
}

pub async fn signup(app: &Router, username: &str) -> TestResponse {
    send(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "username": username, "password": PASSWORD })),
    )
    .await
}

pub async fn login(app: &Router, username: &str) -> String {
    let resp = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": PASSWORD })),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.text);
    resp.json["token"].as_str().unwrap().to_string()
}

pub async fn signup_and_login(app: &Router, username: &str) -> String {
    let resp = signup(app, username).await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.text);
    login(app, username).await
}

pub async fn create_note(app: &Router, token: &str, title: &str, content: &str) -> Value {
    let resp = send(
        app,
        Method::POST,
        "/api/notes",
        Some(token),
        Some(json!({ "title": title, "content": content })),
    )
    .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.text);
    resp.json["note"].clone()
}

/// Asserts the uniform error body and returns its code.
pub fn assert_error(resp: &TestResponse, status: StatusCode) -> i64 {
    assert_eq!(resp.status, status, "{}", resp.text);
    let body = resp.json.as_object().expect("error body is a JSON object");
    assert_eq!(body.len(), 3, "{}", resp.text);
    assert_eq!(body["status"], "error");
    assert!(body["msg"].is_string());
    body["code"].as_i64().unwrap()
}
