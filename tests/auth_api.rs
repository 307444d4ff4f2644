mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use notebox::{auth::SessionManager, models::Role};
use serde_json::json;

use common::*;

#[tokio::test]
async fn first_user_becomes_admin() {
    let (app, _) = memory_app();

    let alice = signup(&app, "alice").await;
    assert_eq!(alice.status, StatusCode::CREATED);
    assert_eq!(alice.json["status"], "success");
    assert_eq!(alice.json["user"]["role"], "admin");
    assert_eq!(alice.json["user"]["level"], 4);
    assert!(alice.json["user"].get("password_hash").is_none());

    let bob = signup(&app, "bob").await;
    assert_eq!(bob.json["user"]["role"], "user");
    assert_eq!(bob.json["user"]["level"], 1);
}

#[tokio::test]
async fn signup_normalizes_and_rejects_duplicates() {
    let (app, _) = memory_app();
    let resp = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({
            "username": "  Alice ",
            "password": PASSWORD,
            "email": " Alice@Example.COM ",
            "first_name": "Alice",
            "last_name": "Liddell"
        })),
    )
    .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.text);
    assert_eq!(resp.json["user"]["username"], "alice");
    assert_eq!(resp.json["user"]["email"], "alice@example.com");
    assert_eq!(resp.json["user"]["full_name"], "Alice Liddell");

    let dup = signup(&app, "ALICE").await;
    assert_eq!(assert_error(&dup, StatusCode::CONFLICT), 1001);

    let dup_email = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "username": "alice2", "password": PASSWORD, "email": "alice@example.com" })),
    )
    .await;
    assert_eq!(assert_error(&dup_email, StatusCode::CONFLICT), 1001);
}

#[tokio::test]
async fn signup_enforces_shape_rules() {
    let (app, _) = memory_app();
    for username in ["ab", "admin", "me", "bad name", "dash-ed"] {
        let resp = signup(&app, username).await;
        assert_eq!(assert_error(&resp, StatusCode::BAD_REQUEST), 1000, "{username}");
    }

    for password in ["Ab1!", "abcdefg1!", "ABCDEFG1!", "Abcdefgh!", "Abcdefgh1"] {
        let resp = send(
            &app,
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({ "username": "carol", "password": password })),
        )
        .await;
        assert_eq!(assert_error(&resp, StatusCode::BAD_REQUEST), 1000, "{password}");
    }
}

#[tokio::test]
async fn malformed_json_is_a_json_error() {
    let (app, _) = memory_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();
    let resp = send_request(&app, request).await;
    assert_eq!(assert_error(&resp, StatusCode::BAD_REQUEST), 1000);
}

#[tokio::test]
async fn login_issues_a_valid_token_and_cookie() {
    let (app, state) = memory_app();
    signup(&app, "alice").await;

    let resp = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "Alice", "password": PASSWORD })),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    let token = resp.json["token"].as_str().unwrap();

    let claims = state.sessions.validate(token).unwrap();
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.role, Role::Admin);

    let cookie = resp.token_cookie().unwrap();
    assert!(cookie.starts_with(&format!("token={token}")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn login_by_email_uses_stored_username() {
    let (app, state) = memory_app();
    send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "username": "alice", "password": PASSWORD, "email": "a@example.com" })),
    )
    .await;

    let resp = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "A@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.text);
    let claims = state
        .sessions
        .validate(resp.json["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.username, "alice");
}

#[tokio::test]
async fn login_cookie_domain_is_the_request_host() {
    let (app, _) = memory_app();
    signup(&app, "alice").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::HOST, "notes.local:8080")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": "alice", "password": PASSWORD }).to_string(),
        ))
        .unwrap();
    let resp = send_request(&app, request).await;
    assert!(resp.token_cookie().unwrap().contains("Domain=notes.local"));
}

#[tokio::test]
async fn bad_logins_are_rejected() {
    let (app, _) = memory_app();
    signup(&app, "alice").await;

    let wrong = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "Wrong123!" })),
    )
    .await;
    assert_eq!(assert_error(&wrong, StatusCode::UNAUTHORIZED), 1002);

    let unknown = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": PASSWORD })),
    )
    .await;
    assert_eq!(assert_error(&unknown, StatusCode::UNAUTHORIZED), 1002);

    let empty = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "password": PASSWORD })),
    )
    .await;
    assert_eq!(assert_error(&empty, StatusCode::UNAUTHORIZED), 1002);
}

#[tokio::test]
async fn protected_routes_need_a_credential() {
    let (app, _) = memory_app();
    let resp = send(&app, Method::GET, "/api/notes", None, None).await;
    assert_eq!(assert_error(&resp, StatusCode::UNAUTHORIZED), 1002);

    let request = Request::builder()
        .uri("/api/notes")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6cHc=")
        .body(Body::empty())
        .unwrap();
    let resp = send_request(&app, request).await;
    assert_eq!(assert_error(&resp, StatusCode::UNAUTHORIZED), 1002);
}

#[tokio::test]
async fn token_failures_map_to_distinct_codes() {
    let (app, state) = memory_app();
    signup(&app, "alice").await;

    let expired = state
        .sessions
        .issue_at("alice", Role::Admin, 4, Utc::now() - Duration::minutes(10))
        .unwrap();
    let resp = send(&app, Method::GET, "/api/notes", Some(&expired.token), None).await;
    assert_eq!(assert_error(&resp, StatusCode::UNAUTHORIZED), 1007);

    let foreign = SessionManager::new("another-secret")
        .unwrap()
        .issue("alice", Role::Admin, 4)
        .unwrap();
    let resp = send(&app, Method::GET, "/api/notes", Some(&foreign.token), None).await;
    assert_eq!(assert_error(&resp, StatusCode::UNAUTHORIZED), 1006);

    let resp = send(&app, Method::GET, "/api/notes", Some("not-a-jwt"), None).await;
    assert_eq!(assert_error(&resp, StatusCode::BAD_REQUEST), 1006);
}

#[tokio::test]
async fn cookie_credential_is_accepted() {
    let (app, _) = memory_app();
    signup(&app, "alice").await;
    let token = login(&app, "alice").await;

    let request = Request::builder()
        .uri("/user/me")
        .header(header::COOKIE, format!("token={token}"))
        .body(Body::empty())
        .unwrap();
    let resp = send_request(&app, request).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["user"]["username"], "alice");
}

#[tokio::test]
async fn refresh_only_near_expiry() {
    let (app, state) = memory_app();
    let fresh = signup_and_login(&app, "alice").await;

    let resp = send(&app, Method::POST, "/auth/refresh", Some(&fresh), None).await;
    assert_eq!(assert_error(&resp, StatusCode::BAD_REQUEST), 1008);

    let aging = state
        .sessions
        .issue_at("alice", Role::Admin, 4, Utc::now() - Duration::seconds(250))
        .unwrap();
    let resp = send(&app, Method::POST, "/auth/refresh", Some(&aging.token), None).await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.text);

    let renewed = state
        .sessions
        .validate(resp.json["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(renewed.username, "alice");
    assert!(renewed.exp > aging.claims.exp);
    assert!(resp.token_cookie().is_some());

    let resp = send(&app, Method::POST, "/auth/refresh", None, None).await;
    assert_eq!(assert_error(&resp, StatusCode::UNAUTHORIZED), 1002);
}

#[tokio::test]
async fn logout_revokes_the_cookie() {
    let (app, _) = memory_app();
    for method in [Method::POST, Method::GET] {
        let resp = send(&app, method, "/auth/logout", None, None).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.json["status"], "success");
        let cookie = resp.token_cookie().unwrap();
        assert!(cookie.starts_with("token=;"), "{cookie}");
        assert!(cookie.contains("Max-Age="), "{cookie}");
    }
}
