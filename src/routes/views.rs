//! HTML pages served straight from the views directory.

use std::path::Path;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{AppState, auth::extract_credential, error::AppError};

async fn page(state: &AppState, name: &str) -> Result<Html<String>, AppError> {
    let path = Path::new(&state.config.views_dir).join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Missing page {}", path.display());
            Err(AppError::NotFound(format!("page {name} not found")))
        }
        Err(e) => Err(AppError::Internal(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}

/// Pages that only make sense for a signed-in browser send everyone else to `/login`.
async fn signed_in_page(
    state: &AppState,
    headers: &HeaderMap,
    name: &str,
) -> Result<Response, AppError> {
    if extract_credential(headers).is_err() {
        return Ok(Redirect::to("/login").into_response());
    }
    Ok(page(state, name).await?.into_response())
}

pub async fn app(State(state): State<AppState>, headers: HeaderMap) -> Result<Html<String>, AppError> {
    let name = if extract_credential(&headers).is_ok() {
        "index.html"
    } else {
        "welcome.html"
    };
    page(&state, name).await
}

pub async fn login(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    page(&state, "login.html").await
}

pub async fn register(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    page(&state, "register.html").await
}

pub async fn account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    signed_in_page(&state, &headers, "account.html").await
}

pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    signed_in_page(&state, &headers, "delete_user.html").await
}

pub async fn delete_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    signed_in_page(&state, &headers, "delete_notes.html").await
}

/// Any unmatched path gets the 404 page, or a JSON error when the page is missing.
pub async fn not_found(State(state): State<AppState>) -> Response {
    match page(&state, "404.html").await {
        Ok(html) => (StatusCode::NOT_FOUND, html).into_response(),
        Err(_) => AppError::NotFound("route not found".into()).into_response(),
    }
}
