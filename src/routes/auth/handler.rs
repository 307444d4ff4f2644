use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::{
    AppState,
    auth::{
        self, extract_credential, hash_password, is_valid_password, is_valid_username,
        normalize_email, normalize_username, revoke_cookie, session_cookie,
    },
    database::StoreError,
    error::AppError,
    models::{NewUser, Role, User},
    result::Empty,
    utils::{request_hostname, success_to_api_response},
};

use super::model::{LoginRequest, SignupRequest, SignupResponse, TokenResponse};

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body?;

    let username = normalize_username(&req.username);
    if !is_valid_username(&username) {
        return Err(AppError::BadRequest("invalid username".into()));
    }
    if !is_valid_password(&req.password) {
        return Err(AppError::BadRequest(
            "bad password: use at least 8 characters with upper and lower case letters, a digit and a symbol"
                .into(),
        ));
    }
    let email = req
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|email| !email.is_empty());

    let password_hash = hash_password(&req.password, state.config.bcrypt_cost)?;
    let mut user = state
        .users
        .create(NewUser {
            username,
            email,
            first_name: trimmed(req.first_name),
            middle_name: trimmed(req.middle_name),
            last_name: trimmed(req.last_name),
            dob: req.dob,
            password_hash,
            role: Role::User,
            level: Role::User.default_level(),
        })
        .await?;

    // Soft-deleted rows count too.
    if state.users.count_all().await? == 1 {
        user.promote_to_admin();
        user = state.users.update(&user).await?;
        tracing::info!("Promoted first user {} to admin", user.username);
    }

    tracing::info!("Signed up user {}", user.username);
    Ok((
        StatusCode::CREATED,
        success_to_api_response(
            "user created successfully",
            SignupResponse {
                user: user.summary(),
            },
        ),
    ))
}

async fn find_login_user(state: &AppState, req: &LoginRequest) -> Result<User, AppError> {
    let invalid = || AppError::InvalidCredentials("invalid credentials".into());

    if let Some(username) = req.username.as_deref().map(normalize_username) {
        if !username.is_empty() {
            match state.users.get_by_username(&username).await {
                Ok(user) => return Ok(user),
                Err(StoreError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    let email = req.email.as_deref().map(normalize_email).unwrap_or_default();
    if email.is_empty() {
        return Err(invalid());
    }
    match state.users.get_by_email(&email).await {
        Ok(user) => Ok(user),
        Err(StoreError::NotFound(_)) => Err(invalid()),
        Err(e) => Err(e.into()),
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body?;

    let has_identity = [&req.username, &req.email]
        .iter()
        .any(|v| v.as_deref().is_some_and(|v| !v.trim().is_empty()));
    if !has_identity || req.password.is_empty() {
        return Err(AppError::InvalidCredentials(
            "username or email and password are required".into(),
        ));
    }

    let user = find_login_user(&state, &req).await?;
    if !auth::verify_password(&req.password, &user.password_hash) {
        tracing::info!("Failed login for {}", user.username);
        return Err(AppError::InvalidCredentials("invalid credentials".into()));
    }

    let issued = state.sessions.issue(&user.username, user.role, user.level)?;
    let jar = jar.add(session_cookie(&issued, request_hostname(&headers), Utc::now()));

    tracing::info!("User {} logged in", user.username);
    Ok((
        jar,
        success_to_api_response(
            "logged in",
            TokenResponse {
                token: issued.token,
            },
        ),
    ))
}

/// Re-issues the caller's credential during the last minute of its life.
#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let token = extract_credential(&headers)?;
    let issued = state.sessions.refresh(&token)?;
    let jar = jar.add(session_cookie(&issued, request_hostname(&headers), Utc::now()));

    tracing::debug!("Refreshed token for {}", issued.claims.username);
    Ok((
        jar,
        success_to_api_response(
            "token refreshed",
            TokenResponse {
                token: issued.token,
            },
        ),
    ))
}

pub async fn logout(headers: HeaderMap, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(revoke_cookie(request_hostname(&headers)));
    (jar, success_to_api_response("logged out", Empty::default()))
}
