use axum::{
    extract::{Extension, Json, Path, State, rejection::JsonRejection},
    http::HeaderMap,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::{
    AppState,
    auth::{
        AuthError, Claims, is_valid_username, normalize_email, normalize_username, revoke_cookie,
        session_cookie,
    },
    database::StoreError,
    error::AppError,
    models::User,
    result::Empty,
    utils::{request_hostname, success_to_api_response},
};

use super::model::{
    DeletedResponse, PasswordRequest, ProfileResponse, UpdateUserRequest, UpdateUserResponse,
    UserResponse,
};

/// The account behind a still-valid token may have been deleted since it was issued.
async fn current_user(state: &AppState, claims: &Claims) -> Result<User, AppError> {
    match state.users.get_by_username(&claims.username).await {
        Ok(user) => Ok(user),
        Err(StoreError::NotFound(_)) => Err(AuthError::Unauthenticated.into()),
        Err(e) => Err(e.into()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn search() -> impl IntoResponse {
    success_to_api_response("search not implemented", Empty::default())
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .get_by_username(&normalize_username(&username))
        .await?;
    Ok(success_to_api_response(
        "success",
        ProfileResponse {
            user: user.public_profile(),
        },
    ))
}

#[axum::debug_handler]
pub async fn get_me(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state, &claims).await?;
    Ok(success_to_api_response(
        "success",
        UserResponse {
            user: user.summary(),
        },
    ))
}

#[axum::debug_handler]
pub async fn update_me(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body?;
    let mut user = current_user(&state, &claims).await?;
    let previous_username = user.username.clone();

    if let Some(username) = non_blank(req.username).map(|u| normalize_username(&u)) {
        if !is_valid_username(&username) {
            return Err(AppError::BadRequest("invalid username".into()));
        }
        user.username = username;
    }
    if let Some(email) = non_blank(req.email) {
        user.email = Some(normalize_email(&email));
    }
    if let Some(first_name) = non_blank(req.first_name) {
        user.first_name = first_name;
    }
    if let Some(middle_name) = non_blank(req.middle_name) {
        user.middle_name = middle_name;
    }
    if let Some(last_name) = non_blank(req.last_name) {
        user.last_name = last_name;
    }
    if req.dob.is_some() {
        user.dob = req.dob;
    }

    let user = state.users.update(&user).await?;
    if user.username != previous_username {
        let moved = state
            .notes
            .rename_owner(&previous_username, &user.username)
            .await?;
        tracing::info!(
            "Renamed user {} to {}, moved {} notes",
            previous_username,
            user.username,
            moved
        );
    }

    let issued = state.sessions.issue(&user.username, user.role, user.level)?;
    let jar = jar.add(session_cookie(&issued, request_hostname(&headers), Utc::now()));

    Ok((
        jar,
        success_to_api_response(
            "user updated",
            UpdateUserResponse {
                user: user.summary(),
                token: issued.token,
            },
        ),
    ))
}

/// Deletes the caller's notes, then soft-deletes the account.
#[axum::debug_handler]
pub async fn delete_me(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Result<Json<PasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body?;
    let user = current_user(&state, &claims).await?;

    if !state
        .notes
        .verify_owner_password(&user.username, &req.password)
        .await?
    {
        return Err(AppError::InvalidCredentials("invalid password".into()));
    }

    let deleted = state.notes.delete_all_by_owner(&user.username).await?;
    state.users.delete(user.id).await?;
    tracing::info!("Deleted user {} and {} notes", user.username, deleted);

    let jar = jar.add(revoke_cookie(request_hostname(&headers)));
    Ok((
        jar,
        success_to_api_response("user deleted", DeletedResponse { deleted }),
    ))
}
