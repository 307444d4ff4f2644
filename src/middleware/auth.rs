use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::auth::extract_credential;
use crate::error::AppError;

/// Validates the session credential and hands its `Claims` to the handler.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_credential(request.headers()).inspect_err(|_| {
        tracing::debug!("No credential on {} {}", request.method(), request.uri().path());
    })?;

    let claims = state.sessions.validate(&token).inspect_err(|e| {
        tracing::info!("Rejected credential on {}: {}", request.uri().path(), e);
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
