//! Signed, short-lived bearer credentials.
//!
//! Tokens are HS256 JWTs carrying [`Claims`]. Nothing is stored server side, so
//! validation depends only on the signature and the expiry timestamp. Browsers
//! receive the same token in a `token` cookie; other clients send it as
//! `Authorization: Bearer <token>`.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::models::Role;

pub const TOKEN_COOKIE: &str = "token";
pub const TOKEN_TTL_SECS: i64 = 5 * 60;
/// A token may only be refreshed once its remaining life is at most this long.
pub const REFRESH_WINDOW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub role: Role,
    pub level: i32,
    /// Issued at, unix seconds.
    pub iat: i64,
    /// Expires at, unix seconds.
    pub exp: i64,
}

impl Claims {
    pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> i64 {
        self.exp - now.timestamp()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Clone)]
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionManager {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn issue(&self, username: &str, role: Role, level: i32) -> Result<IssuedToken, AuthError> {
        self.issue_at(username, role, level, Utc::now())
    }

    pub fn issue_at(
        &self,
        username: &str,
        role: Role,
        level: i32,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let claims = Claims {
            username: username.to_string(),
            role,
            level,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        tracing::debug!("Issued token for {} expiring at {}", claims.username, claims.exp);
        Ok(IssuedToken { token, claims })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Verifies the signature and the expiry against `now`.
    ///
    /// The decoder checks `exp` against the wall clock as well; the explicit
    /// comparison below is what enforces expiry for the supplied instant.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?;
        let claims = data.claims;

        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    pub fn refresh(&self, token: &str) -> Result<IssuedToken, AuthError> {
        self.refresh_at(token, Utc::now())
    }

    /// Re-issues a token with a fresh window, keeping its identity claims.
    pub fn refresh_at(&self, token: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let claims = self.validate_at(token, now)?;
        if claims.remaining_secs_at(now) > REFRESH_WINDOW_SECS {
            return Err(AuthError::TooEarly);
        }
        self.issue_at(&claims.username, claims.role, claims.level, now)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Malformed,
    }
}

/// Pulls the raw token from the `token` cookie, falling back to a bearer header.
pub fn extract_credential(headers: &HeaderMap) -> Result<String, AuthError> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Ok(cookie.value().to_string());
        }
    }

    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::Unauthenticated)
}

pub fn session_cookie(
    issued: &IssuedToken,
    hostname: Option<String>,
    now: DateTime<Utc>,
) -> Cookie<'static> {
    let max_age = issued.claims.remaining_secs_at(now).max(0);
    let mut builder = Cookie::build((TOKEN_COOKIE, issued.token.clone()))
        .path("/")
        .http_only(true)
        .secure(false)
        .max_age(time::Duration::seconds(max_age));
    if let Some(hostname) = hostname {
        builder = builder.domain(hostname);
    }
    builder.build()
}

/// Overwrites the session cookie with an empty, already-expired value.
pub fn revoke_cookie(hostname: Option<String>) -> Cookie<'static> {
    let mut builder = Cookie::build((TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(false)
        .max_age(time::Duration::seconds(-1));
    if let Some(hostname) = hostname {
        builder = builder.domain(hostname);
    }
    builder.build()
}
