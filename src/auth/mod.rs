pub mod password;
pub mod session;

pub use password::{
    hash_password, is_valid_password, is_valid_username, normalize_email, normalize_username,
    verify_password,
};
pub use session::{
    Claims, IssuedToken, REFRESH_WINDOW_SECS, SessionManager, TOKEN_COOKIE, TOKEN_TTL_SECS,
    extract_credential, revoke_cookie, session_cookie,
};

/// Failures of the session credential flow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing or malformed credential")]
    Unauthenticated,
    #[error("invalid token")]
    InvalidSignature,
    #[error("bad token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("token can only be refreshed during the last 60 seconds of its life")]
    TooEarly,
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("failed to sign token: {0}")]
    Signing(String),
}
