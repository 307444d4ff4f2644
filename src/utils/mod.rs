use axum::Json;
use axum::http::{HeaderMap, header};
use serde::Serialize;

use crate::result::{ApiResult, Empty};

pub fn success_to_api_response<T: Serialize>(msg: &str, data: T) -> Json<ApiResult<T>> {
    Json(ApiResult::success(msg, data))
}

pub fn error_to_api_response(code: i32, msg: String) -> Json<ApiResult<Empty>> {
    Json(ApiResult::error(code, msg))
}

/// Request host without its port, used as the cookie domain.
pub fn request_hostname(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?.trim();
    let hostname = match host.strip_prefix('[') {
        // [::1]:8080
        Some(rest) => rest.split(']').next().unwrap_or_default(),
        None => host.split(':').next().unwrap_or_default(),
    };
    if hostname.is_empty() {
        None
    } else {
        Some(hostname.to_string())
    }
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const USER_EXISTS: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const PERMISSION_DENIED: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const TOKEN_INVALID: i32 = 1006;
    pub const TOKEN_EXPIRED: i32 = 1007;
    pub const TOKEN_REFRESH_TOO_EARLY: i32 = 1008;
    pub const INTERNAL_ERROR: i32 = 5000;
}
