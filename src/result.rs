use serde::{Deserialize, Serialize};

use crate::utils::error_codes;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Envelope shared by every JSON response; the payload fields sit next to
/// `status`, `code` and `msg`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub status: String,
    pub code: i32,
    pub msg: String,
    #[serde(flatten)]
    pub content: T,
}

/// Payload for responses that carry nothing beyond the envelope.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

impl<T> ApiResult<T> {
    pub fn success(msg: impl Into<String>, content: T) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            code: error_codes::SUCCESS,
            msg: msg.into(),
            content,
        }
    }
}

impl ApiResult<Empty> {
    pub fn error(code: i32, msg: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            code,
            msg: msg.into(),
            content: Empty {},
        }
    }
}
