use axum::{extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AppState, utils::success_to_api_response};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub uptime_secs: i64,
    pub started_at: DateTime<Utc>,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0);
    success_to_api_response(
        "ok",
        HealthResponse {
            uptime_secs,
            started_at: state.started_at,
        },
    )
}
