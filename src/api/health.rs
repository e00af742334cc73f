//! Liveness and readiness endpoints

use std::time::Instant;

use axum::{extract::State, http::StatusCode};
use serde::Serialize;
use tracing::warn;

use super::state::AppState;
use crate::api::types::Json;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageStatus>,
}

/// Result of a round trip to user storage
#[derive(Debug, Serialize)]
pub struct StorageStatus {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<usize>,
    pub latency_ms: u64,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: VERSION,
        storage: None,
    })
}

/// GET /ready
///
/// 503 while user storage cannot be counted. The storage error is logged,
/// never returned.
pub async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = Instant::now();
    let counted = state.users_service.count().await;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (code, status, users) = match counted {
        Ok(users) => (StatusCode::OK, "ok", Some(users)),
        Err(e) => {
            warn!(error = %e, "User storage is not ready");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable", None)
        }
    };

    let response = HealthResponse {
        status,
        version: VERSION,
        storage: Some(StorageStatus {
            reachable: users.is_some(),
            users,
            latency_ms,
        }),
    };

    (code, Json(response))
}

/// GET /live
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}
