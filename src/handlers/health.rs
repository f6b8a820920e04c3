use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Instant;
use utoipa::ToSchema;

use crate::{handlers::AppState, ApiResponse};

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub version: String,
    pub database: ComponentStatus,
    pub database_latency_ms: u64,
    pub materials_in_store: usize,
    pub uptime_secs: u64,
}

/// Tracks application start time for uptime calculation
static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Initialize the start time (call this on application startup)
pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

fn uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

#[utoipa::path(
    get,
    path = "/health",
    summary = "Health check",
    description = "Liveness plus a database ping",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthResponse>),
        (status = 503, description = "Database unreachable", body = ApiResponse<HealthResponse>),
    ),
    tag = "health"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let started = Instant::now();
    let database = match crate::db::check_connection(&state.db).await {
        Ok(()) => ComponentStatus::Up,
        Err(e) => {
            tracing::warn!(error = %e, "health check database ping failed");
            ComponentStatus::Down
        }
    };
    let database_latency_ms = started.elapsed().as_millis() as u64;

    let body = HealthResponse {
        status: database,
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        database_latency_ms,
        materials_in_store: state.store.read().await.len(),
        uptime_secs: uptime_secs(),
    };
    let code = match database {
        ComponentStatus::Up => StatusCode::OK,
        ComponentStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(ApiResponse::success(body)))
}
