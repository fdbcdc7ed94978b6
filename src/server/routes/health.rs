//! Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::backend::backend_name;
use crate::server::state::SharedState;
use crate::utils::format_duration;
use crate::VERSION;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    /// Uptime for humans ("1h 5m")
    pub uptime: String,
    pub started_at: String,
    pub version: String,
    pub backend: String,
    /// Whether the classifier has been loaded yet
    pub model_loaded: bool,
}

/// GET /health - Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        uptime: format_duration(state.uptime_seconds() as f64),
        started_at: state.started_at_utc.to_rfc3339(),
        version: VERSION.to_string(),
        backend: backend_name().to_string(),
        model_loaded: state.loader.is_loaded(),
    })
}
