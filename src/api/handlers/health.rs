use axum::{extract::State, Json};
use mockable::Clock;
use serde::Serialize;

use crate::api::state::AppState;

const SERVICE_NAME: &str = "mock-hive-api";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
    /// Live claims after expired ones are swept
    pub active_leases: usize,
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = state.clock.utc();
    let active_leases = state.registry.purge_expired(now).await;

    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        timestamp: now.to_rfc3339(),
        active_leases,
    })
}
