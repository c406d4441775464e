use axum::{extract::State, Json};

use crate::api::{state::AppState, types::HealthResponse};

/// GET /health -- lightweight liveness probe
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.moderator.snapshot().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        auction: snapshot.status.as_str().to_string(),
        uptime_secs: state.uptime_seconds(),
    })
}
