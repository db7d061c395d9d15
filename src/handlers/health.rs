use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::state::AppState;

/// GET /api/health
pub async fn get(State(state): State<AppState>) -> impl IntoResponse {
    let (status, database) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "connected"),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    (
        status,
        Json(json!({
            "status": if status.is_success() { "OK" } else { "DEGRADED" },
            "message": "Portfolio API is running",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "environment": state.config.environment.as_str(),
            "database": {
                "backend": state.store.backend(),
                "status": database,
            },
        })),
    )
}
