/// Health check endpoint
use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::response::ApiResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// GET /api/health
///
/// Always answers 200; a broken database connection shows up as
/// `status: "degraded"` rather than an error response.
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthStatus> {
    let database = match trackle_shared::db::pool::health_check(&state.db).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            "disconnected"
        }
    };

    let status = if database == "connected" { "healthy" } else { "degraded" };

    ApiResponse::ok(
        HealthStatus {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
        },
        "OK",
    )
}
