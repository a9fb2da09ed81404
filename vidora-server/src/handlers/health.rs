use axum::extract::State;
use serde::Serialize;
use tracing::error;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
    response::Envelope,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
}

/// Liveness plus a round trip to the store; 503 when the store is down.
pub async fn healthcheck(State(state): State<AppState>) -> AppResult<Envelope<HealthStatus>> {
    if let Err(err) = state.unit_of_work.health.ping().await {
        error!(error = %err, "health check could not reach the database");
        return Err(AppError::service_unavailable("Database unavailable"));
    }

    Ok(Envelope::ok(
        HealthStatus {
            status: "ok",
            database: "up",
        },
        "Health check passed",
    ))
}
