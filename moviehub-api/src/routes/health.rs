/// Liveness probe
///
/// ```text
/// GET /health
///
/// { "status": "healthy", "version": "0.1.0", "database": "connected" }
/// ```
///
/// Always 200; an unreachable database shows up as `"status": "degraded"`.

use crate::app::AppState;
use axum::{extract::State, Json};
use moviehub_shared::db::pool;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: &'static str,
    pub database: DatabaseStatus,
}

impl HealthResponse {
    fn from_database(database: DatabaseStatus) -> Self {
        let status = match database {
            DatabaseStatus::Connected => ServiceStatus::Healthy,
            DatabaseStatus::Disconnected => ServiceStatus::Degraded,
        };

        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match pool::health_check(&state.db).await {
        Ok(()) => DatabaseStatus::Connected,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            DatabaseStatus::Disconnected
        }
    };

    Json(HealthResponse::from_database(database))
}
