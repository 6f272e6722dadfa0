/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /api/health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "SwampScheduler backend is running",
///   "status": "healthy",
///   "app": "SwampScheduler",
///   "version": "0.1.0",
///   "database": { "connected": true, "message": "Database connection successful" },
///   "environment": "development"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use swamp_shared::db::pool::health_check as database_health_check;
use tracing::warn;

/// How long the database check may take before it counts as down
const DATABASE_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,

    /// `healthy` or `degraded`
    pub status: String,

    pub app: String,

    /// Application version
    pub version: String,

    pub database: DatabaseHealth,

    /// `development` or `production`
    pub environment: String,
}

/// Database connectivity as seen by the health check
#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub message: String,
}

/// Health check handler
///
/// Always answers 200; a failed database check shows up as `degraded`.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = match tokio::time::timeout(DATABASE_CHECK_TIMEOUT, database_health_check(&state.db)).await {
        Ok(Ok(())) => DatabaseHealth {
            connected: true,
            message: "Database connection successful".to_string(),
        },
        Ok(Err(e)) => {
            warn!(error = %e, "Database health check failed");
            DatabaseHealth {
                connected: false,
                message: "Database connection failed".to_string(),
            }
        }
        Err(_) => {
            warn!("Database health check timed out");
            DatabaseHealth {
                connected: false,
                message: "Database health check timed out".to_string(),
            }
        }
    };

    Ok(Json(HealthResponse {
        message: "SwampScheduler backend is running".to_string(),
        status: if database.connected { "healthy" } else { "degraded" }.to_string(),
        app: "SwampScheduler".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        environment: if state.config.api.production {
            "production"
        } else {
            "development"
        }
        .to_string(),
    }))
}
