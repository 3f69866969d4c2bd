//! Health check handler

use axum::{extract::State, response::Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::runtime::http::AnalysisRuntime;

/// Liveness report
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: u64,
    /// Whether `/api/analyze` can reach a provider
    pub provider_configured: bool,
}

/// GET /health - Basic health check endpoint with version info
///
/// A missing provider key is reported but does not make the service unhealthy;
/// demo mode keeps working without one.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(runtime): State<AnalysisRuntime>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "verisnap-http",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now(),
        uptime_seconds: runtime.uptime_seconds(),
        provider_configured: runtime.provider().is_some(),
    })
}
