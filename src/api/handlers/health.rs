//! Handler for the liveness endpoint.

use axum::Json;
use chrono::{SecondsFormat, Utc};

use crate::api::dto::health::HealthResponse;

/// Reports that the process is up.
///
/// # Endpoint
///
/// `GET /healthz`
///
/// # Response
///
/// ```json
/// { "ok": true, "version": "0.1.0", "timestamp": "2025-01-01T12:00:00.000Z" }
/// ```
///
/// The check does not touch the store; it answers as long as the server can
/// serve requests.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
