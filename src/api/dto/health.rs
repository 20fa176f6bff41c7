//! DTOs for the liveness endpoint.

use serde::Serialize;

/// Liveness check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
    /// RFC 3339 UTC time with millisecond precision.
    pub timestamp: String,
}
