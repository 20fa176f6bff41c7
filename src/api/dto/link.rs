//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Body of `POST /api/links`.
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub url: String,

    /// Optional custom short code; generated when absent.
    #[serde(default)]
    pub code: Option<String>,
}

/// Body of a successful `POST /api/links`.
#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub code: String,
    pub url: String,
}

/// External representation of a stored link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub code: String,
    pub url: String,
    pub clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            code: link.code,
            url: link.url,
            clicks: link.clicks,
            last_clicked_at: link.last_clicked_at,
            created_at: link.created_at,
        }
    }
}

/// Body of `GET /api/links`.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub links: Vec<LinkResponse>,
}

/// Body of a successful `DELETE /api/links/{code}`.
#[derive(Debug, Serialize)]
pub struct DeleteLinkResponse {
    pub message: String,
    pub code: String,
}
