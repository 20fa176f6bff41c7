//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A stored short link together with its click counters.
///
/// `code` is the unique key. `clicks` only grows, and `last_clicked_at`
/// stays `None` until the first successful redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub code: String,
    pub url: String,
    pub clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        code: String,
        url: String,
        clicks: i64,
        last_clicked_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            url,
            clicks,
            last_clicked_at,
            created_at,
        }
    }
}

/// Input data for creating a new link.
///
/// The store fills in `clicks = 0` and `created_at = now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: String,
    pub url: String,
}

impl NewLink {
    pub fn new(code: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            url: url.into(),
        }
    }
}
