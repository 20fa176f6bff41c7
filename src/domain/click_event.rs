//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// A redirect that still has to be counted.
///
/// Sent by the redirect handler through a bounded channel to
/// [`crate::domain::click_worker::run_click_worker`], so the redirect
/// response never waits on the counter update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub code: String,
    pub occurred_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            occurred_at: Utc::now(),
        }
    }
}
