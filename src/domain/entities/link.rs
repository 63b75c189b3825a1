//! Link entity representing a short code to target URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL with its click accounting.
///
/// `code` is unique across the whole store, deleted rows included.
/// `clicks` only grows, and only through redirect resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub target: String,
    pub clicks: i64,
    pub last_clicked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
}

impl Link {
    /// Creates a freshly inserted link: no clicks, not deleted.
    pub fn new(id: i64, code: String, target: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            target,
            clicks: 0,
            last_clicked: None,
            created_at,
            deleted: false,
        }
    }

    /// Returns true if the link can be resolved, fetched and listed.
    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Records one redirect: bumps the counter and the last-clicked time.
    pub fn record_click(&mut self, at: DateTime<Utc>) {
        self.clicks += 1;
        self.last_clicked = Some(at);
    }
}
