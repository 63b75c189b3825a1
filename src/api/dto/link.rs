//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Request body of `POST /api/links`.
///
/// Both fields are optional at the JSON level so that a missing `target`
/// is reported as a validation error rather than a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateLinkRequest {
    #[serde(default)]
    pub target: Option<String>,

    /// Caller-chosen code; generated when absent or blank.
    #[serde(default)]
    pub code: Option<String>,
}

/// JSON representation of a link.
///
/// Field names are camelCase (`lastClicked`, `createdAt`, `shortUrl`).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: i64,
    pub code: String,
    pub target: String,
    pub clicks: i64,
    pub last_clicked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
    pub short_url: String,
}

impl LinkResponse {
    pub fn new(link: Link, short_url: String) -> Self {
        Self {
            id: link.id,
            code: link.code,
            target: link.target,
            clicks: link.clicks,
            last_clicked: link.last_clicked,
            created_at: link.created_at,
            deleted: link.deleted,
            short_url,
        }
    }
}
