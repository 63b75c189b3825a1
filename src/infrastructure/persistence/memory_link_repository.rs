//! In-process implementation of link repository.
//!
//! Used for development runs (`STORAGE_BACKEND=memory`) and handler tests.
//! Nothing survives a restart.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::CodeReusePolicy;
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(Debug, Default)]
struct Table {
    rows: HashMap<String, Link>,
    next_id: i64,
}

impl Table {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Link repository backed by a `HashMap` behind an async `RwLock`.
///
/// Each read-modify-write holds the write guard for its whole duration,
/// which gives the same atomicity as a database transaction: one winner for
/// concurrent creates of a code, no lost click increments.
#[derive(Debug, Default)]
pub struct InMemoryLinkRepository {
    table: RwLock<Table>,
    reuse_policy: CodeReusePolicy,
}

impl InMemoryLinkRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy for codes of soft-deleted links.
    pub fn with_reuse_policy(mut self, reuse_policy: CodeReusePolicy) -> Self {
        self.reuse_policy = reuse_policy;
        self
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, code: &str, target: &str) -> Result<Link, AppError> {
        let mut table = self.table.write().await;

        // A reused code keeps its row id, the way the PostgreSQL upsert does.
        let existing = table.rows.get(code).map(|l| (l.id, l.deleted));
        let id = match existing {
            Some((id, true)) if self.reuse_policy.allows_reuse() => id,
            Some(_) => {
                return Err(AppError::conflict(
                    "Code already exists",
                    json!({ "code": code }),
                ));
            }
            None => table.allocate_id(),
        };

        let link = Link::new(id, code.to_string(), target.to_string(), Utc::now());
        table.rows.insert(code.to_string(), link.clone());

        Ok(link)
    }

    async fn resolve_and_count(&self, code: &str) -> Result<Option<Link>, AppError> {
        let mut table = self.table.write().await;

        let Some(link) = table.rows.get_mut(code).filter(|l| l.is_active()) else {
            return Ok(None);
        };

        let before = link.clone();
        link.record_click(Utc::now());

        Ok(Some(before))
    }

    async fn find_active(&self, code: &str) -> Result<Option<Link>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.get(code).filter(|l| l.is_active()).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.get(code).cloned())
    }

    async fn soft_delete(&self, code: &str) -> Result<bool, AppError> {
        let mut table = self.table.write().await;

        match table.rows.get_mut(code) {
            Some(link) => {
                link.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_active(&self) -> Result<Vec<Link>, AppError> {
        let table = self.table.read().await;

        let mut links: Vec<Link> = table
            .rows
            .values()
            .filter(|l| l.is_active())
            .cloned()
            .collect();
        links.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(links)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
