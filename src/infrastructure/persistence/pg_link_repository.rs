//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::CodeReusePolicy;
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use serde_json::json;

/// Row shape of the `links` table.
#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    target: String,
    clicks: i64,
    last_clicked: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    deleted: bool,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            code: row.code,
            target: row.target,
            clicks: row.clicks,
            last_clicked: row.last_clicked,
            created_at: row.created_at,
            deleted: row.deleted,
        }
    }
}

/// PostgreSQL repository for link storage and click accounting.
///
/// Uniqueness is enforced by the `links_code_key` constraint. Click
/// accounting locks the row with `SELECT ... FOR UPDATE` so concurrent
/// redirects on one code serialize on the increment.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
    reuse_policy: CodeReusePolicy,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            reuse_policy: CodeReusePolicy::default(),
        }
    }

    /// Sets the policy for codes of soft-deleted links.
    pub fn with_reuse_policy(mut self, reuse_policy: CodeReusePolicy) -> Self {
        self.reuse_policy = reuse_policy;
        self
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, code: &str, target: &str) -> Result<Link, AppError> {
        // With reuse disabled the WHERE clause never matches, so an existing
        // code always yields no row.
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (code, target)
            VALUES ($1, $2)
            ON CONFLICT (code) DO UPDATE
                SET target = EXCLUDED.target,
                    clicks = 0,
                    last_clicked = NULL,
                    created_at = NOW(),
                    deleted = FALSE
                WHERE links.deleted AND $3
            RETURNING id, code, target, clicks, last_clicked, created_at, deleted
            "#,
        )
        .bind(code)
        .bind(target)
        .bind(self.reuse_policy.allows_reuse())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Link::from).ok_or_else(|| {
            AppError::conflict("Code already exists", json!({ "code": code }))
        })
    }

    async fn resolve_and_count(&self, code: &str) -> Result<Option<Link>, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, clicks, last_clicked, created_at, deleted
            FROM links
            WHERE code = $1
            FOR UPDATE
            "#,
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row.filter(|r| !r.deleted) else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE links
            SET clicks = clicks + 1,
                last_clicked = NOW()
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(row.into()))
    }

    async fn find_active(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, clicks, last_clicked, created_at, deleted
            FROM links
            WHERE code = $1 AND NOT deleted
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, clicks, last_clicked, created_at, deleted
            FROM links
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn soft_delete(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE links SET deleted = TRUE WHERE code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_active(&self) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, clicks, last_clicked, created_at, deleted
            FROM links
            WHERE NOT deleted
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await
            .is_ok()
    }
}
