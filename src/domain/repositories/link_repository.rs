//! Repository trait for short link storage.

use crate::domain::entities::Link;
use crate::error::AppError;
use async_trait::async_trait;

/// Durable `code -> link` mapping with atomic read-modify-write operations.
///
/// Every method runs as a single transaction (or a single atomic statement)
/// against the backing store, so callers never coordinate among themselves.
/// Store failures are reported as [`AppError::Internal`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link with zero clicks.
    ///
    /// Concurrent creates with the same code have exactly one winner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code already exists, whether or
    /// not that link is deleted (unless the store's reuse policy allows
    /// taking over deleted codes).
    async fn create(&self, code: &str, target: &str) -> Result<Link, AppError>;

    /// Resolves a code for a redirect and counts the click.
    ///
    /// Within one transaction: reads the link, and if it exists and is not
    /// deleted increments `clicks` and sets `last_clicked` to now. Returns the
    /// link as read before the increment.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if an active link was found and counted
    /// - `Ok(None)` if absent or deleted
    async fn resolve_and_count(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Finds an active link by code. Deleted links are reported as `None`.
    async fn find_active(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by code regardless of its deletion flag.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Marks a link as deleted.
    ///
    /// Returns `Ok(true)` if the link exists (deleting an already-deleted
    /// link succeeds), `Ok(false)` if no link has this code.
    async fn soft_delete(&self, code: &str) -> Result<bool, AppError>;

    /// Lists all non-deleted links, newest first.
    async fn list_active(&self) -> Result<Vec<Link>, AppError>;

    /// Checks that the backing store is reachable.
    async fn health_check(&self) -> bool;
}
