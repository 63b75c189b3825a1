//! Link creation, redirect resolution and management service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, DEFAULT_CODE_LENGTH};
use crate::utils::validators::{ensure_valid_code, is_valid_code, is_valid_url};
use metrics::counter;
use serde_json::json;
use tracing::{debug, info, warn};

/// Generated-code attempts before `create` gives up.
pub const MAX_CREATE_ATTEMPTS: usize = 5;

/// Upper bound on a single store operation unless configured otherwise.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Service implementing the link operations on top of a [`LinkRepository`].
///
/// Holds no mutable state of its own: every call re-reads the store inside
/// one repository operation, and all coordination between concurrent callers
/// happens in the store.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
    code_generator: Arc<dyn CodeGenerator>,
    code_length: usize,
    store_timeout: Duration,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        code_generator: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            link_repository,
            code_generator,
            code_length: DEFAULT_CODE_LENGTH,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Sets the length of generated codes (6-8).
    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    /// Sets the timeout applied to every store operation.
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Creates a short link.
    ///
    /// # Code Selection
    ///
    /// - If `requested_code` is given, it is used as-is and a conflict is
    ///   reported to the caller; it is never replaced by a generated code
    /// - Otherwise a random code is generated, retrying with a fresh code on
    ///   collision up to [`MAX_CREATE_ATTEMPTS`] times
    ///
    /// Surrounding whitespace is trimmed from both inputs; an empty requested
    /// code counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the target is empty, not an
    /// absolute http(s) URL, or the requested code is malformed.
    ///
    /// Returns [`AppError::Conflict`] if the requested code already exists.
    ///
    /// Returns [`AppError::Internal`] if every generated code collided, or on
    /// store failure.
    pub async fn create(
        &self,
        target: &str,
        requested_code: Option<&str>,
    ) -> Result<Link, AppError> {
        let target = target.trim();

        if target.is_empty() {
            return Err(AppError::bad_request("target is required", json!({})));
        }

        if !is_valid_url(target) {
            return Err(AppError::bad_request(
                "Invalid target URL (must start with http/https)",
                json!({ "target": target }),
            ));
        }

        match requested_code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => self.create_with_requested_code(code, target).await,
            None => self.create_with_generated_code(target).await,
        }
    }

    async fn create_with_requested_code(&self, code: &str, target: &str) -> Result<Link, AppError> {
        if !is_valid_code(code) {
            return Err(AppError::bad_request(
                "Invalid code format. Must be 6-8 alphanumeric.",
                json!({ "code": code }),
            ));
        }

        let link = self
            .with_timeout("create", self.link_repository.create(code, target))
            .await?;

        counter!("links_created_total").increment(1);
        info!(code = %link.code, target = %link.target, "Created link with requested code");

        Ok(link)
    }

    async fn create_with_generated_code(&self, target: &str) -> Result<Link, AppError> {
        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let code = self.code_generator.generate(self.code_length);

            match self
                .with_timeout("create", self.link_repository.create(&code, target))
                .await
            {
                Ok(link) => {
                    counter!("links_created_total").increment(1);
                    info!(code = %link.code, target = %link.target, attempt, "Created link");
                    return Ok(link);
                }
                Err(e) if e.is_conflict() => {
                    counter!("link_code_collisions_total").increment(1);
                    warn!(code = %code, attempt, "Generated code collided, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions", "attempts": MAX_CREATE_ATTEMPTS }),
        ))
    }

    /// Resolves a code to its target URL and counts the click.
    ///
    /// Malformed codes are rejected before the store is touched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed codes,
    /// [`AppError::NotFound`] if no active link has this code, and
    /// [`AppError::Internal`] on store failure or timeout.
    pub async fn redirect(&self, code: &str) -> Result<String, AppError> {
        ensure_valid_code(code)?;

        let link = self
            .with_timeout(
                "resolve_and_count",
                self.link_repository.resolve_and_count(code),
            )
            .await?
            .ok_or_else(|| link_not_found(code))?;

        counter!("link_redirects_total").increment(1);
        debug!(code, clicks = link.clicks + 1, "Resolved redirect");

        Ok(link.target)
    }

    /// Retrieves an active link by code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed codes and
    /// [`AppError::NotFound`] if the link is absent or deleted.
    pub async fn get(&self, code: &str) -> Result<Link, AppError> {
        ensure_valid_code(code)?;

        self.with_timeout("find_active", self.link_repository.find_active(code))
            .await?
            .ok_or_else(|| link_not_found(code))
    }

    /// Retrieves a link by code including deleted ones, for audit.
    pub async fn inspect(&self, code: &str) -> Result<Link, AppError> {
        ensure_valid_code(code)?;

        self.with_timeout("find_by_code", self.link_repository.find_by_code(code))
            .await?
            .ok_or_else(|| link_not_found(code))
    }

    /// Soft-deletes a link. Deleting an already-deleted link succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed codes and
    /// [`AppError::NotFound`] if no link has this code.
    pub async fn remove(&self, code: &str) -> Result<(), AppError> {
        ensure_valid_code(code)?;

        let existed = self
            .with_timeout("soft_delete", self.link_repository.soft_delete(code))
            .await?;

        if !existed {
            return Err(link_not_found(code));
        }

        info!(code, "Soft-deleted link");
        Ok(())
    }

    /// Lists active links, newest first.
    pub async fn list(&self) -> Result<Vec<Link>, AppError> {
        self.with_timeout("list_active", self.link_repository.list_active())
            .await
    }

    /// Returns whether the store answers within the store timeout.
    pub async fn health_check(&self) -> bool {
        tokio::time::timeout(self.store_timeout, self.link_repository.health_check())
            .await
            .unwrap_or(false)
    }

    /// Runs a store operation under the configured timeout.
    ///
    /// A timed-out operation is dropped; a dropped database transaction rolls
    /// back, so nothing is partially applied.
    async fn with_timeout<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .unwrap_or_else(|_| {
                Err(AppError::internal(
                    "Store operation timed out",
                    json!({
                        "operation": operation,
                        "timeout_ms": self.store_timeout.as_millis() as u64,
                    }),
                ))
            })
    }
}

fn link_not_found(code: &str) -> AppError {
    AppError::not_found("Not found", json!({ "code": code }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::utils::code_generator::MockCodeGenerator;
    use async_trait::async_trait;
    use chrono::Utc;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshot};
    use std::collections::HashMap;

    fn create_test_link(id: i64, code: &str, target: &str) -> Link {
        Link::new(id, code.to_string(), target.to_string(), Utc::now())
    }

    fn conflict(code: &str) -> AppError {
        AppError::conflict("Code already exists", json!({ "code": code }))
    }

    fn service(repo: MockLinkRepository, generator: MockCodeGenerator) -> LinkService {
        LinkService::new(Arc::new(repo), Arc::new(generator))
    }

    fn sequential_generator() -> MockCodeGenerator {
        let mut generator = MockCodeGenerator::new();
        let mut n = 0;
        generator.expect_generate().returning(move |_| {
            n += 1;
            format!("code{n:02}")
        });
        generator
    }

    #[tokio::test]
    async fn test_create_with_generated_code() {
        let mut repo = MockLinkRepository::new();
        let mut generator = MockCodeGenerator::new();

        generator
            .expect_generate()
            .withf(|length| *length == DEFAULT_CODE_LENGTH)
            .times(1)
            .returning(|_| "abc123".to_string());

        repo.expect_create()
            .withf(|code, target| code == "abc123" && target == "https://example.com")
            .times(1)
            .returning(|code, target| Ok(create_test_link(1, code, target)));

        let link = service(repo, generator)
            .create("https://example.com", None)
            .await
            .unwrap();

        assert_eq!(link.code, "abc123");
        assert_eq!(link.target, "https://example.com");
        assert_eq!(link.clicks, 0);
    }

    #[tokio::test]
    async fn test_create_uses_configured_code_length() {
        let mut repo = MockLinkRepository::new();
        let mut generator = MockCodeGenerator::new();

        generator
            .expect_generate()
            .withf(|length| *length == 8)
            .times(1)
            .returning(|_| "abcd1234".to_string());
        repo.expect_create()
            .times(1)
            .returning(|code, target| Ok(create_test_link(1, code, target)));

        let link = service(repo, generator)
            .with_code_length(8)
            .create("https://example.com", None)
            .await
            .unwrap();

        assert_eq!(link.code, "abcd1234");
    }

    #[tokio::test]
    async fn test_create_trims_inputs() {
        let mut repo = MockLinkRepository::new();

        repo.expect_create()
            .withf(|code, target| code == "mycode12" && target == "https://example.com")
            .times(1)
            .returning(|code, target| Ok(create_test_link(1, code, target)));

        let result = service(repo, MockCodeGenerator::new())
            .create("  https://example.com \n", Some(" mycode12 "))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_empty_requested_code_generates_one() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .withf(|code, _| code == "code01")
            .times(1)
            .returning(|code, target| Ok(create_test_link(1, code, target)));

        let link = service(repo, sequential_generator())
            .create("https://example.com", Some("   "))
            .await
            .unwrap();

        assert_eq!(link.code, "code01");
    }

    #[tokio::test]
    async fn test_create_empty_target() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(0);

        let err = service(repo, MockCodeGenerator::new())
            .create("   ", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.to_string(), "target is required");
    }

    #[tokio::test]
    async fn test_create_rejects_non_http_target() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(0);

        let err = service(repo, MockCodeGenerator::new())
            .create("ftp://bad.com", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert!(err.to_string().contains("Invalid target URL"));
    }

    #[tokio::test]
    async fn test_create_rejects_short_requested_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(0);

        let err = service(repo, MockCodeGenerator::new())
            .create("https://a.com", Some("ab"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert!(err.to_string().contains("6-8 alphanumeric"));
    }

    #[tokio::test]
    async fn test_create_requested_code_conflict_is_not_retried() {
        let mut repo = MockLinkRepository::new();
        let mut generator = MockCodeGenerator::new();

        generator.expect_generate().times(0);
        repo.expect_create()
            .withf(|code, _| code == "taken123")
            .times(1)
            .returning(|code, _| Err(conflict(code)));

        let err = service(repo, generator)
            .create("https://example.com", Some("taken123"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "Code already exists");
    }

    #[tokio::test]
    async fn test_create_retries_on_collision() {
        let mut repo = MockLinkRepository::new();

        repo.expect_create()
            .withf(|code, _| code == "code01")
            .times(1)
            .returning(|code, _| Err(conflict(code)));
        repo.expect_create()
            .withf(|code, _| code == "code02")
            .times(1)
            .returning(|code, target| Ok(create_test_link(2, code, target)));

        let link = service(repo, sequential_generator())
            .create("https://example.com", None)
            .await
            .unwrap();

        assert_eq!(link.code, "code02");
    }

    #[tokio::test]
    async fn test_create_fails_after_exhausting_attempts() {
        let mut repo = MockLinkRepository::new();

        repo.expect_create()
            .times(MAX_CREATE_ATTEMPTS)
            .returning(|code, _| Err(conflict(code)));

        let err = service(repo, sequential_generator())
            .create("https://example.com", None)
            .await
            .unwrap_err();

        assert!(err.is_internal());
        assert_eq!(err.to_string(), "Failed to generate unique code");
    }

    #[tokio::test]
    async fn test_create_store_error_is_not_retried() {
        let mut repo = MockLinkRepository::new();

        repo.expect_create()
            .times(1)
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let err = service(repo, sequential_generator())
            .create("https://example.com", None)
            .await
            .unwrap_err();

        assert!(err.is_internal());
        assert_eq!(err.to_string(), "Database error");
    }

    #[tokio::test]
    async fn test_redirect_returns_target() {
        let mut repo = MockLinkRepository::new();

        repo.expect_resolve_and_count()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|code| Ok(Some(create_test_link(1, code, "https://example.com"))));

        let target = service(repo, MockCodeGenerator::new())
            .redirect("abc123")
            .await
            .unwrap();

        assert_eq!(target, "https://example.com");
    }

    #[tokio::test]
    async fn test_redirect_rejects_malformed_code_before_store() {
        let mut repo = MockLinkRepository::new();
        repo.expect_resolve_and_count().times(0);

        let err = service(repo, MockCodeGenerator::new())
            .redirect("zzz")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_redirect_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_resolve_and_count()
            .times(1)
            .returning(|_| Ok(None));

        let err = service(repo, MockCodeGenerator::new())
            .redirect("abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_not_found_for_deleted() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active()
            .withf(|code| code == "gone12")
            .times(1)
            .returning(|_| Ok(None));

        let err = service(repo, MockCodeGenerator::new())
            .get("gone12")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_rejects_malformed_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active().times(0);

        let err = service(repo, MockCodeGenerator::new())
            .get("bad-code")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_inspect_returns_deleted_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().times(1).returning(|code| {
            let mut link = create_test_link(1, code, "https://example.com");
            link.deleted = true;
            Ok(Some(link))
        });

        let link = service(repo, MockCodeGenerator::new())
            .inspect("gone12")
            .await
            .unwrap();

        assert!(link.deleted);
    }

    #[tokio::test]
    async fn test_remove() {
        let mut repo = MockLinkRepository::new();
        repo.expect_soft_delete()
            .withf(|code| code == "abc123")
            .times(2)
            .returning(|_| Ok(true));

        let service = service(repo, MockCodeGenerator::new());

        assert!(service.remove("abc123").await.is_ok());
        assert!(service.remove("abc123").await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_soft_delete().times(1).returning(|_| Ok(false));

        let err = service(repo, MockCodeGenerator::new())
            .remove("abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_delegates_to_store() {
        let mut repo = MockLinkRepository::new();
        repo.expect_list_active().times(1).returning(|| {
            Ok(vec![
                create_test_link(2, "second", "https://two.com"),
                create_test_link(1, "first1", "https://one.com"),
            ])
        });

        let links = service(repo, MockCodeGenerator::new()).list().await.unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].code, "second");
    }

    /// Store whose every operation hangs forever.
    struct StalledRepository;

    #[async_trait]
    impl LinkRepository for StalledRepository {
        async fn create(&self, _code: &str, _target: &str) -> Result<Link, AppError> {
            std::future::pending().await
        }

        async fn resolve_and_count(&self, _code: &str) -> Result<Option<Link>, AppError> {
            std::future::pending().await
        }

        async fn find_active(&self, _code: &str) -> Result<Option<Link>, AppError> {
            std::future::pending().await
        }

        async fn find_by_code(&self, _code: &str) -> Result<Option<Link>, AppError> {
            std::future::pending().await
        }

        async fn soft_delete(&self, _code: &str) -> Result<bool, AppError> {
            std::future::pending().await
        }

        async fn list_active(&self) -> Result<Vec<Link>, AppError> {
            std::future::pending().await
        }

        async fn health_check(&self) -> bool {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_store_timeout_is_internal_error() {
        let service = LinkService::new(Arc::new(StalledRepository), Arc::new(sequential_generator()))
            .with_store_timeout(Duration::from_millis(20));

        let err = service.redirect("abc123").await.unwrap_err();
        assert!(err.is_internal());
        assert_eq!(err.to_string(), "Store operation timed out");

        let err = service
            .create("https://example.com", None)
            .await
            .unwrap_err();
        assert!(err.is_internal());

        assert!(!service.health_check().await);
    }

    fn counters(snapshot: Snapshot) -> HashMap<String, u64> {
        snapshot
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| match value {
                DebugValue::Counter(v) => Some((key.key().name().to_string(), v)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_counters_are_recorded() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .withf(|code, _| code == "code01")
            .times(1)
            .returning(|code, _| Err(conflict(code)));
        repo.expect_create()
            .withf(|code, _| code == "code02")
            .times(1)
            .returning(|code, target| Ok(create_test_link(1, code, target)));
        repo.expect_resolve_and_count()
            .times(1)
            .returning(|code| Ok(Some(create_test_link(1, code, "https://example.com"))));

        let service = service(repo, sequential_generator());

        metrics::with_local_recorder(&recorder, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();

            runtime.block_on(async {
                service.create("https://example.com", None).await.unwrap();
                service.redirect("code02").await.unwrap();
            });
        });

        let counters = counters(snapshotter.snapshot());

        assert_eq!(counters["links_created_total"], 1);
        assert_eq!(counters["link_code_collisions_total"], 1);
        assert_eq!(counters["link_redirects_total"], 1);
    }
}
