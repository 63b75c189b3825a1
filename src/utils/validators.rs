//! Predicates deciding whether a short code or target URL is well-formed.
//!
//! These functions are pure: no state, no I/O, and they never panic on
//! arbitrary input. The service uses them to reject bad input before any
//! store access.

use crate::error::AppError;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;
use url::Url;

/// Shortest accepted code.
pub const MIN_CODE_LENGTH: usize = 6;

/// Longest accepted code.
pub const MAX_CODE_LENGTH: usize = 8;

/// Compiled pattern for short codes: 6-8 ASCII alphanumerics, nothing else.
static CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{6,8}$").unwrap());

/// Returns `true` if `candidate` is an absolute `http` or `https` URL.
///
/// Relative URLs, missing schemes and malformed syntax all yield `false`.
///
/// # Examples
///
/// ```
/// use tinylink::utils::validators::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/path?q=1"));
/// assert!(!is_valid_url("ftp://example.com"));
/// assert!(!is_valid_url("/relative/path"));
/// ```
pub fn is_valid_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Returns `true` if `candidate` is 6-8 characters from `[A-Za-z0-9]`.
///
/// # Examples
///
/// ```
/// use tinylink::utils::validators::is_valid_code;
///
/// assert!(is_valid_code("aB3dE9"));
/// assert!(!is_valid_code("zzz"));
/// assert!(!is_valid_code("abc-123"));
/// ```
pub fn is_valid_code(candidate: &str) -> bool {
    CODE_REGEX.is_match(candidate)
}

/// Rejects codes failing [`is_valid_code`] with [`AppError::Validation`].
pub fn ensure_valid_code(candidate: &str) -> Result<(), AppError> {
    if is_valid_code(candidate) {
        return Ok(());
    }

    Err(AppError::bad_request(
        "Invalid code format",
        json!({ "code": candidate }),
    ))
}
