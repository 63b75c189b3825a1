//! Policy for codes that belong to soft-deleted links.

use std::fmt;
use std::str::FromStr;

/// Whether a create may take over the code of a soft-deleted link.
///
/// [`CodeReusePolicy::Never`] keeps every code bound to its first link
/// forever. With
/// [`CodeReusePolicy::AfterDelete`] a create on a deleted row's code resets
/// that row in place (new target, zero clicks, fresh `created_at`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodeReusePolicy {
    #[default]
    Never,
    AfterDelete,
}

impl CodeReusePolicy {
    pub fn allows_reuse(self) -> bool {
        matches!(self, CodeReusePolicy::AfterDelete)
    }
}

impl FromStr for CodeReusePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "never" => Ok(CodeReusePolicy::Never),
            "after_delete" | "after-delete" => Ok(CodeReusePolicy::AfterDelete),
            other => Err(format!(
                "expected 'never' or 'after_delete', got '{}'",
                other
            )),
        }
    }
}

impl fmt::Display for CodeReusePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeReusePolicy::Never => f.write_str("never"),
            CodeReusePolicy::AfterDelete => f.write_str("after_delete"),
        }
    }
}
