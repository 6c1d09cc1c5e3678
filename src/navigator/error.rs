use thiserror::Error;

use super::NavigationPolicy;

/// Why a navigation or DOM query failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationErrorKind {
    /// The policy's timeout elapsed.
    Timeout { secs: u64 },
    /// The browser reported an error.
    Failed(String),
}

/// A page failed to load, or a query against a loaded page failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("navigation to {url} failed ({policy} policy): {}", describe(.kind))]
pub struct NavigationError {
    pub url: String,
    pub policy: NavigationPolicy,
    pub kind: NavigationErrorKind,
}

fn describe(kind: &NavigationErrorKind) -> String {
    match kind {
        NavigationErrorKind::Timeout { secs } => format!("timeout after {secs} seconds"),
        NavigationErrorKind::Failed(reason) => reason.clone(),
    }
}

impl NavigationError {
    pub fn timeout(url: impl Into<String>, policy: NavigationPolicy, secs: u64) -> Self {
        Self {
            url: url.into(),
            policy,
            kind: NavigationErrorKind::Timeout { secs },
        }
    }

    pub fn failed(url: impl Into<String>, policy: NavigationPolicy, reason: impl ToString) -> Self {
        Self {
            url: url.into(),
            policy,
            kind: NavigationErrorKind::Failed(reason.to_string()),
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, NavigationErrorKind::Timeout { .. })
    }
}
