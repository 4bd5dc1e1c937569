//! Permanent-copy cache descriptor and readiness states.
//!
//! The remote service owns the cache lifecycle; the client only observes
//! and reports it. Each status carries a fixed advisory text that is part
//! of the observable contract.

use serde::Deserialize;

/// Provider-side readiness state of a permanent copy.
///
/// Lifecycle: absent → `Creating` → terminal (`Ready`, `Failed`,
/// `Invalid*`) or transient `Retry`. The client never auto-polls; `Retry`
/// and `Creating` must be re-requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStatus {
    /// Copy is materialized and retrievable via a signed URL.
    Ready,
    /// Creation has been requested and is in progress.
    Creating,
    /// The service will attempt creation again.
    Retry,
    /// Creation failed terminally.
    Failed,
    /// The source site does not allow archiving.
    InvalidOrigin,
    /// The source page took too long to load.
    InvalidTimeout,
    /// The source content exceeds the size limit.
    InvalidSize,
}

impl CacheStatus {
    /// The wire name of the status, as the API sends it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Creating => "creating",
            Self::Retry => "retry",
            Self::Failed => "failed",
            Self::InvalidOrigin => "invalid-origin",
            Self::InvalidTimeout => "invalid-timeout",
            Self::InvalidSize => "invalid-size",
        }
    }

    /// Fixed advisory text for the status.
    ///
    /// Every status maps to a distinct, non-empty narrative; none falls
    /// through to a default.
    #[must_use]
    pub fn advisory(self) -> &'static str {
        match self {
            Self::Ready => "Permanent copy is ready.",
            Self::Creating => {
                "Permanent copy is being created. This may take a few moments; check back later to see when it is ready."
            }
            Self::Retry => {
                "Permanent copy creation is being retried. The service will attempt to create the archive again."
            }
            Self::Failed => {
                "Permanent copy creation failed. The webpage content could not be archived."
            }
            Self::InvalidOrigin => {
                "Cannot create permanent copy: invalid origin. The source website does not allow archiving."
            }
            Self::InvalidTimeout => {
                "Cannot create permanent copy: timeout. The webpage took too long to load."
            }
            Self::InvalidSize => {
                "Cannot create permanent copy: size limit exceeded. The webpage content is too large to archive."
            }
        }
    }

    /// All defined statuses, for exhaustiveness checks.
    pub const ALL: [Self; 7] = [
        Self::Ready,
        Self::Creating,
        Self::Retry,
        Self::Failed,
        Self::InvalidOrigin,
        Self::InvalidTimeout,
        Self::InvalidSize,
    ];
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed state of a resource's permanent copy.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheDescriptor {
    /// Readiness state.
    pub status: CacheStatus,
    /// Stored size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Creation timestamp, as sent by the service.
    pub created: Option<String>,
}

impl CacheDescriptor {
    /// Returns true when the copy is retrievable.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == CacheStatus::Ready
    }

    /// Stored size formatted in megabytes with two decimals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_mb(&self) -> String {
        format!("{:.2}", self.size as f64 / (1024.0 * 1024.0))
    }

    /// One-line summary: status, size, creation time.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "status: {}, size: {} MB, created: {}",
            self.status,
            self.size_mb(),
            self.created.as_deref().unwrap_or("unknown")
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cache_status_deserializes_kebab_case() {
        for status in CacheStatus::ALL {
            let parsed: CacheStatus =
                serde_json::from_value(serde_json::Value::String(status.as_str().to_string()))
                    .unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_cache_status_advisories_distinct_and_non_empty() {
        let mut seen = HashSet::new();
        for status in CacheStatus::ALL {
            let advisory = status.advisory();
            assert!(
                !advisory.trim().is_empty(),
                "advisory for {status} must not be empty"
            );
            assert!(
                seen.insert(advisory),
                "advisory for {status} duplicates another status"
            );
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn test_cache_descriptor_size_mb_formatting() {
        let descriptor = CacheDescriptor {
            status: CacheStatus::Ready,
            size: 2_621_440,
            created: Some("2024-05-01T12:00:00Z".to_string()),
        };
        assert_eq!(descriptor.size_mb(), "2.50");
        assert!(descriptor.is_ready());
    }

    #[test]
    fn test_cache_descriptor_summary_includes_all_fields() {
        let descriptor = CacheDescriptor {
            status: CacheStatus::Creating,
            size: 0,
            created: None,
        };
        let summary = descriptor.summary();
        assert!(summary.contains("creating"), "Expected status in: {summary}");
        assert!(summary.contains("0.00"), "Expected size in: {summary}");
        assert!(summary.contains("unknown"), "Expected created fallback in: {summary}");
    }

    #[test]
    fn test_cache_descriptor_defaults_size_when_absent() {
        let descriptor: CacheDescriptor =
            serde_json::from_value(serde_json::json!({"status": "creating"})).unwrap();
        assert_eq!(descriptor.size, 0);
        assert_eq!(descriptor.status, CacheStatus::Creating);
    }
}
