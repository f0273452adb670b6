use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical lifecycle stage derived from an authority status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTier {
    NotSubmitted,
    Pending,
    Verified,
    Rejected,
}

impl StatusTier {
    pub const fn label(self) -> &'static str {
        match self {
            StatusTier::NotSubmitted => "not_submitted",
            StatusTier::Pending => "pending",
            StatusTier::Verified => "verified",
            StatusTier::Rejected => "rejected",
        }
    }

    /// Whether a client-side submit or resubmit is a valid transition.
    pub const fn accepts_submission(self) -> bool {
        matches!(self, StatusTier::NotSubmitted | StatusTier::Rejected)
    }

    /// The tier a record enters once the client submits documents.
    pub const fn after_submission(self) -> Option<StatusTier> {
        if self.accepts_submission() {
            Some(StatusTier::Pending)
        } else {
            None
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, StatusTier::Verified)
    }

    /// Pending and verified records are shown, not re-captured.
    pub const fn is_view_only(self) -> bool {
        matches!(self, StatusTier::Pending | StatusTier::Verified)
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Single source of truth for status synonyms, shared by every verification kind.
pub struct StatusTierResolver;

impl StatusTierResolver {
    pub fn resolve(raw_status: Option<&str>) -> StatusTier {
        let Some(raw) = raw_status else {
            return StatusTier::NotSubmitted;
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "active" | "verified" | "approved" => StatusTier::Verified,
            "pending" => StatusTier::Pending,
            "rejected" | "suspended" => StatusTier::Rejected,
            _ => StatusTier::NotSubmitted,
        }
    }
}
