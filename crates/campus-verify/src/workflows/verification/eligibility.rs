use std::fmt;

use serde::Serialize;

use super::domain::VerificationKind;
use super::status::StatusTier;

/// Why a kind's capture flow may not be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockReason {
    StudentPrerequisiteUnmet,
}

impl BlockReason {
    pub const fn code(self) -> &'static str {
        match self {
            BlockReason::StudentPrerequisiteUnmet => "student-prerequisite-unmet",
        }
    }

    pub const fn explanation(self) -> &'static str {
        match self {
            BlockReason::StudentPrerequisiteUnmet => {
                "student verification must be approved before submitting driver documents"
            }
        }
    }

    /// Flow the user should complete first.
    pub const fn redirect(self) -> VerificationKind {
        match self {
            BlockReason::StudentPrerequisiteUnmet => VerificationKind::Student,
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of the cross-kind dependency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityDecision {
    Allowed,
    /// Existing record is shown instead of opening capture. Not a block.
    ViewOnly { tier: StatusTier },
    Blocked { reason: BlockReason },
}

impl EligibilityDecision {
    pub const fn allowed(&self) -> bool {
        matches!(self, EligibilityDecision::Allowed)
    }

    pub const fn reason(&self) -> Option<BlockReason> {
        match self {
            EligibilityDecision::Blocked { reason } => Some(*reason),
            _ => None,
        }
    }
}

pub struct EligibilityGate;

impl EligibilityGate {
    pub fn evaluate(kind: VerificationKind, student_tier: StatusTier) -> EligibilityDecision {
        match kind {
            VerificationKind::Student if student_tier.is_view_only() => {
                EligibilityDecision::ViewOnly { tier: student_tier }
            }
            VerificationKind::Student => EligibilityDecision::Allowed,
            VerificationKind::Driver if student_tier == StatusTier::Verified => {
                EligibilityDecision::Allowed
            }
            VerificationKind::Driver => EligibilityDecision::Blocked {
                reason: BlockReason::StudentPrerequisiteUnmet,
            },
        }
    }

    /// Full entry check: the prerequisite first, then the kind's own record.
    pub fn evaluate_entry(
        kind: VerificationKind,
        student_tier: StatusTier,
        own_tier: StatusTier,
    ) -> EligibilityDecision {
        let decision = Self::evaluate(kind, student_tier);
        if !decision.allowed() {
            return decision;
        }

        if own_tier.is_view_only() {
            EligibilityDecision::ViewOnly { tier: own_tier }
        } else {
            EligibilityDecision::Allowed
        }
    }
}
