//! Account-level summary of both verification tiers plus the additive history.

use serde::Serialize;
use tracing::warn;

use super::authority::{AuthorityError, VerificationAuthority};
use super::domain::VerificationRecord;
use super::status::StatusTier;

const UNSPECIFIED_REJECTION: &str = "no reason provided";

/// Driver row state. Locked until the student tier is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "tier")]
pub enum DriverStanding {
    Locked,
    Tier(StatusTier),
}

/// What the student row offers the user next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum StudentAction {
    Submit,
    Resubmit { reason: String },
    AwaitReview,
    ViewStatus,
}

/// One row of verification history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub label: String,
    pub tier: StatusTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: String,
}

impl HistoryEntry {
    fn from_record(record: &VerificationRecord) -> Self {
        Self {
            label: history_label(record.document_type.as_deref()),
            tier: record.tier(),
            rejection_reason: record.rejection_reason.clone(),
            created_at: record.created_at.clone(),
        }
    }
}

/// Display label for the wire `type` of a historical record.
pub fn history_label(document_type: Option<&str>) -> String {
    let Some(raw) = document_type.filter(|value| !value.trim().is_empty()) else {
        return "Unknown".to_string();
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "student_id" => "Student ID card".to_string(),
        "driver_license" => "Driver license".to_string(),
        "vehicle_registration" => "Vehicle registration".to_string(),
        "driver_documents" => "Driver documents".to_string(),
        _ => raw.to_string(),
    }
}

/// Latest snapshots of both records and the history list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountOverview {
    student: Option<VerificationRecord>,
    driver: Option<VerificationRecord>,
    history: Vec<VerificationRecord>,
}

impl AccountOverview {
    pub fn new(
        student: Option<VerificationRecord>,
        driver: Option<VerificationRecord>,
        history: Vec<VerificationRecord>,
    ) -> Self {
        Self {
            student,
            driver,
            history,
        }
    }

    /// Fetches both records concurrently, then the history. Failures degrade to empty state.
    pub async fn load<A>(authority: &A) -> Self
    where
        A: VerificationAuthority + ?Sized,
    {
        let (student, driver) = tokio::join!(
            authority.get_current_student_verification(),
            authority.get_current_driver_verification(),
        );

        let history = authority
            .get_my_verification_history()
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "could not load verification history");
                Vec::new()
            });

        Self {
            student: or_absent(student, "student"),
            driver: or_absent(driver, "driver"),
            history,
        }
    }

    pub fn student_record(&self) -> Option<&VerificationRecord> {
        self.student.as_ref()
    }

    pub fn driver_record(&self) -> Option<&VerificationRecord> {
        self.driver.as_ref()
    }

    pub fn student_tier(&self) -> StatusTier {
        tier_of(self.student.as_ref())
    }

    pub fn driver_tier(&self) -> StatusTier {
        tier_of(self.driver.as_ref())
    }

    pub fn driver_standing(&self) -> DriverStanding {
        if self.student_tier() == StatusTier::Verified {
            DriverStanding::Tier(self.driver_tier())
        } else {
            DriverStanding::Locked
        }
    }

    pub fn student_action(&self) -> StudentAction {
        match self.student_tier() {
            StatusTier::NotSubmitted => StudentAction::Submit,
            StatusTier::Pending => StudentAction::AwaitReview,
            StatusTier::Verified => StudentAction::ViewStatus,
            StatusTier::Rejected => StudentAction::Resubmit {
                reason: self
                    .student
                    .as_ref()
                    .and_then(|record| record.rejection_reason.clone())
                    .filter(|reason| !reason.trim().is_empty())
                    .unwrap_or_else(|| UNSPECIFIED_REJECTION.to_string()),
            },
        }
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.iter().map(HistoryEntry::from_record).collect()
    }
}

fn tier_of(record: Option<&VerificationRecord>) -> StatusTier {
    record
        .map(VerificationRecord::tier)
        .unwrap_or(StatusTier::NotSubmitted)
}

fn or_absent(
    read: Result<Option<VerificationRecord>, AuthorityError>,
    kind: &'static str,
) -> Option<VerificationRecord> {
    read.unwrap_or_else(|err| {
        warn!(kind, error = %err, "could not load current verification");
        None
    })
}
