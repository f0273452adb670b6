use std::sync::Arc;

use tracing::{info, warn};

use super::authority::{
    AuthorityError, DriverDocuments, SubmissionReceipt, VerificationAuthority,
};
use super::documents::{DocumentPayload, DocumentSet};
use super::domain::{DocumentGroupName, NormalizedImage, VerificationKind, VerificationRecord};
use super::error::VerificationError;
use super::status::StatusTier;

const DEFAULT_ACKNOWLEDGEMENT: &str =
    "Documents submitted for review. An administrator will respond within 1-2 business days.";

/// Result of a dispatched submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub kind: VerificationKind,
    pub message: String,
    /// Best-effort re-read after dispatch. `None` when the read failed or found nothing.
    pub refreshed: Option<VerificationRecord>,
}

impl SubmissionOutcome {
    pub fn tier(&self) -> Option<StatusTier> {
        self.refreshed.as_ref().map(VerificationRecord::tier)
    }
}

/// Validates, dispatches and reconciles one verification submission.
pub struct SubmissionCoordinator<A> {
    authority: Arc<A>,
}

impl<A> SubmissionCoordinator<A>
where
    A: VerificationAuthority + 'static,
{
    pub fn new(authority: Arc<A>) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> &Arc<A> {
        &self.authority
    }

    /// Submits `documents` for `kind`. Exactly one dispatch call, never retried.
    pub async fn try_submit(
        &self,
        kind: VerificationKind,
        documents: &DocumentSet,
    ) -> Result<SubmissionOutcome, VerificationError> {
        let missing = if documents.kind() == kind {
            documents.missing_required()
        } else {
            kind.layout()
                .iter()
                .filter(|spec| spec.required)
                .map(|spec| spec.name)
                .collect()
        };
        if !missing.is_empty() {
            return Err(VerificationError::IncompleteDocuments { missing });
        }

        let payload = documents.assemble_payload();
        info!(
            kind = %kind,
            groups = ?payload.keys().collect::<Vec<_>>(),
            "dispatching verification documents"
        );
        let request = Dispatch::prepare(kind, payload)?;

        let receipt = self
            .dispatch(request)
            .await
            .map_err(VerificationError::submission_failed)?;

        let refreshed = self.refresh(kind).await;
        let message = receipt
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ACKNOWLEDGEMENT.to_string());

        Ok(SubmissionOutcome {
            kind,
            message,
            refreshed,
        })
    }

    async fn dispatch(&self, request: Dispatch) -> Result<SubmissionReceipt, AuthorityError> {
        match request {
            Dispatch::Student(documents) => {
                self.authority.submit_student_verification(documents).await
            }
            Dispatch::Driver(documents) => {
                self.authority.submit_driver_verification(documents).await
            }
        }
    }

    async fn refresh(&self, kind: VerificationKind) -> Option<VerificationRecord> {
        let read = match kind {
            VerificationKind::Student => self.authority.get_current_student_verification().await,
            VerificationKind::Driver => self.authority.get_current_driver_verification().await,
        };

        match read {
            Ok(record) => record,
            Err(source) => {
                let err = VerificationError::RefreshFailed(source);
                warn!(kind = %kind, error = %err, "submission accepted but status refresh failed");
                None
            }
        }
    }
}

/// Kind-specific request shape expected by the authority.
enum Dispatch {
    Student(Vec<NormalizedImage>),
    Driver(DriverDocuments),
}

impl Dispatch {
    fn prepare(
        kind: VerificationKind,
        mut payload: DocumentPayload,
    ) -> Result<Self, VerificationError> {
        match kind {
            VerificationKind::Student => {
                let student_id = payload.remove(&DocumentGroupName::StudentId).ok_or(
                    VerificationError::IncompleteDocuments {
                        missing: vec![DocumentGroupName::StudentId],
                    },
                )?;
                Ok(Dispatch::Student(Vec::from(student_id)))
            }
            VerificationKind::Driver => {
                let license = payload.remove(&DocumentGroupName::License);
                let vehicle_registration = payload.remove(&DocumentGroupName::VehicleRegistration);
                match (license, vehicle_registration) {
                    (Some(license), Some(vehicle_registration)) => {
                        Ok(Dispatch::Driver(DriverDocuments {
                            license,
                            vehicle_registration,
                            vehicle_authorization: payload
                                .remove(&DocumentGroupName::VehicleAuthorization),
                        }))
                    }
                    (license, registration) => {
                        let mut missing = Vec::new();
                        if license.is_none() {
                            missing.push(DocumentGroupName::License);
                        }
                        if registration.is_none() {
                            missing.push(DocumentGroupName::VehicleRegistration);
                        }
                        Err(VerificationError::IncompleteDocuments { missing })
                    }
                }
            }
        }
    }
}
