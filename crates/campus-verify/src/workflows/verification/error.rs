use super::acquisition::CaptureChannel;
use super::authority::AuthorityError;
use super::domain::{DocumentGroupName, VerificationKind};
use super::eligibility::BlockReason;
use super::pipeline::ProcessingError;

const GENERIC_SUBMISSION_FAILURE: &str =
    "unable to submit verification documents, please try again";

/// Errors surfaced by the verification workflow.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("access to the {channel} was denied")]
    PermissionDenied { channel: CaptureChannel },
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error("missing required documents: {}", join_groups(.missing))]
    IncompleteDocuments { missing: Vec<DocumentGroupName> },
    #[error("verification blocked: {reason}")]
    EligibilityBlocked { reason: BlockReason },
    #[error("submission failed: {source}")]
    SubmissionFailed {
        message: Option<String>,
        #[source]
        source: AuthorityError,
    },
    #[error("could not refresh verification status: {0}")]
    RefreshFailed(#[source] AuthorityError),
    #[error("a submission is already in progress")]
    SubmissionInProgress,
    #[error("{group} is not collected for {kind} verification")]
    UnknownGroup {
        kind: VerificationKind,
        group: DocumentGroupName,
    },
}

impl VerificationError {
    pub(crate) fn submission_failed(source: AuthorityError) -> Self {
        Self::SubmissionFailed {
            message: source.server_message().map(str::to_string),
            source,
        }
    }

    /// Whether the user can simply try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VerificationError::PermissionDenied { .. }
                | VerificationError::Processing(_)
                | VerificationError::IncompleteDocuments { .. }
                | VerificationError::SubmissionFailed { .. }
                | VerificationError::SubmissionInProgress
        )
    }

    /// Prerequisite flow to send the user to, if any.
    pub fn suggested_redirect(&self) -> Option<VerificationKind> {
        match self {
            VerificationError::EligibilityBlocked { reason } => Some(reason.redirect()),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            VerificationError::PermissionDenied { channel } => {
                format!("Please allow access to the {channel} to attach documents.")
            }
            VerificationError::Processing(_) => {
                "This photo could not be processed. Please choose another one.".to_string()
            }
            VerificationError::IncompleteDocuments { missing } => {
                let names: Vec<&str> = missing.iter().map(|group| group.description()).collect();
                format!("Please provide both sides of: {}.", names.join(", "))
            }
            VerificationError::EligibilityBlocked { reason } => {
                format!("{}.", capitalize(reason.explanation()))
            }
            VerificationError::SubmissionFailed { message, .. } => message
                .clone()
                .unwrap_or_else(|| GENERIC_SUBMISSION_FAILURE.to_string()),
            VerificationError::RefreshFailed(_) => {
                "Verification status could not be refreshed.".to_string()
            }
            VerificationError::SubmissionInProgress => {
                "Your documents are still being submitted.".to_string()
            }
            VerificationError::UnknownGroup { group, .. } => {
                format!("The {} is not part of this verification.", group.description())
            }
        }
    }
}

fn join_groups(groups: &[DocumentGroupName]) -> String {
    groups
        .iter()
        .map(|group| group.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
