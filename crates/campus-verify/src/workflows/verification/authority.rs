use serde::{Deserialize, Serialize};

use super::domain::{NormalizedImage, VerificationRecord};

/// Acknowledgement returned by the authority after accepting documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(default)]
    pub message: Option<String>,
}

/// Grouped driver evidence, each entry ordered `[front, back]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverDocuments {
    pub license: [NormalizedImage; 2],
    pub vehicle_registration: [NormalizedImage; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_authorization: Option<[NormalizedImage; 2]>,
}

/// Remote approval authority. Transport, auth headers and timeouts live behind this seam.
#[async_trait::async_trait]
pub trait VerificationAuthority: Send + Sync {
    async fn submit_student_verification(
        &self,
        documents: Vec<NormalizedImage>,
    ) -> Result<SubmissionReceipt, AuthorityError>;

    async fn submit_driver_verification(
        &self,
        documents: DriverDocuments,
    ) -> Result<SubmissionReceipt, AuthorityError>;

    async fn get_current_student_verification(
        &self,
    ) -> Result<Option<VerificationRecord>, AuthorityError>;

    async fn get_current_driver_verification(
        &self,
    ) -> Result<Option<VerificationRecord>, AuthorityError>;

    async fn get_my_verification_history(&self) -> Result<Vec<VerificationRecord>, AuthorityError>;
}

/// Failure reported by the authority or its transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityError {
    #[error(
        "authority rejected request ({status}): {}",
        .message.as_deref().unwrap_or("no message")
    )]
    Server {
        status: u16,
        message: Option<String>,
    },
    #[error("authority unreachable: {0}")]
    Transport(String),
}

impl AuthorityError {
    /// Human-readable message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AuthorityError::Server { message, .. } => message.as_deref(),
            AuthorityError::Transport(_) => None,
        }
    }
}
