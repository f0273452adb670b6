//! Student and driver verification: evidence capture, normalization, gating and submission.

pub mod acquisition;
pub mod authority;
pub mod codec;
pub mod documents;
pub mod domain;
pub mod eligibility;
mod error;
pub mod flow;
pub mod overview;
pub mod pipeline;
pub mod status;
pub mod submission;

#[cfg(test)]
mod tests;

pub use acquisition::{Acquisition, CaptureChannel, ImageSource, PermissionStatus};
pub use authority::{AuthorityError, DriverDocuments, SubmissionReceipt, VerificationAuthority};
pub use codec::{
    CodecError, FileImageCodec, ImageCodec, OutputFormat, TranscodeOptions, TranscodedImage,
};
pub use documents::{DocumentGroup, DocumentPayload, DocumentSet, DocumentSlot};
pub use domain::{
    DocumentGroupName, DocumentSide, GroupSpec, NormalizedImage, RecordId, VerificationKind,
    VerificationRecord,
};
pub use eligibility::{BlockReason, EligibilityDecision, EligibilityGate};
pub use error::VerificationError;
pub use flow::{CaptureOutcome, FlowEntry, SubmissionGuard, SubmissionTicket, VerificationFlow};
pub use overview::{AccountOverview, DriverStanding, HistoryEntry, StudentAction};
pub use pipeline::{
    Clock, ImageNormalizationPipeline, NormalizeRequest, ProcessingError, SystemClock,
    BYTE_BUDGET, FALLBACK_PASS, PRIMARY_PASS,
};
pub use status::{StatusTier, StatusTierResolver};
pub use submission::{SubmissionCoordinator, SubmissionOutcome};
