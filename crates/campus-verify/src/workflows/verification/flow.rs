use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::acquisition::{acquire, Acquisition, CaptureChannel, ImageSource};
use super::authority::VerificationAuthority;
use super::codec::ImageCodec;
use super::documents::DocumentSet;
use super::domain::{DocumentGroupName, DocumentSide, NormalizedImage, VerificationKind};
use super::eligibility::{EligibilityDecision, EligibilityGate};
use super::error::VerificationError;
use super::pipeline::{ImageNormalizationPipeline, NormalizeRequest};
use super::status::StatusTier;
use super::submission::{SubmissionCoordinator, SubmissionOutcome};

/// Caller-owned "submission in progress" flag.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: AtomicBool,
}

impl SubmissionGuard {
    /// Claims the guard. The returned ticket releases it on drop.
    pub fn try_begin(&self) -> Option<SubmissionTicket<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionTicket { guard: self })
    }

    pub fn is_active(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct SubmissionTicket<'a> {
    guard: &'a SubmissionGuard,
}

impl Drop for SubmissionTicket<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.store(false, Ordering::Release);
    }
}

/// What happened to a slot after a capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Recorded {
        image: NormalizedImage,
        replaced: Option<NormalizedImage>,
    },
    Cancelled,
}

/// Result of opening a flow for a kind.
pub enum FlowEntry<C, S> {
    Capture(VerificationFlow<C, S>),
    ViewOnly {
        kind: VerificationKind,
        tier: StatusTier,
    },
}

/// One in-progress verification attempt. All state is owned here; drop the flow once submitted.
pub struct VerificationFlow<C, S> {
    kind: VerificationKind,
    documents: DocumentSet,
    pipeline: Arc<ImageNormalizationPipeline<C>>,
    source: Arc<S>,
    guard: SubmissionGuard,
}

impl<C, S> std::fmt::Debug for VerificationFlow<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationFlow")
            .field("kind", &self.kind)
            .field("documents", &self.documents)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

impl<C, S> std::fmt::Debug for FlowEntry<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowEntry::Capture(flow) => f.debug_tuple("Capture").field(flow).finish(),
            FlowEntry::ViewOnly { kind, tier } => f
                .debug_struct("ViewOnly")
                .field("kind", kind)
                .field("tier", tier)
                .finish(),
        }
    }
}

impl<C, S> VerificationFlow<C, S>
where
    C: ImageCodec + 'static,
    S: ImageSource + 'static,
{
    /// Runs the eligibility gate. Blocked kinds get no document state at all.
    pub fn open(
        kind: VerificationKind,
        student_tier: StatusTier,
        own_tier: StatusTier,
        pipeline: Arc<ImageNormalizationPipeline<C>>,
        source: Arc<S>,
    ) -> Result<FlowEntry<C, S>, VerificationError> {
        match EligibilityGate::evaluate_entry(kind, student_tier, own_tier) {
            EligibilityDecision::Blocked { reason } => {
                info!(kind = %kind, reason = %reason, "verification flow blocked");
                Err(VerificationError::EligibilityBlocked { reason })
            }
            EligibilityDecision::ViewOnly { tier } => Ok(FlowEntry::ViewOnly { kind, tier }),
            EligibilityDecision::Allowed => Ok(FlowEntry::Capture(Self {
                kind,
                documents: DocumentSet::for_kind(kind),
                pipeline,
                source,
                guard: SubmissionGuard::default(),
            })),
        }
    }

    pub fn kind(&self) -> VerificationKind {
        self.kind
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn guard(&self) -> &SubmissionGuard {
        &self.guard
    }

    /// Acquires, normalizes and records one slot. The slot is untouched on any error.
    pub async fn capture(
        &mut self,
        group: DocumentGroupName,
        side: DocumentSide,
        channel: CaptureChannel,
    ) -> Result<CaptureOutcome, VerificationError> {
        if self.documents.group(group).is_none() {
            return Err(VerificationError::UnknownGroup {
                kind: self.kind,
                group,
            });
        }

        let uri = match acquire(self.source.as_ref(), channel).await? {
            Acquisition::Selected { uri } => uri,
            Acquisition::Cancelled => {
                debug!(group = %group, side = %side, "capture cancelled");
                return Ok(CaptureOutcome::Cancelled);
            }
        };

        let image = self
            .pipeline
            .normalize(
                &uri,
                NormalizeRequest {
                    document: group,
                    side,
                },
            )
            .await?;

        let replaced = self.documents.record(group, side, image.clone())?;
        Ok(CaptureOutcome::Recorded { image, replaced })
    }

    /// Submits through `coordinator`. A second call while one is in flight fails fast.
    pub async fn submit<A>(
        &self,
        coordinator: &SubmissionCoordinator<A>,
    ) -> Result<SubmissionOutcome, VerificationError>
    where
        A: VerificationAuthority + 'static,
    {
        let _ticket = self
            .guard
            .try_begin()
            .ok_or(VerificationError::SubmissionInProgress)?;
        coordinator.try_submit(self.kind, &self.documents).await
    }
}
