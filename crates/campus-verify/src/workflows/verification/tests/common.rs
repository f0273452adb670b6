use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::workflows::verification::acquisition::{Acquisition, ImageSource, PermissionStatus};
use crate::workflows::verification::authority::{
    AuthorityError, DriverDocuments, SubmissionReceipt, VerificationAuthority,
};
use crate::workflows::verification::codec::{
    fit_longest_edge, CodecError, ImageCodec, TranscodeOptions, TranscodedImage,
};
use crate::workflows::verification::domain::{
    DocumentGroupName, NormalizedImage, RecordId, VerificationKind, VerificationRecord,
};
use crate::workflows::verification::pipeline::{Clock, ImageNormalizationPipeline};

pub(super) const FIXED_MILLIS: i64 = 1_700_000_000_000;
pub(super) const SOURCE_DIMENSIONS: (u32, u32) = (4000, 3000);

pub(super) fn image(name: &str) -> NormalizedImage {
    NormalizedImage {
        uri: format!("file:///media/{name}.jpg"),
        mime_type: "image/jpeg".to_string(),
        file_name: format!("{name}.jpg"),
        byte_size: 250_000,
        width: 1200,
        height: 900,
    }
}

pub(super) fn record(kind: VerificationKind, id: &str, status: &str) -> VerificationRecord {
    VerificationRecord {
        id: Some(RecordId(id.to_string())),
        kind: Some(kind),
        raw_status: Some(status.to_string()),
        rejection_reason: None,
        document_type: Some(
            match kind {
                VerificationKind::Student => "student_id",
                VerificationKind::Driver => "driver_documents",
            }
            .to_string(),
        ),
        created_at: "2025-09-01T10:00:00Z".to_string(),
        source_document_groups: Vec::new(),
    }
}

pub(super) struct FixedClock(pub(super) i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

pub(super) fn pipeline(codec: Arc<FakeCodec>) -> ImageNormalizationPipeline<FakeCodec> {
    ImageNormalizationPipeline::with_clock(codec, Arc::new(FixedClock(FIXED_MILLIS)))
}

/// Codec double returning scripted byte sizes and remembering every call.
#[derive(Default)]
pub(super) struct FakeCodec {
    sizes: Mutex<VecDeque<u64>>,
    calls: Mutex<Vec<(String, TranscodeOptions)>>,
    outputs: Mutex<HashMap<String, (u32, u32)>>,
    discarded: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl FakeCodec {
    pub(super) fn with_sizes(sizes: impl IntoIterator<Item = u64>) -> Self {
        Self {
            sizes: Mutex::new(sizes.into_iter().collect()),
            ..Self::default()
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            failing: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub(super) fn start_failing(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub(super) fn calls(&self) -> Vec<(String, TranscodeOptions)> {
        self.calls.lock().expect("codec mutex poisoned").clone()
    }

    pub(super) fn discarded(&self) -> Vec<String> {
        self.discarded.lock().expect("codec mutex poisoned").clone()
    }
}

#[async_trait::async_trait]
impl ImageCodec for FakeCodec {
    async fn transcode(
        &self,
        uri: &str,
        options: TranscodeOptions,
    ) -> Result<TranscodedImage, CodecError> {
        let mut calls = self.calls.lock().expect("codec mutex poisoned");
        calls.push((uri.to_string(), options));
        let index = calls.len();
        drop(calls);

        if self.failing.load(Ordering::SeqCst) {
            return Err(CodecError::Decode {
                uri: uri.to_string(),
                reason: "unsupported image format".to_string(),
            });
        }

        let mut outputs = self.outputs.lock().expect("codec mutex poisoned");
        let (source_width, source_height) =
            outputs.get(uri).copied().unwrap_or(SOURCE_DIMENSIONS);
        let (width, height) = fit_longest_edge(source_width, source_height, options.longest_edge);
        let output = format!("file:///cache/transcode-{index}.jpg");
        outputs.insert(output.clone(), (width, height));

        let byte_size = self
            .sizes
            .lock()
            .expect("codec mutex poisoned")
            .pop_front()
            .unwrap_or(400_000);

        Ok(TranscodedImage {
            uri: output,
            width,
            height,
            byte_size,
        })
    }

    async fn discard(&self, uri: &str) {
        self.discarded
            .lock()
            .expect("codec mutex poisoned")
            .push(uri.to_string());
    }
}

/// Picker double. Answers permissions from flags and pops scripted acquisitions.
pub(super) struct ScriptedImageSource {
    library: PermissionStatus,
    camera: PermissionStatus,
    picks: Mutex<VecDeque<Acquisition>>,
    prompts: AtomicUsize,
}

impl ScriptedImageSource {
    pub(super) fn granting(uris: &[&str]) -> Self {
        Self {
            library: PermissionStatus::Granted,
            camera: PermissionStatus::Granted,
            picks: Mutex::new(
                uris.iter()
                    .map(|uri| Acquisition::Selected {
                        uri: uri.to_string(),
                    })
                    .collect(),
            ),
            prompts: AtomicUsize::new(0),
        }
    }

    pub(super) fn denying_camera() -> Self {
        Self {
            camera: PermissionStatus::Denied,
            ..Self::granting(&[])
        }
    }

    pub(super) fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    fn next_pick(&self) -> Acquisition {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.picks
            .lock()
            .expect("source mutex poisoned")
            .pop_front()
            .unwrap_or(Acquisition::Cancelled)
    }
}

#[async_trait::async_trait]
impl ImageSource for ScriptedImageSource {
    async fn request_library_permission(&self) -> PermissionStatus {
        self.library
    }

    async fn request_camera_permission(&self) -> PermissionStatus {
        self.camera
    }

    async fn pick_from_library(&self) -> Acquisition {
        self.next_pick()
    }

    async fn capture_from_camera(&self) -> Acquisition {
        self.next_pick()
    }
}

/// Authority double that stores records the way the remote service would.
#[derive(Default)]
pub(super) struct MemoryAuthority {
    student: Mutex<Option<VerificationRecord>>,
    driver: Mutex<Option<VerificationRecord>>,
    history: Mutex<Vec<VerificationRecord>>,
    student_submissions: Mutex<Vec<Vec<NormalizedImage>>>,
    driver_submissions: Mutex<Vec<DriverDocuments>>,
    submit_failure: Mutex<Option<AuthorityError>>,
    receipt_message: Mutex<Option<String>>,
    refresh_failing: AtomicBool,
    sequence: AtomicUsize,
}

impl MemoryAuthority {
    pub(super) fn with_student(record: VerificationRecord) -> Self {
        let authority = Self::default();
        authority.history.lock().expect("authority mutex poisoned").push(record.clone());
        *authority.student.lock().expect("authority mutex poisoned") = Some(record);
        authority
    }

    pub(super) fn fail_submissions_with(&self, err: AuthorityError) {
        *self.submit_failure.lock().expect("authority mutex poisoned") = Some(err);
    }

    pub(super) fn fail_refreshes(&self) {
        self.refresh_failing.store(true, Ordering::SeqCst);
    }

    pub(super) fn reply_with(&self, message: &str) {
        *self.receipt_message.lock().expect("authority mutex poisoned") = Some(message.to_string());
    }

    pub(super) fn student_submissions(&self) -> Vec<Vec<NormalizedImage>> {
        self.student_submissions
            .lock()
            .expect("authority mutex poisoned")
            .clone()
    }

    pub(super) fn driver_submissions(&self) -> Vec<DriverDocuments> {
        self.driver_submissions
            .lock()
            .expect("authority mutex poisoned")
            .clone()
    }

    pub(super) fn submission_count(&self) -> usize {
        self.student_submissions().len() + self.driver_submissions().len()
    }

    fn store(&self, kind: VerificationKind, groups: Vec<DocumentGroupName>) {
        let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let mut created = record(kind, &format!("{kind}-{id}"), "pending");
        created.source_document_groups = groups;
        self.history
            .lock()
            .expect("authority mutex poisoned")
            .push(created.clone());
        let slot = match kind {
            VerificationKind::Student => &self.student,
            VerificationKind::Driver => &self.driver,
        };
        *slot.lock().expect("authority mutex poisoned") = Some(created);
    }

    fn receipt(&self) -> Result<SubmissionReceipt, AuthorityError> {
        if let Some(err) = self
            .submit_failure
            .lock()
            .expect("authority mutex poisoned")
            .clone()
        {
            return Err(err);
        }
        Ok(SubmissionReceipt {
            message: self
                .receipt_message
                .lock()
                .expect("authority mutex poisoned")
                .clone(),
        })
    }

    fn current(
        &self,
        slot: &Mutex<Option<VerificationRecord>>,
    ) -> Result<Option<VerificationRecord>, AuthorityError> {
        if self.refresh_failing.load(Ordering::SeqCst) {
            return Err(AuthorityError::Transport("connection reset".to_string()));
        }
        Ok(slot.lock().expect("authority mutex poisoned").clone())
    }
}

#[async_trait::async_trait]
impl VerificationAuthority for MemoryAuthority {
    async fn submit_student_verification(
        &self,
        documents: Vec<NormalizedImage>,
    ) -> Result<SubmissionReceipt, AuthorityError> {
        self.student_submissions
            .lock()
            .expect("authority mutex poisoned")
            .push(documents);
        let receipt = self.receipt()?;
        self.store(VerificationKind::Student, vec![DocumentGroupName::StudentId]);
        Ok(receipt)
    }

    async fn submit_driver_verification(
        &self,
        documents: DriverDocuments,
    ) -> Result<SubmissionReceipt, AuthorityError> {
        let mut groups = vec![
            DocumentGroupName::License,
            DocumentGroupName::VehicleRegistration,
        ];
        if documents.vehicle_authorization.is_some() {
            groups.push(DocumentGroupName::VehicleAuthorization);
        }
        self.driver_submissions
            .lock()
            .expect("authority mutex poisoned")
            .push(documents);
        let receipt = self.receipt()?;
        self.store(VerificationKind::Driver, groups);
        Ok(receipt)
    }

    async fn get_current_student_verification(
        &self,
    ) -> Result<Option<VerificationRecord>, AuthorityError> {
        self.current(&self.student)
    }

    async fn get_current_driver_verification(
        &self,
    ) -> Result<Option<VerificationRecord>, AuthorityError> {
        self.current(&self.driver)
    }

    async fn get_my_verification_history(&self) -> Result<Vec<VerificationRecord>, AuthorityError> {
        if self.refresh_failing.load(Ordering::SeqCst) {
            return Err(AuthorityError::Transport("connection reset".to_string()));
        }
        Ok(self.history.lock().expect("authority mutex poisoned").clone())
    }
}
