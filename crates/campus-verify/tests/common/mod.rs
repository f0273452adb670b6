#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use campus_verify::workflows::verification::{
    Acquisition, AuthorityError, DriverDocuments, FileImageCodec, ImageNormalizationPipeline,
    ImageSource, NormalizedImage, PermissionStatus, RecordId, SubmissionReceipt,
    VerificationAuthority, VerificationKind, VerificationRecord,
};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

/// Writes a gradient test photo and returns its `file://` URI.
pub fn write_fixture(dir: &Path, name: &str, width: u32, height: u32) -> String {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
    .save(&path)
    .expect("fixture written");
    format!("file://{}", path.display())
}

/// Writes a landscape JPEG whose EXIF block carries `orientation`, the way phone cameras store
/// rotated shots. Returns its `file://` URI.
pub fn write_oriented_jpeg(
    dir: &Path,
    name: &str,
    width: u32,
    height: u32,
    orientation: u16,
) -> String {
    let pixels = RgbImage::from_fn(width, height, |x, _| Rgb([(x % 256) as u8, 90, 40]));
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, 90)
        .encode_image(&pixels)
        .expect("fixture encodes");

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A\x00\x00\x00\x08");
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let mut segment = b"Exif\x00\x00".to_vec();
    segment.extend_from_slice(&tiff);
    let length = u16::try_from(segment.len() + 2).expect("segment fits");

    let mut jpeg = encoded[..2].to_vec();
    jpeg.extend_from_slice(&[0xFF, 0xE1]);
    jpeg.extend_from_slice(&length.to_be_bytes());
    jpeg.extend_from_slice(&segment);
    jpeg.extend_from_slice(&encoded[2..]);

    let path = dir.join(name);
    std::fs::write(&path, jpeg).expect("fixture written");
    format!("file://{}", path.display())
}

pub fn file_pipeline(output_dir: PathBuf) -> Arc<ImageNormalizationPipeline<FileImageCodec>> {
    Arc::new(ImageNormalizationPipeline::new(Arc::new(
        FileImageCodec::new(output_dir),
    )))
}

/// Photo picker that hands out queued URIs and always grants access.
#[derive(Default)]
pub struct FixturePicker {
    queue: Mutex<VecDeque<String>>,
}

impl FixturePicker {
    pub fn queue(&self, uri: impl Into<String>) {
        self.queue
            .lock()
            .expect("picker mutex poisoned")
            .push_back(uri.into());
    }

    fn next(&self) -> Acquisition {
        match self.queue.lock().expect("picker mutex poisoned").pop_front() {
            Some(uri) => Acquisition::Selected { uri },
            None => Acquisition::Cancelled,
        }
    }
}

#[async_trait::async_trait]
impl ImageSource for FixturePicker {
    async fn request_library_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request_camera_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn pick_from_library(&self) -> Acquisition {
        self.next()
    }

    async fn capture_from_camera(&self) -> Acquisition {
        self.next()
    }
}

#[derive(Default)]
struct DeskState {
    student: Option<VerificationRecord>,
    driver: Option<VerificationRecord>,
    history: Vec<VerificationRecord>,
    driver_payloads: Vec<DriverDocuments>,
    student_payloads: Vec<Vec<NormalizedImage>>,
    next_id: u32,
}

/// Review desk standing in for the remote authority.
/// Reviewers decide through [`ReviewDesk::decide`].
#[derive(Default)]
pub struct ReviewDesk {
    state: Mutex<DeskState>,
}

impl ReviewDesk {
    /// Desk that already holds a student record decided as `status`.
    pub fn with_student(status: &str) -> Self {
        let desk = Self::default();
        desk.open_record(VerificationKind::Student, "student_id");
        desk.decide(VerificationKind::Student, status, None);
        desk
    }

    pub fn decide(&self, kind: VerificationKind, status: &str, reason: Option<&str>) {
        let mut state = self.state.lock().expect("desk mutex poisoned");
        let current = match kind {
            VerificationKind::Student => state.student.as_mut(),
            VerificationKind::Driver => state.driver.as_mut(),
        }
        .expect("record to decide on");
        current.raw_status = Some(status.to_string());
        current.rejection_reason = reason.map(str::to_string);
        let decided = current.clone();

        if let Some(entry) = state
            .history
            .iter_mut()
            .find(|entry| entry.id == decided.id)
        {
            *entry = decided;
        }
    }

    pub fn driver_payloads(&self) -> Vec<DriverDocuments> {
        self.state
            .lock()
            .expect("desk mutex poisoned")
            .driver_payloads
            .clone()
    }

    pub fn student_payloads(&self) -> Vec<Vec<NormalizedImage>> {
        self.state
            .lock()
            .expect("desk mutex poisoned")
            .student_payloads
            .clone()
    }

    fn open_record(&self, kind: VerificationKind, document_type: &str) {
        let mut state = self.state.lock().expect("desk mutex poisoned");
        state.next_id += 1;
        let record = VerificationRecord {
            id: Some(RecordId(format!("{kind}-{}", state.next_id))),
            kind: Some(kind),
            raw_status: Some("pending".to_string()),
            rejection_reason: None,
            document_type: Some(document_type.to_string()),
            created_at: format!("2025-09-{:02}T09:00:00Z", state.next_id),
            source_document_groups: Vec::new(),
        };
        state.history.push(record.clone());
        match kind {
            VerificationKind::Student => state.student = Some(record),
            VerificationKind::Driver => state.driver = Some(record),
        }
    }
}

#[async_trait::async_trait]
impl VerificationAuthority for ReviewDesk {
    async fn submit_student_verification(
        &self,
        documents: Vec<NormalizedImage>,
    ) -> Result<SubmissionReceipt, AuthorityError> {
        self.state
            .lock()
            .expect("desk mutex poisoned")
            .student_payloads
            .push(documents);
        self.open_record(VerificationKind::Student, "student_id");
        Ok(SubmissionReceipt::default())
    }

    async fn submit_driver_verification(
        &self,
        documents: DriverDocuments,
    ) -> Result<SubmissionReceipt, AuthorityError> {
        self.state
            .lock()
            .expect("desk mutex poisoned")
            .driver_payloads
            .push(documents);
        self.open_record(VerificationKind::Driver, "driver_documents");
        Ok(SubmissionReceipt {
            message: Some("Driver documents received.".to_string()),
        })
    }

    async fn get_current_student_verification(
        &self,
    ) -> Result<Option<VerificationRecord>, AuthorityError> {
        Ok(self.state.lock().expect("desk mutex poisoned").student.clone())
    }

    async fn get_current_driver_verification(
        &self,
    ) -> Result<Option<VerificationRecord>, AuthorityError> {
        Ok(self.state.lock().expect("desk mutex poisoned").driver.clone())
    }

    async fn get_my_verification_history(&self) -> Result<Vec<VerificationRecord>, AuthorityError> {
        Ok(self.state.lock().expect("desk mutex poisoned").history.clone())
    }
}
