use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use campus_verify::workflows::verification::{
    Acquisition, AuthorityError, DocumentGroupName, DocumentSide, DriverDocuments, ImageSource,
    NormalizedImage, PermissionStatus, RecordId, SubmissionReceipt, VerificationAuthority,
    VerificationKind, VerificationRecord,
};
use chrono::Utc;
use image::{Rgb, RgbImage};

const DRIVER_ACKNOWLEDGEMENT: &str =
    "Driver documents received. Review usually takes one business day.";

#[derive(Default)]
struct AuthorityState {
    student: Option<VerificationRecord>,
    driver: Option<VerificationRecord>,
    history: Vec<VerificationRecord>,
    next_id: u64,
}

/// Process-local stand-in for the remote review service.
#[derive(Default, Clone)]
pub(crate) struct InMemoryVerificationAuthority {
    state: Arc<Mutex<AuthorityState>>,
}

impl InMemoryVerificationAuthority {
    /// Applies a reviewer decision to the current record of `kind`. Returns false when none exists.
    pub(crate) fn decide(
        &self,
        kind: VerificationKind,
        status: &str,
        reason: Option<&str>,
    ) -> bool {
        let mut guard = self.state.lock().expect("authority mutex poisoned");
        let current = match kind {
            VerificationKind::Student => guard.student.as_mut(),
            VerificationKind::Driver => guard.driver.as_mut(),
        };
        let Some(current) = current else {
            return false;
        };
        current.raw_status = Some(status.to_string());
        current.rejection_reason = reason.map(str::to_string);
        let decided = current.clone();

        if let Some(entry) = guard.history.iter_mut().find(|entry| entry.id == decided.id) {
            *entry = decided;
        }
        true
    }

    fn open(&self, kind: VerificationKind, document_type: &str, groups: Vec<DocumentGroupName>) {
        let mut guard = self.state.lock().expect("authority mutex poisoned");
        guard.next_id += 1;
        let record = VerificationRecord {
            id: Some(RecordId(format!("ver-{:04}", guard.next_id))),
            kind: Some(kind),
            raw_status: Some("pending".to_string()),
            rejection_reason: None,
            document_type: Some(document_type.to_string()),
            created_at: Utc::now().to_rfc3339(),
            source_document_groups: groups,
        };
        guard.history.push(record.clone());
        match kind {
            VerificationKind::Student => guard.student = Some(record),
            VerificationKind::Driver => guard.driver = Some(record),
        }
    }
}

#[async_trait]
impl VerificationAuthority for InMemoryVerificationAuthority {
    async fn submit_student_verification(
        &self,
        documents: Vec<NormalizedImage>,
    ) -> Result<SubmissionReceipt, AuthorityError> {
        if documents.len() != 2 {
            return Err(AuthorityError::Server {
                status: 422,
                message: Some("Front and back of the student ID are required.".to_string()),
            });
        }
        self.open(
            VerificationKind::Student,
            "student_id",
            vec![DocumentGroupName::StudentId],
        );
        Ok(SubmissionReceipt::default())
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
        self.open(VerificationKind::Driver, "driver_documents", groups);
        Ok(SubmissionReceipt {
            message: Some(DRIVER_ACKNOWLEDGEMENT.to_string()),
        })
    }

    async fn get_current_student_verification(
        &self,
    ) -> Result<Option<VerificationRecord>, AuthorityError> {
        Ok(self
            .state
            .lock()
            .expect("authority mutex poisoned")
            .student
            .clone())
    }

    async fn get_current_driver_verification(
        &self,
    ) -> Result<Option<VerificationRecord>, AuthorityError> {
        Ok(self
            .state
            .lock()
            .expect("authority mutex poisoned")
            .driver
            .clone())
    }

    async fn get_my_verification_history(&self) -> Result<Vec<VerificationRecord>, AuthorityError> {
        Ok(self
            .state
            .lock()
            .expect("authority mutex poisoned")
            .history
            .clone())
    }
}

/// Picker that serves pre-generated files in order and always grants access.
#[derive(Default)]
pub(crate) struct FixtureImageSource {
    queue: Mutex<VecDeque<String>>,
}

impl FixtureImageSource {
    pub(crate) fn push(&self, uri: String) {
        self.queue
            .lock()
            .expect("picker mutex poisoned")
            .push_back(uri);
    }

    fn next(&self) -> Acquisition {
        match self.queue.lock().expect("picker mutex poisoned").pop_front() {
            Some(uri) => Acquisition::Selected { uri },
            None => Acquisition::Cancelled,
        }
    }
}

#[async_trait]
impl ImageSource for FixtureImageSource {
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

/// Renders a synthetic document photo as PNG and returns its `file://` URI.
pub(crate) fn synthesize_photo(
    dir: &Path,
    group: DocumentGroupName,
    side: DocumentSide,
    width: u32,
    height: u32,
) -> Result<String, std::io::Error> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{group}-{side}.png"));
    let shade = match side {
        DocumentSide::Front => 220u8,
        DocumentSide::Back => 160u8,
    };
    RgbImage::from_fn(width, height, |x, y| {
        let band = ((x / 40 + y / 40) % 2) as u8;
        Rgb([shade, shade.saturating_sub(band * 60), (x % 256) as u8])
    })
    .save(&path)
    .map_err(std::io::Error::other)?;
    Ok(format!("file://{}", path.display()))
}

pub(crate) fn parse_group(raw: &str) -> Result<DocumentGroupName, String> {
    DocumentGroupName::parse(raw).ok_or_else(|| {
        format!(
            "unknown document '{raw}' (expected studentId, license, \
             vehicleRegistration or vehicleAuthorization)"
        )
    })
}

pub(crate) fn parse_side(raw: &str) -> Result<DocumentSide, String> {
    DocumentSide::parse(raw).ok_or_else(|| format!("unknown side '{raw}' (expected front or back)"))
}
