use std::fmt;

use serde::{Deserialize, Serialize};

use super::status::{StatusTier, StatusTierResolver};

/// The two dependent verification tiers a rider can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationKind {
    Student,
    Driver,
}

impl VerificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationKind::Student => "student",
            VerificationKind::Driver => "driver",
        }
    }

    /// Document groups collected for this kind, in capture order.
    pub fn layout(self) -> &'static [GroupSpec] {
        match self {
            VerificationKind::Student => &STUDENT_LAYOUT,
            VerificationKind::Driver => &DRIVER_LAYOUT,
        }
    }
}

impl fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Physical documents photographed during verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentGroupName {
    License,
    VehicleRegistration,
    VehicleAuthorization,
    StudentId,
}

impl DocumentGroupName {
    pub const fn as_str(self) -> &'static str {
        match self {
            DocumentGroupName::License => "license",
            DocumentGroupName::VehicleRegistration => "vehicleRegistration",
            DocumentGroupName::VehicleAuthorization => "vehicleAuthorization",
            DocumentGroupName::StudentId => "studentId",
        }
    }

    /// Prefix used when naming transcoded files.
    pub const fn file_stem(self) -> &'static str {
        match self {
            DocumentGroupName::StudentId => "student_id",
            other => other.as_str(),
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            DocumentGroupName::License => "driver license",
            DocumentGroupName::VehicleRegistration => "vehicle registration certificate",
            DocumentGroupName::VehicleAuthorization => "vehicle authorization letter",
            DocumentGroupName::StudentId => "student ID card",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "license" => Some(Self::License),
            "vehicleregistration" => Some(Self::VehicleRegistration),
            "vehicleauthorization" => Some(Self::VehicleAuthorization),
            "studentid" => Some(Self::StudentId),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentGroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSide {
    Front,
    Back,
}

impl DocumentSide {
    pub const BOTH: [DocumentSide; 2] = [DocumentSide::Front, DocumentSide::Back];

    pub const fn as_str(self) -> &'static str {
        match self {
            DocumentSide::Front => "front",
            DocumentSide::Back => "back",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "front" => Some(Self::Front),
            "back" => Some(Self::Back),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one front/back evidence requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: DocumentGroupName,
    pub required: bool,
}

const STUDENT_LAYOUT: [GroupSpec; 1] = [GroupSpec {
    name: DocumentGroupName::StudentId,
    required: true,
}];

const DRIVER_LAYOUT: [GroupSpec; 3] = [
    GroupSpec {
        name: DocumentGroupName::License,
        required: true,
    },
    GroupSpec {
        name: DocumentGroupName::VehicleRegistration,
        required: true,
    },
    GroupSpec {
        name: DocumentGroupName::VehicleAuthorization,
        required: false,
    },
];

/// Canonical JPEG produced by the normalization pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedImage {
    pub uri: String,
    pub mime_type: String,
    pub file_name: String,
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
}

/// Identifier wrapper for authority-side verification records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Most recently fetched snapshot of an authority-owned verification record.
///
/// The backend omits `kind` and sometimes the id, so both are optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    #[serde(alias = "verification_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<VerificationKind>,
    #[serde(rename = "status", default)]
    pub raw_status: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(rename = "type", default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub source_document_groups: Vec<DocumentGroupName>,
}

impl VerificationRecord {
    pub fn tier(&self) -> StatusTier {
        StatusTierResolver::resolve(self.raw_status.as_deref())
    }

    /// Explicit kind when present, otherwise inferred from the record `type`.
    pub fn kind(&self) -> Option<VerificationKind> {
        self.kind.or_else(|| {
            match self.document_type.as_deref()?.trim().to_ascii_lowercase().as_str() {
                "student_id" => Some(VerificationKind::Student),
                "driver_license" | "vehicle_registration" | "driver_documents" => {
                    Some(VerificationKind::Driver)
                }
                _ => None,
            }
        })
    }
}
