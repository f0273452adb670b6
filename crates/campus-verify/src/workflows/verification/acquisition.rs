use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::VerificationError;

/// Where a photo comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureChannel {
    Library,
    Camera,
}

impl fmt::Display for CaptureChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureChannel::Library => f.write_str("photo library"),
            CaptureChannel::Camera => f.write_str("camera"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Result of a pick or capture prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    Selected { uri: String },
    Cancelled,
}

/// Device-side photo picker and camera.
#[async_trait::async_trait]
pub trait ImageSource: Send + Sync {
    async fn request_library_permission(&self) -> PermissionStatus;
    async fn request_camera_permission(&self) -> PermissionStatus;
    async fn pick_from_library(&self) -> Acquisition;
    async fn capture_from_camera(&self) -> Acquisition;
}

/// Permission prompt followed by pick/capture on the chosen channel.
pub(crate) async fn acquire<S>(
    source: &S,
    channel: CaptureChannel,
) -> Result<Acquisition, VerificationError>
where
    S: ImageSource + ?Sized,
{
    let permission = match channel {
        CaptureChannel::Library => source.request_library_permission().await,
        CaptureChannel::Camera => source.request_camera_permission().await,
    };

    if permission == PermissionStatus::Denied {
        return Err(VerificationError::PermissionDenied { channel });
    }

    Ok(match channel {
        CaptureChannel::Library => source.pick_from_library().await,
        CaptureChannel::Camera => source.capture_from_camera().await,
    })
}
