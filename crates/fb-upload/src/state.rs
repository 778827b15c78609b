// state.rs — UploadState and the artifact reference a successful upload yields.
//
//   Idle ──[csv selected]──► Uploading ──[ok]──► Success { artifact }
//                                      ──[err]─► Error { message }
//   Success | Error ──[retry]──► Idle

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to an uploaded file as returned by the transfer boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Identifier derived from the file name and contents.
    pub artifact_id: String,
    pub file_name: String,
    pub size_bytes: u64,
    /// The primary goal the upload was tagged with.
    pub forecast_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// State of one upload dialog instance. Exactly one holds at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
    Success {
        artifact: ArtifactRef,
    },
    Error {
        message: String,
    },
}

impl UploadState {
    pub fn is_uploading(&self) -> bool {
        matches!(self, UploadState::Uploading)
    }

    pub fn artifact(&self) -> Option<&ArtifactRef> {
        match self {
            UploadState::Success { artifact } => Some(artifact),
            _ => None,
        }
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadState::Idle => write!(f, "idle"),
            UploadState::Uploading => write!(f, "uploading"),
            UploadState::Success { .. } => write!(f, "success"),
            UploadState::Error { .. } => write!(f, "error"),
        }
    }
}
