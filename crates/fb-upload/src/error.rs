// error.rs — Error types for the upload flow.

use thiserror::Error;

/// Errors surfaced by the upload dialog before or instead of a transfer.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The selected file is not a CSV. No state transition happens.
    #[error("'{name}' is not a CSV file (content type {content_type})")]
    InvalidFileType { name: String, content_type: String },

    /// A file could not be read from disk.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// `select_file` was called while a transfer is already in flight.
    #[error("an upload is already in progress")]
    AlreadyUploading,

    /// The dialog was dismissed; open a new one to upload again.
    #[error("upload dialog is closed")]
    DialogClosed,
}

/// Failure reported by the transfer boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransferError {
    pub message: String,
}

impl TransferError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
