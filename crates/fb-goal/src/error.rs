// error.rs — Error types for the selection persistence layer.

use thiserror::Error;

/// Errors raised by a storage slot (durable key-value store or fallback slot).
///
/// None of these ever reach a caller of `SelectionStore::write` or
/// `resolve_selection`: the bridge logs them and degrades to the next tier.
#[derive(Debug, Error)]
pub enum SlotError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize/deserialize slot contents.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The slot cannot be reached right now (poisoned lock, quota, disabled backend).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A goal name that is not one of the fixed forecast goals.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown forecast goal: '{0}'")]
pub struct UnknownGoal(pub String);
