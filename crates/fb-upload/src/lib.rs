//! # fb-upload
//!
//! The data-upload step of FeatureBox onboarding.
//!
//! An [`UploadDialog`] accepts a CSV file, tags it with the user's primary
//! forecast goal (resolved through [`fb_goal::SelectionResolver`] so the
//! dialog works whether or not a selection store is open), hands it to a
//! [`TransferBoundary`], and tracks the outcome as an [`UploadState`].

pub mod dialog;
pub mod error;
pub mod file;
pub mod state;
pub mod transfer;

pub use dialog::{Notice, PendingTransfer, UploadDialog};
pub use error::{TransferError, UploadError};
pub use file::{FileHandle, CSV_CONTENT_TYPE};
pub use state::{ArtifactRef, UploadState};
pub use transfer::{
    artifact_id, SimulatedTransfer, TransferBoundary, DEFAULT_DELAY, DEFAULT_FAILURE_RATE,
};
