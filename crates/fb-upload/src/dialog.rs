// dialog.rs — UploadDialog: one upload dialog instance and its state machine.
//
// The dialog resolves the goal selection exactly once per upload, at the
// moment a valid file is picked, through a SelectionResolver. It never holds
// a SelectionStore, so nothing here can change the selection.
//
// A transfer is split into `select_file` (validate, transition, capture the
// goal) and `finish` (apply the outcome). Each upload gets a generation
// number; an outcome whose generation is stale, or that arrives after the
// dialog was closed, is dropped without touching the state.

use fb_goal::SelectionResolver;
use uuid::Uuid;

use crate::error::{TransferError, UploadError};
use crate::file::FileHandle;
use crate::state::{ArtifactRef, UploadState};
use crate::transfer::TransferBoundary;

/// A short user-facing message (what the UI shows as a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// A transfer that has been started but not yet finished.
#[derive(Debug)]
pub struct PendingTransfer {
    generation: u64,
    file: FileHandle,
    forecast_type: String,
}

impl PendingTransfer {
    pub fn file(&self) -> &FileHandle {
        &self.file
    }

    /// The primary goal captured when the upload started.
    pub fn forecast_type(&self) -> &str {
        &self.forecast_type
    }
}

/// One upload dialog instance.
#[derive(Debug)]
pub struct UploadDialog {
    instance_id: Uuid,
    state: UploadState,
    file: Option<FileHandle>,
    open: bool,
    generation: u64,
    notices: Vec<Notice>,
}

impl UploadDialog {
    /// Open a fresh dialog in the `Idle` state.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            state: UploadState::Idle,
            file: None,
            open: true,
            generation: 0,
            notices: Vec::new(),
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// The file currently held (uploading or uploaded).
    pub fn file(&self) -> Option<&FileHandle> {
        self.file.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Validate `file`, move to `Uploading`, and capture the goal tag.
    ///
    /// Non-CSV files are rejected with a notice and no state change.
    pub fn select_file(
        &mut self,
        file: FileHandle,
        resolver: &dyn SelectionResolver,
    ) -> Result<PendingTransfer, UploadError> {
        if !self.open {
            return Err(UploadError::DialogClosed);
        }
        if self.state.is_uploading() {
            return Err(UploadError::AlreadyUploading);
        }
        if !file.is_csv() {
            self.notices
                .push(Notice::Error("Please upload a CSV file".to_string()));
            return Err(UploadError::InvalidFileType {
                name: file.name,
                content_type: file.content_type,
            });
        }

        let forecast_type = resolver.resolve_selection().primary_label().to_string();
        self.generation += 1;
        self.state = UploadState::Uploading;
        self.file = Some(file.clone());

        tracing::info!(
            dialog = %self.instance_id,
            file_name = %file.name,
            forecast_type = %forecast_type,
            "upload started"
        );

        Ok(PendingTransfer {
            generation: self.generation,
            file,
            forecast_type,
        })
    }

    /// Apply a transfer outcome. Returns `false` if the outcome was stale
    /// and discarded.
    pub fn finish(
        &mut self,
        pending: PendingTransfer,
        outcome: Result<ArtifactRef, TransferError>,
    ) -> bool {
        if !self.open || pending.generation != self.generation || !self.state.is_uploading() {
            tracing::debug!(
                dialog = %self.instance_id,
                generation = pending.generation,
                "discarding stale upload result"
            );
            return false;
        }

        match outcome {
            Ok(artifact) => {
                tracing::info!(
                    dialog = %self.instance_id,
                    artifact_id = %artifact.artifact_id,
                    "upload succeeded"
                );
                self.notices
                    .push(Notice::Success("File uploaded successfully".to_string()));
                self.state = UploadState::Success { artifact };
            }
            Err(e) => {
                tracing::info!(dialog = %self.instance_id, "upload failed: {}", e);
                self.notices
                    .push(Notice::Error(format!("Upload failed: {}", e.message)));
                self.state = UploadState::Error { message: e.message };
            }
        }
        true
    }

    /// Run a whole upload: select, transfer, finish.
    pub async fn upload<T>(
        &mut self,
        file: FileHandle,
        resolver: &dyn SelectionResolver,
        transfer: &T,
    ) -> Result<&UploadState, UploadError>
    where
        T: TransferBoundary + ?Sized,
    {
        let pending = self.select_file(file, resolver)?;
        let outcome = transfer
            .transfer(pending.file(), pending.forecast_type())
            .await;
        self.finish(pending, outcome);
        Ok(&self.state)
    }

    /// Back to `Idle`, dropping the held file and artifact.
    ///
    /// Ignored while uploading: in-flight transfers cannot be cancelled.
    pub fn retry(&mut self) -> bool {
        if self.state.is_uploading() {
            return false;
        }
        self.state = UploadState::Idle;
        self.file = None;
        self.generation += 1;
        true
    }

    /// User dismissal. Ignored (returns `false`) while uploading.
    pub fn dismiss(&mut self) -> bool {
        if self.state.is_uploading() {
            return false;
        }
        self.close();
        true
    }

    /// The hosting screen went away. Closes regardless of state; a transfer
    /// still in flight completes but its result is discarded.
    pub fn unmount(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.open = false;
        self.generation += 1;
    }

    /// Take all queued notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl Default for UploadDialog {
    fn default() -> Self {
        Self::new()
    }
}
