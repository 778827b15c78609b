// upload.rs — `fb upload <file>`: run one upload dialog to completion.
//
// The dialog resolves the goal through the bridge only, the same way the
// data-source screen does when the selection store was never opened there.

use std::path::Path;

use fb_upload::{FileHandle, Notice, SimulatedTransfer, UploadDialog, UploadState};

use super::open_bridge;
use crate::config::{WizardConfig, WizardSettings};

pub fn execute(
    config: &WizardConfig,
    settings: &WizardSettings,
    path: &Path,
    content_type: Option<&str>,
) -> anyhow::Result<()> {
    let bridge = open_bridge(config, settings)?;
    let transfer = SimulatedTransfer::new(settings.upload.delay(), settings.upload.failure_rate);
    let file = FileHandle::from_path(path, content_type)?;

    // Single-threaded event loop: one task drives the whole dialog.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut dialog = UploadDialog::new();
    let result = runtime.block_on(dialog.upload(file, &bridge, &transfer));
    let state = result.map(|state| state.clone());

    for notice in dialog.drain_notices() {
        match notice {
            Notice::Success(msg) => eprintln!("{}", msg),
            Notice::Error(msg) => eprintln!("error: {}", msg),
        }
    }

    match state? {
        UploadState::Success { artifact } => {
            println!("Upload complete: {}", artifact.artifact_id);
            println!("  File:          {}", artifact.file_name);
            println!("  Size:          {} bytes", artifact.size_bytes);
            println!("  Forecast type: {}", artifact.forecast_type);
            Ok(())
        }
        UploadState::Error { message } => anyhow::bail!("upload failed: {}", message),
        other => anyhow::bail!("upload ended in unexpected state: {}", other),
    }
}
