// transfer.rs — TransferBoundary: where an upload leaves the process.
//
// The dialog only relies on the two-outcome contract: an ArtifactRef on
// success, a message on failure. The only implementation here is
// SimulatedTransfer, which stands in for the real upload endpoint by
// sleeping and failing at a configurable rate.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::error::TransferError;
use crate::file::FileHandle;
use crate::state::ArtifactRef;

/// Default simulated network latency.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

/// Default simulated failure probability.
pub const DEFAULT_FAILURE_RATE: f64 = 0.05;

/// Sends a file tagged with its forecast type.
#[async_trait]
pub trait TransferBoundary: Send + Sync {
    async fn transfer(
        &self,
        file: &FileHandle,
        forecast_type: &str,
    ) -> Result<ArtifactRef, TransferError>;
}

/// Fake transport: waits `delay`, then fails with "Network error" with
/// probability `failure_rate`.
#[derive(Debug, Clone)]
pub struct SimulatedTransfer {
    delay: Duration,
    failure_rate: f64,
}

impl SimulatedTransfer {
    pub fn new(delay: Duration, failure_rate: f64) -> Self {
        Self {
            delay,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    /// Completes immediately and never fails.
    pub fn reliable() -> Self {
        Self::new(Duration::ZERO, 0.0)
    }

    /// Completes immediately and always fails.
    pub fn failing() -> Self {
        Self::new(Duration::ZERO, 1.0)
    }
}

impl Default for SimulatedTransfer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY, DEFAULT_FAILURE_RATE)
    }
}

#[async_trait]
impl TransferBoundary for SimulatedTransfer {
    async fn transfer(
        &self,
        file: &FileHandle,
        forecast_type: &str,
    ) -> Result<ArtifactRef, TransferError> {
        tracing::info!(
            file_name = %file.name,
            size_bytes = file.size(),
            forecast_type,
            "uploading file"
        );

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if rand::random::<f64>() < self.failure_rate {
            return Err(TransferError::new("Network error"));
        }

        Ok(ArtifactRef {
            artifact_id: artifact_id(file),
            file_name: file.name.clone(),
            size_bytes: file.size(),
            forecast_type: forecast_type.to_string(),
            uploaded_at: Utc::now(),
        })
    }
}

/// Stable identifier for a file: `artifact-` plus the first 16 hex chars of
/// SHA-256 over the name and contents.
pub fn artifact_id(file: &FileHandle) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file.name.as_bytes());
    hasher.update([0u8]);
    hasher.update(&file.contents);
    let digest = format!("{:x}", hasher.finalize());
    format!("artifact-{}", &digest[..16])
}
