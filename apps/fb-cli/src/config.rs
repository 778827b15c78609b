// config.rs — Where the CLI keeps its state, and the optional settings file.
//
// WizardConfig lays out everything under `.featurebox/` in the project root:
//   local_storage.json  durable key-value slot (selection + debug override)
//   events.jsonl        selection change log
//   config.toml         optional WizardSettings

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use fb_goal::DebugOverride;
use fb_upload::{DEFAULT_DELAY, DEFAULT_FAILURE_RATE};

/// Paths used by the CLI for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    pub project_root: PathBuf,
    pub state_dir: PathBuf,
    pub storage_file: PathBuf,
    pub events_log: PathBuf,
    pub settings_file: PathBuf,
}

impl WizardConfig {
    /// Standard `.featurebox/` layout for a project.
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let root = project_root.as_ref().to_path_buf();
        let state_dir = root.join(".featurebox");
        Self {
            project_root: root,
            storage_file: state_dir.join("local_storage.json"),
            events_log: state_dir.join("events.jsonl"),
            settings_file: state_dir.join("config.toml"),
            state_dir,
        }
    }
}

/// Contents of `.featurebox/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WizardSettings {
    #[serde(default)]
    pub upload: UploadSettings,

    #[serde(default)]
    pub selection: SelectionSettings,
}

/// Simulated transfer behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    /// Simulated latency in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Probability (0.0–1.0) that a transfer fails.
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            failure_rate: default_failure_rate(),
        }
    }
}

impl UploadSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionSettings {
    /// Read `debug_selectedGoal` as a last-resort tier.
    /// Unset means "on in debug builds, off in release builds".
    pub allow_debug_override: Option<bool>,
}

impl SelectionSettings {
    pub fn debug_override(&self) -> DebugOverride {
        match self.allow_debug_override {
            Some(true) => DebugOverride::enabled(),
            Some(false) => DebugOverride::disabled(),
            None => DebugOverride::for_build(),
        }
    }
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY.as_millis() as u64
}

fn default_failure_rate() -> f64 {
    DEFAULT_FAILURE_RATE
}

impl WizardSettings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults if the file is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("ignoring invalid settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
