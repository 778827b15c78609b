// debug_override.rs — The diagnostics-only single-goal override channel.
//
// A manually written key (`debug_selectedGoal`) in the durable key space can
// name one goal to use when every real tier is empty. It is never written by
// normal flows. When disabled (the release-build default) it is never read,
// so it cannot mask real data outside diagnostics.

use crate::error::SlotError;
use crate::goal::ForecastGoal;
use crate::kv::{KeyValueStore, DEBUG_OVERRIDE_KEY};

/// Access to the debug override key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugOverride {
    enabled: bool,
}

impl DebugOverride {
    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Enabled in debug builds, disabled in release builds.
    pub fn for_build() -> Self {
        Self {
            enabled: cfg!(debug_assertions),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Read the override goal.
    ///
    /// Returns `None` when the channel is disabled, the key is absent, the
    /// store cannot be read, or the value does not name a known goal.
    pub fn read(&self, kv: &dyn KeyValueStore) -> Option<ForecastGoal> {
        if !self.enabled {
            return None;
        }
        let raw = match kv.get(DEBUG_OVERRIDE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!("debug override unreadable: {}", e);
                return None;
            }
        };
        match raw.parse::<ForecastGoal>() {
            Ok(goal) => Some(goal),
            Err(e) => {
                tracing::debug!("ignoring debug override: {}", e);
                None
            }
        }
    }

    /// Write the override. Works even when reading is disabled so a build
    /// can stage a value for a later diagnostics run.
    pub fn set(&self, kv: &dyn KeyValueStore, goal: ForecastGoal) -> Result<(), SlotError> {
        kv.set(DEBUG_OVERRIDE_KEY, goal.as_str())
    }

    pub fn clear(&self, kv: &dyn KeyValueStore) -> Result<bool, SlotError> {
        kv.remove(DEBUG_OVERRIDE_KEY)
    }
}

impl Default for DebugOverride {
    fn default() -> Self {
        Self::for_build()
    }
}
