pub mod goals;
pub mod upload;

use fb_goal::{
    FallbackSlot, JsonFileKv, JsonlEventLog, PersistenceBridge, SelectionStore, SelectionSubscriber,
};

use crate::config::{WizardConfig, WizardSettings};

/// Bridge over the project's durable storage and the process-wide fallback.
pub fn open_bridge(
    config: &WizardConfig,
    settings: &WizardSettings,
) -> anyhow::Result<PersistenceBridge> {
    let durable = JsonFileKv::open(&config.storage_file)?;
    Ok(PersistenceBridge::new(durable, FallbackSlot::global())
        .with_debug_override(settings.selection.debug_override()))
}

/// A hydrated store that logs hydration and every change to the project's
/// event log.
pub fn open_store(
    config: &WizardConfig,
    settings: &WizardSettings,
) -> anyhow::Result<SelectionStore> {
    let log: Box<dyn SelectionSubscriber> = Box::new(JsonlEventLog::open(&config.events_log)?);
    Ok(SelectionStore::open_with(open_bridge(config, settings)?, vec![log]))
}
