//! # fb-goal
//!
//! Forecast goal selection state for FeatureBox onboarding.
//!
//! The user's goal selection has to survive screens mounting in any order,
//! full reloads, and storage that is missing or corrupt. This crate keeps
//! one in-memory value and two persisted copies in step, and gives every
//! consumer a read path that cannot fail.
//!
//! ## Key components
//!
//! - [`GoalSelection`] — ordered list of [`ForecastGoal`]s; the first is primary
//! - [`SelectionStore`] — in-memory value, subscribers, write-through on change
//! - [`PersistenceBridge`] — tiered resolution (memory → durable → fallback
//!   → debug override → default) and propagation to the persisted slots
//! - [`KeyValueStore`] — durable slot backends ([`JsonFileKv`], [`MemoryKv`])
//! - [`FallbackSlot`] — redundant process-wide copy
//! - [`DebugOverride`] — diagnostics-only single-goal override
//! - [`SelectionEvent`] / [`SelectionSubscriber`] — change notification

pub mod bridge;
pub mod debug_override;
pub mod error;
pub mod events;
pub mod fallback;
pub mod goal;
pub mod kv;
pub mod store;

pub use bridge::{
    PersistenceBridge, PropagationReport, Resolved, SelectionResolver, SelectionTier,
    TierSnapshot,
};
pub use debug_override::DebugOverride;
pub use error::{SlotError, UnknownGoal};
pub use events::{
    CallbackSubscriber, JsonlEventLog, SelectionEvent, SelectionSubscriber, SubscriptionId,
};
pub use fallback::FallbackSlot;
pub use goal::{ForecastGoal, GoalSelection, DEFAULT_FORECAST_TYPE};
pub use kv::{JsonFileKv, KeyValueStore, MemoryKv, DEBUG_OVERRIDE_KEY, SELECTION_KEY};
pub use store::{SelectionStore, SelectionUpdate};
