// bridge.rs — PersistenceBridge: tiered selection reads and write-through.
//
// The bridge connects the in-memory SelectionStore to two slots that outlive
// it: the durable key-value store and the process-wide fallback slot.
//
// Reads resolve through a fixed tier list, first non-empty hit wins:
//
//   1. Memory: the store's current value
//   2. Durable: `forecastGoals` in the key-value store, if it parses
//   3. Fallback: the process-wide copy
//   4. Override: `debug_selectedGoal`, diagnostics only
//   5. Default: the empty selection
//
// Writes go to the durable and fallback slots independently. Neither path
// ever returns an error to the caller; failures are logged and reported in
// a PropagationReport.

use std::fmt;

use serde::Serialize;

use crate::debug_override::DebugOverride;
use crate::error::SlotError;
use crate::fallback::FallbackSlot;
use crate::goal::{ForecastGoal, GoalSelection};
use crate::kv::{KeyValueStore, SELECTION_KEY};

/// Which tier a resolved selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionTier {
    Memory,
    Durable,
    Fallback,
    DebugOverride,
    Default,
}

impl fmt::Display for SelectionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionTier::Memory => write!(f, "memory"),
            SelectionTier::Durable => write!(f, "durable"),
            SelectionTier::Fallback => write!(f, "fallback"),
            SelectionTier::DebugOverride => write!(f, "debug_override"),
            SelectionTier::Default => write!(f, "default"),
        }
    }
}

/// A resolved selection plus the tier that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub selection: GoalSelection,
    pub tier: SelectionTier,
}

/// Outcome of a propagation or clear: which slots accepted the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropagationReport {
    pub durable: bool,
    pub fallback: bool,
}

impl PropagationReport {
    pub fn is_complete(&self) -> bool {
        self.durable && self.fallback
    }
}

/// Raw contents of every tier, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct TierSnapshot {
    pub memory: GoalSelection,
    /// Exact text in the durable slot, including malformed text.
    pub durable_raw: Option<String>,
    /// The durable slot after validation.
    pub durable: Option<GoalSelection>,
    pub fallback: Option<GoalSelection>,
    pub debug_override_enabled: bool,
    pub debug_override: Option<ForecastGoal>,
    pub resolved: GoalSelection,
    pub resolved_tier: SelectionTier,
}

/// Anything that can answer "what is the current selection?" without failing.
///
/// Consumers that must not depend on a SelectionStore being open (the
/// upload flow) take this trait instead of the store.
pub trait SelectionResolver {
    fn resolve_selection(&self) -> GoalSelection;
}

/// Bridge between the in-memory selection and its durable copies.
pub struct PersistenceBridge {
    durable: Box<dyn KeyValueStore>,
    fallback: FallbackSlot,
    debug_override: DebugOverride,
}

impl PersistenceBridge {
    /// Create a bridge over a durable store and a fallback slot.
    /// The debug override follows the build profile.
    pub fn new(durable: impl KeyValueStore + 'static, fallback: FallbackSlot) -> Self {
        Self {
            durable: Box::new(durable),
            fallback,
            debug_override: DebugOverride::for_build(),
        }
    }

    pub fn with_debug_override(mut self, debug_override: DebugOverride) -> Self {
        self.debug_override = debug_override;
        self
    }

    pub fn durable(&self) -> &dyn KeyValueStore {
        self.durable.as_ref()
    }

    pub fn fallback(&self) -> &FallbackSlot {
        &self.fallback
    }

    pub fn debug_override(&self) -> DebugOverride {
        self.debug_override
    }

    /// Resolve through every tier, using `in_memory` as tier 1.
    pub fn resolve_with_tier(&self, in_memory: &GoalSelection) -> Resolved {
        let resolved = self.resolve_inner(in_memory);
        tracing::debug!(
            tier = %resolved.tier,
            selection = %resolved.selection,
            "resolved goal selection"
        );
        resolved
    }

    /// Resolve skipping the memory tier, as a freshly loaded screen would.
    pub fn resolve_persisted(&self) -> Resolved {
        self.resolve_with_tier(&GoalSelection::empty())
    }

    fn resolve_inner(&self, in_memory: &GoalSelection) -> Resolved {
        if !in_memory.is_empty() {
            return Resolved {
                selection: in_memory.clone(),
                tier: SelectionTier::Memory,
            };
        }
        if let Some(selection) = self.read_durable().filter(|s| !s.is_empty()) {
            return Resolved {
                selection,
                tier: SelectionTier::Durable,
            };
        }
        if let Some(selection) = self.read_fallback() {
            return Resolved {
                selection,
                tier: SelectionTier::Fallback,
            };
        }
        if let Some(goal) = self.debug_override.read(self.durable.as_ref()) {
            return Resolved {
                selection: GoalSelection::from(goal),
                tier: SelectionTier::DebugOverride,
            };
        }
        Resolved {
            selection: GoalSelection::empty(),
            tier: SelectionTier::Default,
        }
    }

    /// The validated durable slot. Malformed or unreadable data is `None`.
    pub fn read_durable(&self) -> Option<GoalSelection> {
        match self.durable.get(SELECTION_KEY) {
            Ok(Some(raw)) => GoalSelection::from_json(&raw),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!("durable slot unreadable: {}", e);
                None
            }
        }
    }

    /// The fallback slot. An unavailable slot reads as unset.
    pub fn read_fallback(&self) -> Option<GoalSelection> {
        match self.fallback.get() {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("fallback slot unreadable: {}", e);
                None
            }
        }
    }

    /// Write `selection` to the durable and fallback slots.
    ///
    /// Each write is attempted regardless of the other's outcome.
    pub fn propagate(&self, selection: &GoalSelection) -> PropagationReport {
        let durable = match self.write_durable(selection) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to persist goal selection: {}", e);
                false
            }
        };
        let fallback = match self.fallback.set(selection) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to update fallback goal selection: {}", e);
                false
            }
        };
        PropagationReport { durable, fallback }
    }

    fn write_durable(&self, selection: &GoalSelection) -> Result<(), SlotError> {
        let json = selection.to_json()?;
        self.durable.set(SELECTION_KEY, &json)
    }

    /// Remove the selection from both slots. The debug override is left alone.
    pub fn clear(&self) -> PropagationReport {
        let durable = match self.durable.remove(SELECTION_KEY) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("failed to clear persisted goal selection: {}", e);
                false
            }
        };
        let fallback = match self.fallback.clear() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to clear fallback goal selection: {}", e);
                false
            }
        };
        PropagationReport { durable, fallback }
    }

    /// Raw view of every tier, resolved against `in_memory`.
    pub fn inspect(&self, in_memory: &GoalSelection) -> TierSnapshot {
        let durable_raw = self.durable.get(SELECTION_KEY).ok().flatten();
        let durable = durable_raw.as_deref().and_then(GoalSelection::from_json);
        let resolved = self.resolve_inner(in_memory);
        TierSnapshot {
            memory: in_memory.clone(),
            durable_raw,
            durable,
            fallback: self.read_fallback(),
            debug_override_enabled: self.debug_override.is_enabled(),
            debug_override: DebugOverride::enabled().read(self.durable.as_ref()),
            resolved: resolved.selection,
            resolved_tier: resolved.tier,
        }
    }
}

impl SelectionResolver for PersistenceBridge {
    fn resolve_selection(&self) -> GoalSelection {
        self.resolve_persisted().selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{MemoryKv, DEBUG_OVERRIDE_KEY};

    /// A durable store whose every operation fails, like storage over quota.
    struct UnavailableKv;

    impl KeyValueStore for UnavailableKv {
        fn get(&self, _key: &str) -> Result<Option<String>, SlotError> {
            Err(SlotError::Unavailable("storage disabled".to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), SlotError> {
            Err(SlotError::Unavailable("quota exceeded".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<bool, SlotError> {
            Err(SlotError::Unavailable("storage disabled".to_string()))
        }
    }

    fn bridge(kv: &MemoryKv, fallback: &FallbackSlot) -> PersistenceBridge {
        PersistenceBridge::new(kv.clone(), fallback.clone())
            .with_debug_override(DebugOverride::enabled())
    }

    fn promotions() -> GoalSelection {
        GoalSelection::from(ForecastGoal::Promotions)
    }

    #[test]
    fn all_tiers_empty_resolves_to_default() {
        let b = bridge(&MemoryKv::new(), &FallbackSlot::new());
        let resolved = b.resolve_persisted();
        assert_eq!(resolved.tier, SelectionTier::Default);
        assert!(resolved.selection.is_empty());
    }

    #[test]
    fn memory_tier_wins_over_everything() {
        let kv = MemoryKv::new();
        let fallback = FallbackSlot::new();
        kv.set(SELECTION_KEY, r#"["Replenishment"]"#).unwrap();
        fallback
            .set(&GoalSelection::from(ForecastGoal::InventoryOptimization))
            .unwrap();

        let resolved = bridge(&kv, &fallback).resolve_with_tier(&promotions());
        assert_eq!(resolved.tier, SelectionTier::Memory);
        assert_eq!(resolved.selection, promotions());
    }

    #[test]
    fn durable_tier_wins_over_fallback() {
        let kv = MemoryKv::new();
        let fallback = FallbackSlot::new();
        kv.set(SELECTION_KEY, r#"["Replenishment"]"#).unwrap();
        fallback.set(&promotions()).unwrap();

        let resolved = bridge(&kv, &fallback).resolve_persisted();
        assert_eq!(resolved.tier, SelectionTier::Durable);
        assert_eq!(resolved.selection.primary(), Some(ForecastGoal::Replenishment));
    }

    #[test]
    fn malformed_durable_falls_through_to_fallback() {
        let kv = MemoryKv::new();
        let fallback = FallbackSlot::new();
        kv.set(SELECTION_KEY, "not-json").unwrap();
        fallback.set(&promotions()).unwrap();

        let resolved = bridge(&kv, &fallback).resolve_persisted();
        assert_eq!(resolved.tier, SelectionTier::Fallback);
        assert_eq!(resolved.selection, promotions());
    }

    #[test]
    fn invalid_member_is_never_echoed() {
        let kv = MemoryKv::new();
        kv.set(SELECTION_KEY, r#"["Promotions","Crystal Ball"]"#).unwrap();

        let resolved = bridge(&kv, &FallbackSlot::new()).resolve_persisted();
        assert_eq!(resolved.tier, SelectionTier::Default);
        assert!(resolved.selection.is_empty());
    }

    #[test]
    fn empty_durable_array_is_skipped() {
        let kv = MemoryKv::new();
        let fallback = FallbackSlot::new();
        kv.set(SELECTION_KEY, "[]").unwrap();
        fallback.set(&promotions()).unwrap();

        assert_eq!(
            bridge(&kv, &fallback).resolve_persisted().tier,
            SelectionTier::Fallback
        );
    }

    #[test]
    fn debug_override_used_only_when_real_tiers_empty() {
        let kv = MemoryKv::new();
        let fallback = FallbackSlot::new();
        kv.set(DEBUG_OVERRIDE_KEY, "New Product Launch").unwrap();

        let b = bridge(&kv, &fallback);
        let resolved = b.resolve_persisted();
        assert_eq!(resolved.tier, SelectionTier::DebugOverride);
        assert_eq!(
            resolved.selection.primary(),
            Some(ForecastGoal::NewProductLaunch)
        );

        fallback.set(&promotions()).unwrap();
        assert_eq!(b.resolve_persisted().tier, SelectionTier::Fallback);
    }

    #[test]
    fn disabled_debug_override_resolves_to_default() {
        let kv = MemoryKv::new();
        kv.set(DEBUG_OVERRIDE_KEY, "Promotions").unwrap();
        let b = PersistenceBridge::new(kv, FallbackSlot::new())
            .with_debug_override(DebugOverride::disabled());
        assert_eq!(b.resolve_persisted().tier, SelectionTier::Default);
    }

    #[test]
    fn unreadable_durable_store_never_fails_resolution() {
        let fallback = FallbackSlot::new();
        let b = PersistenceBridge::new(UnavailableKv, fallback.clone())
            .with_debug_override(DebugOverride::enabled());
        assert_eq!(b.resolve_persisted().tier, SelectionTier::Default);

        fallback.set(&promotions()).unwrap();
        assert_eq!(b.resolve_selection(), promotions());
    }

    #[test]
    fn propagate_writes_both_slots() {
        let kv = MemoryKv::new();
        let fallback = FallbackSlot::new();
        let report = bridge(&kv, &fallback).propagate(&promotions());

        assert!(report.is_complete());
        assert_eq!(
            kv.get(SELECTION_KEY).unwrap().as_deref(),
            Some(r#"["Promotions"]"#)
        );
        assert_eq!(fallback.get().unwrap(), Some(promotions()));
    }

    #[test]
    fn durable_failure_does_not_block_fallback() {
        let fallback = FallbackSlot::new();
        let b = PersistenceBridge::new(UnavailableKv, fallback.clone());
        let report = b.propagate(&promotions());

        assert!(!report.durable);
        assert!(report.fallback);
        assert_eq!(fallback.get().unwrap(), Some(promotions()));
    }

    #[test]
    fn fallback_failure_does_not_block_durable() {
        let kv = MemoryKv::new();
        let fallback = FallbackSlot::new();
        fallback.poison();
        let report = bridge(&kv, &fallback).propagate(&promotions());

        assert!(report.durable);
        assert!(!report.fallback);
        assert!(kv.get(SELECTION_KEY).unwrap().is_some());
    }

    #[test]
    fn clear_empties_both_slots_but_keeps_override() {
        let kv = MemoryKv::new();
        let fallback = FallbackSlot::new();
        let b = bridge(&kv, &fallback);
        b.propagate(&promotions());
        kv.set(DEBUG_OVERRIDE_KEY, "Replenishment").unwrap();

        assert!(b.clear().is_complete());
        assert!(kv.get(SELECTION_KEY).unwrap().is_none());
        assert!(fallback.get().unwrap().is_none());
        assert!(kv.get(DEBUG_OVERRIDE_KEY).unwrap().is_some());
    }

    #[test]
    fn inspect_reports_malformed_raw_text() {
        let kv = MemoryKv::new();
        kv.set(SELECTION_KEY, "not-json").unwrap();
        let snapshot = bridge(&kv, &FallbackSlot::new()).inspect(&GoalSelection::empty());

        assert_eq!(snapshot.durable_raw.as_deref(), Some("not-json"));
        assert!(snapshot.durable.is_none());
        assert_eq!(snapshot.resolved_tier, SelectionTier::Default);
    }
}
