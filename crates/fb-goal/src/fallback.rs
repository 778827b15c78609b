// fallback.rs — FallbackSlot: the redundant process-wide selection copy.
//
// The fallback slot is a second copy of the selection that lives outside
// the store's lifecycle. It is written on every propagation and consulted
// when both the in-memory value and the durable slot come up empty.
//
// It is an explicit handle rather than an ambient global: the bridge is
// handed a slot at construction, tests create isolated slots, and
// `FallbackSlot::global()` is only a convenience accessor for binaries that
// want the single process-wide instance.

use std::sync::{Arc, Mutex, OnceLock};

use crate::error::SlotError;
use crate::goal::GoalSelection;

static GLOBAL_FALLBACK: OnceLock<FallbackSlot> = OnceLock::new();

/// A shared, mutable selection copy. Clones refer to the same slot.
#[derive(Clone, Default)]
pub struct FallbackSlot {
    value: Arc<Mutex<Option<GoalSelection>>>,
}

impl FallbackSlot {
    /// A fresh, empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide slot. Every call returns a handle to the same value.
    pub fn global() -> Self {
        GLOBAL_FALLBACK.get_or_init(FallbackSlot::new).clone()
    }

    /// Current value, if set and non-empty.
    pub fn get(&self) -> Result<Option<GoalSelection>, SlotError> {
        let guard = self
            .value
            .lock()
            .map_err(|_| SlotError::Unavailable("fallback slot lock poisoned".to_string()))?;
        Ok(guard.as_ref().filter(|sel| !sel.is_empty()).cloned())
    }

    pub fn set(&self, selection: &GoalSelection) -> Result<(), SlotError> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| SlotError::Unavailable("fallback slot lock poisoned".to_string()))?;
        *guard = Some(selection.clone());
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SlotError> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| SlotError::Unavailable("fallback slot lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }

    /// Poison the slot's lock so every access fails.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let value = Arc::clone(&self.value);
        let _ = std::thread::spawn(move || {
            let _guard = value.lock().unwrap();
            panic!("poisoning fallback slot for test");
        })
        .join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::ForecastGoal;

    #[test]
    fn new_slot_is_empty() {
        assert!(FallbackSlot::new().get().unwrap().is_none());
    }

    #[test]
    fn clones_share_value() {
        let slot = FallbackSlot::new();
        let other = slot.clone();
        slot.set(&GoalSelection::from(ForecastGoal::Promotions)).unwrap();
        assert_eq!(
            other.get().unwrap().unwrap().primary(),
            Some(ForecastGoal::Promotions)
        );
    }

    #[test]
    fn empty_selection_reads_as_unset() {
        let slot = FallbackSlot::new();
        slot.set(&GoalSelection::empty()).unwrap();
        assert!(slot.get().unwrap().is_none());
    }

    #[test]
    fn clear_unsets_value() {
        let slot = FallbackSlot::new();
        slot.set(&GoalSelection::from(ForecastGoal::Replenishment)).unwrap();
        slot.clear().unwrap();
        assert!(slot.get().unwrap().is_none());
    }

    #[test]
    fn poisoned_slot_reports_unavailable() {
        let slot = FallbackSlot::new();
        slot.poison();
        assert!(matches!(slot.get(), Err(SlotError::Unavailable(_))));
        assert!(matches!(
            slot.set(&GoalSelection::from(ForecastGoal::Promotions)),
            Err(SlotError::Unavailable(_))
        ));
    }

    #[test]
    fn global_returns_same_slot() {
        let a = FallbackSlot::global();
        let b = FallbackSlot::global();
        assert!(Arc::ptr_eq(&a.value, &b.value));
    }
}
