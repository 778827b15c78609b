// store.rs — SelectionStore: the session's source of truth for the goal selection.
//
// Screens read the selection here and the goal-selection step writes it.
// The store owns its PersistenceBridge: opening the store hydrates from the
// persisted tiers, and every non-empty write is pushed through the bridge
// before `write` returns.
//
// Writers are serialized by `&mut self`; there is never more than one.

use crate::bridge::{
    PersistenceBridge, PropagationReport, Resolved, SelectionResolver, SelectionTier,
};
use crate::events::{SelectionEvent, SelectionSubscriber, SubscriptionId};
use crate::goal::{ForecastGoal, GoalSelection};

/// The argument to [`SelectionStore::write`]: a literal value or a function
/// of the previous value.
pub enum SelectionUpdate {
    Replace(GoalSelection),
    Apply(Box<dyn FnOnce(&GoalSelection) -> GoalSelection>),
}

impl SelectionUpdate {
    pub fn apply(f: impl FnOnce(&GoalSelection) -> GoalSelection + 'static) -> Self {
        SelectionUpdate::Apply(Box::new(f))
    }
}

impl From<GoalSelection> for SelectionUpdate {
    fn from(selection: GoalSelection) -> Self {
        SelectionUpdate::Replace(selection)
    }
}

impl From<Vec<ForecastGoal>> for SelectionUpdate {
    fn from(goals: Vec<ForecastGoal>) -> Self {
        SelectionUpdate::Replace(GoalSelection::new(goals))
    }
}

/// In-memory goal selection with subscribers and write-through persistence.
pub struct SelectionStore {
    value: GoalSelection,
    bridge: PersistenceBridge,
    subscribers: Vec<(SubscriptionId, Box<dyn SelectionSubscriber>)>,
    /// Set by the first write or reset; hydration is a no-op afterwards.
    user_written: bool,
    hydrated: bool,
}

impl SelectionStore {
    /// Open a store over `bridge` and hydrate it from the persisted tiers.
    pub fn open(bridge: PersistenceBridge) -> Self {
        Self::open_with(bridge, Vec::new())
    }

    /// Like [`open`](Self::open), but registers `subscribers` first so they
    /// receive the `Hydrated` event.
    pub fn open_with(
        bridge: PersistenceBridge,
        subscribers: Vec<Box<dyn SelectionSubscriber>>,
    ) -> Self {
        let mut store = Self {
            value: GoalSelection::empty(),
            bridge,
            subscribers: Vec::new(),
            user_written: false,
            hydrated: false,
        };
        for subscriber in subscribers {
            store.subscribe(subscriber);
        }
        store.hydrate_from_persistence();
        store
    }

    /// The current selection.
    pub fn read(&self) -> GoalSelection {
        self.value.clone()
    }

    pub fn bridge(&self) -> &PersistenceBridge {
        &self.bridge
    }

    /// Seed the value from the bridge (skipping the memory tier).
    ///
    /// Only acts at cold start: once a write or reset has happened the
    /// current value is kept and returned unchanged. The debug override is
    /// never seeded into memory; it stays visible through resolution only,
    /// so a later write cannot persist it as a user choice.
    ///
    /// `Hydrated` is emitted on the first hydration and afterwards only when
    /// the seeded value changes.
    pub fn hydrate_from_persistence(&mut self) -> &GoalSelection {
        if self.user_written {
            tracing::debug!("skipping hydration: selection already written this session");
            return &self.value;
        }
        let resolved = self.bridge.resolve_persisted();
        let (seed, tier) = match resolved.tier {
            SelectionTier::DebugOverride => {
                tracing::debug!(
                    selection = %resolved.selection,
                    "debug override not seeded into the store"
                );
                (GoalSelection::empty(), SelectionTier::Default)
            }
            tier => (resolved.selection, tier),
        };
        tracing::debug!(tier = %tier, selection = %seed, "hydrated goal selection");

        let first = !self.hydrated;
        self.hydrated = true;
        if first || seed != self.value {
            self.value = seed;
            self.dispatch(&SelectionEvent::hydrated(&self.value, tier));
        }
        &self.value
    }

    /// Replace the selection and propagate it.
    ///
    /// Subscribers are notified before this returns. Non-empty values are
    /// written through to the durable and fallback slots; the returned
    /// report says which of them accepted the write. Empty values are not
    /// propagated and return `None`.
    pub fn write(&mut self, update: impl Into<SelectionUpdate>) -> Option<PropagationReport> {
        let next = match update.into() {
            SelectionUpdate::Replace(selection) => selection,
            SelectionUpdate::Apply(f) => f(&self.value),
        };
        let previous = std::mem::replace(&mut self.value, next);
        self.user_written = true;
        self.dispatch(&SelectionEvent::changed(&previous, &self.value));

        if self.value.is_empty() {
            return None;
        }
        let report = self.bridge.propagate(&self.value);
        if !report.is_complete() {
            tracing::debug!(
                durable = report.durable,
                fallback = report.fallback,
                "goal selection only partially persisted; memory remains authoritative"
            );
        }
        Some(report)
    }

    /// Shorthand for `write(SelectionUpdate::apply(f))`.
    pub fn update(
        &mut self,
        f: impl FnOnce(&GoalSelection) -> GoalSelection + 'static,
    ) -> Option<PropagationReport> {
        self.write(SelectionUpdate::apply(f))
    }

    /// Clear the selection in memory and in both persisted slots.
    pub fn reset(&mut self) -> PropagationReport {
        self.value = GoalSelection::empty();
        self.user_written = true;
        let report = self.bridge.clear();
        self.dispatch(&SelectionEvent::reset());
        report
    }

    /// Resolve through every tier with the current value as tier 1.
    pub fn resolve_with_tier(&self) -> Resolved {
        self.bridge.resolve_with_tier(&self.value)
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn SelectionSubscriber>) -> SubscriptionId {
        let id = SubscriptionId::new_v4();
        self.subscribers.push((id, subscriber));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    fn dispatch(&self, event: &SelectionEvent) {
        for (id, subscriber) in &self.subscribers {
            if let Err(e) = subscriber.notify(event) {
                tracing::warn!(subscriber = %id, "selection subscriber error: {}", e);
            }
        }
    }
}

impl SelectionResolver for SelectionStore {
    fn resolve_selection(&self) -> GoalSelection {
        self.resolve_with_tier().selection
    }
}
