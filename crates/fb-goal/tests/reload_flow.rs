// reload_flow.rs — Selection survives reloads through the persisted tiers.
//
// A "reload" here is dropping the SelectionStore and opening a new one over
// the same on-disk key-value file, which is what a page reload or a CLI
// re-invocation does. The fallback slot is shared or fresh depending on
// whether the scenario models the same process.

use std::fs;

use tempfile::tempdir;

use fb_goal::{
    DebugOverride, FallbackSlot, ForecastGoal, GoalSelection, JsonFileKv, KeyValueStore,
    PersistenceBridge, SelectionResolver, SelectionStore, SelectionTier, SELECTION_KEY,
};

fn bridge_at(path: &std::path::Path, fallback: &FallbackSlot) -> PersistenceBridge {
    PersistenceBridge::new(JsonFileKv::open(path).unwrap(), fallback.clone())
        .with_debug_override(DebugOverride::enabled())
}

#[test]
fn promotions_survives_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("local_storage.json");

    {
        let mut store = SelectionStore::open(bridge_at(&path, &FallbackSlot::new()));
        store.write(vec![ForecastGoal::Promotions]);
    }

    // New process: fresh fallback, memory tier empty.
    let bridge = bridge_at(&path, &FallbackSlot::new());
    let resolved = bridge.resolve_persisted();
    assert_eq!(resolved.tier, SelectionTier::Durable);
    assert_eq!(resolved.selection, GoalSelection::from(ForecastGoal::Promotions));

    let store = SelectionStore::open(bridge);
    assert_eq!(store.read(), GoalSelection::from(ForecastGoal::Promotions));
}

#[test]
fn every_written_selection_is_recovered_after_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("local_storage.json");

    let selections = [
        GoalSelection::from(ForecastGoal::Replenishment),
        GoalSelection::new([ForecastGoal::NewProductLaunch, ForecastGoal::Promotions]),
        GoalSelection::new([
            ForecastGoal::InventoryOptimization,
            ForecastGoal::Replenishment,
            ForecastGoal::NewProductLaunch,
        ]),
        GoalSelection::new(ForecastGoal::ALL),
    ];

    for selection in selections {
        let mut store = SelectionStore::open(bridge_at(&path, &FallbackSlot::new()));
        let report = store.write(selection.clone()).unwrap();
        assert!(report.durable);
        assert_eq!(store.read(), selection);
        drop(store);

        let reloaded = bridge_at(&path, &FallbackSlot::new()).resolve_selection();
        assert_eq!(reloaded, selection, "order and contents must survive reload");
    }
}

#[test]
fn not_json_in_durable_slot_falls_through() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("local_storage.json");
    JsonFileKv::open(&path)
        .unwrap()
        .set(SELECTION_KEY, "not-json")
        .unwrap();

    // Nothing else set: default.
    let resolved = bridge_at(&path, &FallbackSlot::new()).resolve_persisted();
    assert_eq!(resolved.tier, SelectionTier::Default);
    assert!(resolved.selection.is_empty());

    // Same process wrote the fallback earlier: fallback wins.
    let fallback = FallbackSlot::new();
    fallback
        .set(&GoalSelection::from(ForecastGoal::Replenishment))
        .unwrap();
    let resolved = bridge_at(&path, &fallback).resolve_persisted();
    assert_eq!(resolved.tier, SelectionTier::Fallback);
}

#[test]
fn corrupt_storage_file_never_breaks_consumers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("local_storage.json");
    fs::write(&path, "\u{0}garbage{").unwrap();

    let fallback = FallbackSlot::new();
    let mut store = SelectionStore::open(bridge_at(&path, &fallback));
    assert!(store.read().is_empty());

    // Writing repairs the file.
    let report = store.write(vec![ForecastGoal::Promotions]).unwrap();
    assert!(report.is_complete());
    assert_eq!(
        bridge_at(&path, &FallbackSlot::new()).resolve_selection(),
        GoalSelection::from(ForecastGoal::Promotions)
    );
}

#[test]
fn all_tiers_empty_gives_default() {
    let dir = tempdir().unwrap();
    let bridge = bridge_at(&dir.path().join("local_storage.json"), &FallbackSlot::new());
    assert_eq!(bridge.resolve_persisted().tier, SelectionTier::Default);
    assert!(bridge.resolve_selection().is_empty());
}

#[test]
fn unwritable_storage_keeps_session_consistent() {
    let dir = tempdir().unwrap();
    // The storage "file" is a directory, so every write fails.
    let path = dir.path().join("local_storage.json");
    fs::create_dir_all(&path).unwrap();

    let fallback = FallbackSlot::new();
    let mut store = SelectionStore::open(bridge_at(&path, &fallback));
    let report = store.write(vec![ForecastGoal::NewProductLaunch]).unwrap();

    assert!(!report.durable);
    assert!(report.fallback);
    assert_eq!(store.read().primary(), Some(ForecastGoal::NewProductLaunch));

    // A screen in the same process that never opened the store still sees it.
    let sibling = bridge_at(&path, &fallback);
    let resolved = sibling.resolve_persisted();
    assert_eq!(resolved.tier, SelectionTier::Fallback);
    assert_eq!(resolved.selection.primary(), Some(ForecastGoal::NewProductLaunch));
}
