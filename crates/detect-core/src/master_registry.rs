//! Process-wide container of live and retiring snapshots (spec.md §4.2).
//!
//! The original's intrusive linked lists and manual `ref_cnt` become,
//! per spec.md §9's redesign note, two `Vec<Arc<EngineSnapshot>>`
//! under one lock plus ordinary `Arc` strong-counting: `Reference` is
//! `Arc::clone`, `DeReference` is `drop`, and "ref_cnt reaches zero" is
//! "no strong reference remains but the one the free list itself
//! holds".

use std::sync::Arc;

use parking_lot::Mutex;
use warden_detect_types::SnapshotId;

use crate::snapshot::EngineSnapshot;

#[derive(Default)]
struct Lists {
    active: Vec<Arc<EngineSnapshot>>,
    free: Vec<Arc<EngineSnapshot>>,
}

/// Process-wide singleton container of live (`active`) and retiring
/// (`free`) snapshots.
#[derive(Default)]
pub struct MasterRegistry {
    lists: Mutex<Lists>,
}

impl MasterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links `s` at the head of the active list. `s` must not already
    /// be registered; it is assumed freshly built.
    pub fn add_to_master(&self, s: Arc<EngineSnapshot>) {
        self.lists.lock().active.insert(0, s);
    }

    /// Returns the active list's head, incrementing its reference
    /// count (an `Arc::clone`), or `None` if the active list is empty.
    pub fn get_current(&self) -> Option<Arc<EngineSnapshot>> {
        self.lists.lock().active.first().cloned()
    }

    /// True iff at least one snapshot is active — mirrors
    /// `DetectEngineEnabled()` from spec.md §6.
    pub fn detect_engine_enabled(&self) -> bool {
        !self.lists.lock().active.is_empty()
    }

    /// Unlinks `s` from the active list (it must be present — a
    /// violation of that precondition is an invariant error and
    /// panics) and prepends it to the free list.
    pub fn move_to_free_list(&self, id: SnapshotId) {
        let mut lists = self.lists.lock();
        let pos = lists
            .active
            .iter()
            .position(|s| s.id == id)
            .unwrap_or_else(|| panic!("move_to_free_list: snapshot {id} not in active list"));
        let snapshot = lists.active.remove(pos);
        lists.free.insert(0, snapshot);
    }

    /// Walks the free list and drops every entry whose only remaining
    /// strong reference is the free list's own — i.e. `ref_cnt == 0`
    /// in the original's terms.
    pub fn prune_free_list(&self) {
        let mut lists = self.lists.lock();
        lists.free.retain(|s| Arc::strong_count(s) > 1);
    }

    /// Number of entries currently on the active list. Test/diagnostic
    /// helper, not part of the original's public surface.
    pub fn active_len(&self) -> usize {
        self.lists.lock().active.len()
    }

    /// Number of entries currently on the free list.
    pub fn free_len(&self) -> usize {
        self.lists.lock().free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::EngineSnapshot;

    fn snap(id: u64) -> Arc<EngineSnapshot> {
        Arc::new(EngineSnapshot::init_minimal(SnapshotId(id)))
    }

    #[test]
    fn add_and_get_current() {
        let reg = MasterRegistry::new();
        assert!(reg.get_current().is_none());
        reg.add_to_master(snap(1));
        let current = reg.get_current().unwrap();
        assert_eq!(current.id, SnapshotId(1));
    }

    #[test]
    fn newest_addition_is_head() {
        let reg = MasterRegistry::new();
        reg.add_to_master(snap(1));
        reg.add_to_master(snap(2));
        assert_eq!(reg.get_current().unwrap().id, SnapshotId(2));
    }

    #[test]
    fn move_to_free_list_then_prune() {
        let reg = MasterRegistry::new();
        let a = snap(1);
        reg.add_to_master(a.clone());
        assert_eq!(Arc::strong_count(&a), 2); // our local `a` + the active list's clone
        drop(a);

        reg.move_to_free_list(SnapshotId(1));
        assert_eq!(reg.active_len(), 0);
        assert_eq!(reg.free_len(), 1);

        assert!(reg.get_current().is_none(), "moved snapshot is no longer active");

        reg.prune_free_list();
        assert_eq!(reg.free_len(), 0, "no external refs left, prune must reclaim it");
    }

    #[test]
    fn prune_leaves_referenced_snapshots_on_free_list() {
        let reg = MasterRegistry::new();
        let a = snap(1);
        reg.add_to_master(a.clone());
        reg.move_to_free_list(SnapshotId(1));
        reg.prune_free_list();
        assert_eq!(reg.free_len(), 1, "external handle `a` keeps it alive");
        drop(a);
        reg.prune_free_list();
        assert_eq!(reg.free_len(), 0);
    }

    #[test]
    #[should_panic(expected = "not in active list")]
    fn move_to_free_list_panics_if_absent() {
        let reg = MasterRegistry::new();
        reg.move_to_free_list(SnapshotId(42));
    }
}
