//! Bulk-selection state.

use std::collections::HashSet;

use tokio::sync::watch;

/// Independently owned selection state with a narrow mutation API and a
/// watch subscription for observers.
#[derive(Debug)]
pub struct SelectionStore {
    selected: HashSet<u64>,
    tx: watch::Sender<HashSet<u64>>,
}

impl SelectionStore {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(HashSet::new());
        Self {
            selected: HashSet::new(),
            tx,
        }
    }

    /// Flip the selection state of one id.
    pub fn toggle(&mut self, id: u64) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        self.publish();
    }

    /// Toggle a whole set: if every id is already selected, deselect them
    /// all; otherwise select them all.
    pub fn toggle_all(&mut self, ids: &[u64]) {
        let all_selected = ids.iter().all(|id| self.selected.contains(id));
        if all_selected {
            for id in ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(ids.iter().copied());
        }
        self.publish();
    }

    /// Select every given id.
    pub fn select_many(&mut self, ids: &[u64]) {
        self.selected.extend(ids.iter().copied());
        self.publish();
    }

    /// Deselect every given id.
    pub fn deselect_many(&mut self, ids: &[u64]) {
        for id in ids {
            self.selected.remove(id);
        }
        self.publish();
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.publish();
        }
    }

    /// Whether an id is selected.
    #[must_use]
    pub fn is_selected(&self, id: u64) -> bool {
        self.selected.contains(&id)
    }

    /// Number of selected ids.
    #[must_use]
    pub fn count(&self) -> usize {
        self.selected.len()
    }

    /// Snapshot of the selected ids, in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.selected.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Subscribe to snapshots published after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<HashSet<u64>> {
        self.tx.subscribe()
    }

    fn publish(&self) {
        self.tx.send_replace(self.selected.clone());
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_state() {
        let mut store = SelectionStore::new();
        store.toggle(3);
        assert!(store.is_selected(3));
        store.toggle(3);
        assert!(!store.is_selected(3));
    }

    #[test]
    fn test_toggle_all_semantics() {
        let mut store = SelectionStore::new();
        store.toggle(1);

        // Not all of 1..=3 are selected, so select them all.
        store.toggle_all(&[1, 2, 3]);
        assert_eq!(store.ids(), vec![1, 2, 3]);

        // Now they all are, so deselect them all.
        store.toggle_all(&[1, 2, 3]);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_toggle_all_leaves_other_ids_alone() {
        let mut store = SelectionStore::new();
        store.select_many(&[10, 20]);
        store.toggle_all(&[20, 30]);
        assert_eq!(store.ids(), vec![10, 20, 30]);

        store.toggle_all(&[20, 30]);
        assert_eq!(store.ids(), vec![10]);
    }

    #[test]
    fn test_select_and_deselect_many() {
        let mut store = SelectionStore::new();
        store.select_many(&[1, 2, 3, 4]);
        store.deselect_many(&[2, 4]);
        assert_eq!(store.ids(), vec![1, 3]);

        store.clear();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_subscription_sees_changes() {
        let mut store = SelectionStore::new();
        let mut rx = store.subscribe();
        store.toggle(5);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().contains(&5));
    }
}
