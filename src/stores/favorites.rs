//! User-selected favorites with replace-all persistence.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::StoreError;
use crate::types::Character;

/// The slice of a character that favorites remember.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteItem {
    /// Character id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Portrait image URL.
    pub image: String,
}

impl From<&Character> for FavoriteItem {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            image: character.image.clone(),
        }
    }
}

/// Key-based read / replace-all persistence for favorites.
///
/// This is the external-collaborator seam: the store does not care where
/// the payload lives, only that it can be read once at startup and
/// replaced wholesale after each mutation.
pub trait FavoritesStorage: Send + Sync {
    /// Read the persisted favorites.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload cannot be read or decoded.
    fn load(&self) -> Result<Vec<FavoriteItem>, StoreError>;

    /// Replace the persisted favorites with `items`.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload cannot be written.
    fn save(&self, items: &[FavoriteItem]) -> Result<(), StoreError>;
}

/// In-memory [`FavoritesStorage`], for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryFavoritesStorage {
    inner: Mutex<Vec<FavoriteItem>>,
}

impl MemoryFavoritesStorage {
    /// Create empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavoritesStorage for MemoryFavoritesStorage {
    fn load(&self) -> Result<Vec<FavoriteItem>, StoreError> {
        Ok(self.inner.lock().expect("storage lock poisoned").clone())
    }

    fn save(&self, items: &[FavoriteItem]) -> Result<(), StoreError> {
        *self.inner.lock().expect("storage lock poisoned") = items.to_vec();
        Ok(())
    }
}

/// JSON-file-backed [`FavoritesStorage`].
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Persist favorites at the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FavoritesStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<FavoriteItem>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, items: &[FavoriteItem]) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Independently owned favorites state with a narrow mutation API.
///
/// Each mutation persists best-effort through the attached storage (a
/// failure is logged, never surfaced) and publishes a snapshot to watch
/// subscribers.
pub struct FavoritesStore {
    items: BTreeMap<u64, FavoriteItem>,
    storage: Option<Box<dyn FavoritesStorage>>,
    tx: watch::Sender<Vec<FavoriteItem>>,
}

impl FavoritesStore {
    /// Create an empty, non-persistent store.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            items: BTreeMap::new(),
            storage: None,
            tx,
        }
    }

    /// Create a store backed by `storage`, seeded with whatever it holds.
    /// A failed initial load is logged and the store starts empty.
    #[must_use]
    pub fn with_storage(storage: Box<dyn FavoritesStorage>) -> Self {
        let items: BTreeMap<u64, FavoriteItem> = match storage.load() {
            Ok(loaded) => loaded.into_iter().map(|item| (item.id, item)).collect(),
            Err(error) => {
                tracing::warn!(%error, "failed to load persisted favorites");
                BTreeMap::new()
            }
        };
        let (tx, _rx) = watch::channel(items.values().cloned().collect());
        Self {
            items,
            storage: Some(storage),
            tx,
        }
    }

    /// Add or replace one favorite.
    pub fn add(&mut self, item: FavoriteItem) {
        self.items.insert(item.id, item);
        self.publish();
    }

    /// Add or replace a batch of favorites.
    pub fn add_many(&mut self, items: impl IntoIterator<Item = FavoriteItem>) {
        for item in items {
            self.items.insert(item.id, item);
        }
        self.publish();
    }

    /// Remove a favorite by id, returning it if present.
    pub fn remove(&mut self, id: u64) -> Option<FavoriteItem> {
        let removed = self.items.remove(&id);
        if removed.is_some() {
            self.publish();
        }
        removed
    }

    /// Remove every favorite.
    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.publish();
        }
    }

    /// Whether an id is a favorite.
    #[must_use]
    pub fn is_favorite(&self, id: u64) -> bool {
        self.items.contains_key(&id)
    }

    /// Number of favorites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no favorites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Snapshot of all favorites, ordered by id.
    #[must_use]
    pub fn items(&self) -> Vec<FavoriteItem> {
        self.items.values().cloned().collect()
    }

    /// Subscribe to snapshots published after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<FavoriteItem>> {
        self.tx.subscribe()
    }

    fn publish(&self) {
        let snapshot = self.items();
        if let Some(storage) = &self.storage {
            if let Err(error) = storage.save(&snapshot) {
                tracing::warn!(%error, "failed to persist favorites");
            }
        }
        self.tx.send_replace(snapshot);
    }
}

impl Default for FavoritesStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("items", &self.items)
            .field("persistent", &self.storage.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64) -> FavoriteItem {
        FavoriteItem {
            id,
            name: format!("Character {id:04}"),
            image: format!("https://example.test/avatar/{id}.jpeg"),
        }
    }

    #[test]
    fn test_add_remove_clear() {
        let mut store = FavoritesStore::new();
        store.add(item(2));
        store.add_many([item(1), item(3)]);
        assert_eq!(store.len(), 3);
        assert!(store.is_favorite(1));

        // Ordered by id regardless of insertion order.
        let ids: Vec<u64> = store.items().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        assert_eq!(store.remove(2).unwrap().id, 2);
        assert!(store.remove(2).is_none());

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_overwrites_by_id() {
        let mut store = FavoritesStore::new();
        store.add(item(1));
        let mut renamed = item(1);
        renamed.name = "Renamed".to_string();
        store.add(renamed);
        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].name, "Renamed");
    }

    #[test]
    fn test_watch_subscribers_see_snapshots() {
        let mut store = FavoritesStore::new();
        let mut rx = store.subscribe();
        store.add(item(7));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }

    #[test]
    fn test_storage_round_trip() {
        let storage = MemoryFavoritesStorage::new();
        storage.save(&[item(4), item(5)]).unwrap();

        let store = FavoritesStore::with_storage(Box::new(storage));
        assert_eq!(store.len(), 2);
        assert!(store.is_favorite(5));
    }

    #[test]
    fn test_json_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");

        let storage = JsonFileStorage::new(&path);
        assert!(storage.load().unwrap().is_empty());

        let mut store = FavoritesStore::with_storage(Box::new(storage.clone()));
        store.add(item(9));

        let reloaded = FavoritesStore::with_storage(Box::new(storage));
        assert!(reloaded.is_favorite(9));
    }
}
