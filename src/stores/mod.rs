//! Shared state containers outside the fetch core.
//!
//! Favorites, bulk selection and notifications are each an independently
//! owned store with a narrow mutation API and a subscription mechanism,
//! passed explicitly to their consumers rather than shared as a mutable
//! global:
//!
//! - [`favorites`]: persisted favorites with a replace-all storage seam
//! - [`selection`]: bulk-selection state
//! - [`notify`]: user-facing toast notifications

pub mod favorites;
pub mod notify;
pub mod selection;

pub use favorites::{
    FavoriteItem, FavoritesStorage, FavoritesStore, JsonFileStorage, MemoryFavoritesStorage,
};
pub use notify::{NotifyStore, Toast, ToastKind};
pub use selection::SelectionStore;

use crate::types::Character;

/// Add every currently selected character to favorites.
///
/// With nothing selected this only emits an informational toast. Otherwise
/// the selected characters become favorites, the selection clears, and a
/// success toast reports the count. Returns how many were added.
pub fn add_selected_to_favorites(
    characters: &[Character],
    selection: &mut SelectionStore,
    favorites: &mut FavoritesStore,
    notify: &NotifyStore,
) -> usize {
    let chosen: Vec<FavoriteItem> = characters
        .iter()
        .filter(|c| selection.is_selected(c.id))
        .map(FavoriteItem::from)
        .collect();

    if chosen.is_empty() {
        notify.push(Toast::info("No characters selected"));
        return 0;
    }

    let added = chosen.len();
    favorites.add_many(chosen);
    selection.clear();
    let plural = if added > 1 { "s" } else { "" };
    notify.push(Toast::success(format!(
        "Added {added} character{plural} to favorites"
    )));
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::MockUpstreamClient;

    fn characters(count: u64) -> Vec<Character> {
        let client = MockUpstreamClient::new(count);
        (1..=count)
            .filter_map(|id| client.catalog_item(id))
            .collect()
    }

    #[test]
    fn test_bulk_add_moves_selection_into_favorites() {
        let items = characters(5);
        let mut selection = SelectionStore::new();
        let mut favorites = FavoritesStore::new();
        let (notify, mut toasts) = NotifyStore::channel();

        selection.select_many(&[2, 4]);
        let added = add_selected_to_favorites(&items, &mut selection, &mut favorites, &notify);

        assert_eq!(added, 2);
        assert!(favorites.is_favorite(2));
        assert!(favorites.is_favorite(4));
        assert_eq!(selection.count(), 0);

        let toast = toasts.try_recv().unwrap();
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "Added 2 characters to favorites");
    }

    #[test]
    fn test_bulk_add_with_empty_selection_only_notifies() {
        let items = characters(3);
        let mut selection = SelectionStore::new();
        let mut favorites = FavoritesStore::new();
        let (notify, mut toasts) = NotifyStore::channel();

        let added = add_selected_to_favorites(&items, &mut selection, &mut favorites, &notify);

        assert_eq!(added, 0);
        assert!(favorites.is_empty());
        assert_eq!(toasts.try_recv().unwrap().kind, ToastKind::Info);
    }

    #[test]
    fn test_singular_toast_grammar() {
        let items = characters(2);
        let mut selection = SelectionStore::new();
        let mut favorites = FavoritesStore::new();
        let (notify, mut toasts) = NotifyStore::channel();

        selection.toggle(1);
        add_selected_to_favorites(&items, &mut selection, &mut favorites, &notify);
        assert_eq!(
            toasts.try_recv().unwrap().message,
            "Added 1 character to favorites"
        );
    }
}
