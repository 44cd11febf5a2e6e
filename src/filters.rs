//! Filter state: debounced free-text search plus status and sort.

use tokio::time::Duration;

use crate::config::BrowseConfig;
use crate::debounce::Debouncer;
use crate::types::{CharacterFilters, FetchQuery, SortOrder, Status};

/// How a settled filter change affects downstream state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    /// Name or status changed: all fetched state is invalid.
    Invalidate,
    /// Only the sort changed: re-order the existing buffer, no network.
    Reorder,
}

/// Owns the raw and committed filter tuple.
///
/// The name field runs through a [`Debouncer`]; status and sort commit
/// immediately on the next [`settle`](Self::settle). Only the committed
/// tuple ever participates in fetching, and a new tuple is emitted only
/// when it actually differs from the previous one.
#[derive(Debug, Clone)]
pub struct FilterController {
    name: Debouncer<String>,
    status: Option<Status>,
    sort: SortOrder,
    committed: CharacterFilters,
    min_search_len: usize,
}

impl FilterController {
    /// Create a controller with empty filters.
    #[must_use]
    pub fn new(config: &BrowseConfig) -> Self {
        Self {
            name: Debouncer::new(String::new(), Duration::from_millis(config.debounce_ms)),
            status: None,
            sort: SortOrder::default(),
            committed: CharacterFilters::default(),
            min_search_len: config.min_search_len,
        }
    }

    /// Update the raw name input (keystroke level, not yet committed).
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name.set(name.into());
    }

    /// Update the status filter (takes effect on the next settle).
    pub fn set_status(&mut self, status: Option<Status>) {
        self.status = status;
    }

    /// Update the sort order (takes effect on the next settle).
    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    /// The raw (undebounced) name input.
    #[must_use]
    pub fn raw_name(&self) -> &str {
        self.name.raw()
    }

    /// The committed filter tuple currently in effect.
    #[must_use]
    pub fn filters(&self) -> &CharacterFilters {
        &self.committed
    }

    /// Wait out the name debounce window, then commit the canonical
    /// tuple. Returns how the tuple changed, or `None` if it did not.
    pub async fn settle(&mut self) -> Option<FilterChange> {
        self.name.settle().await;
        self.emit()
    }

    /// Commit immediately, skipping the debounce wait.
    pub fn commit_now(&mut self) -> Option<FilterChange> {
        self.name.commit_now();
        self.emit()
    }

    fn emit(&mut self) -> Option<FilterChange> {
        let candidate = CharacterFilters {
            name: self.name.committed().clone(),
            status: self.status,
            sort: self.sort,
        };
        if candidate == self.committed {
            return None;
        }
        let change = if self.committed.invalidates(&candidate) {
            FilterChange::Invalidate
        } else {
            FilterChange::Reorder
        };
        self.committed = candidate;
        Some(change)
    }

    /// Whether the committed filters are allowed to fetch. A non-empty
    /// name whose trimmed length falls short of the minimum blocks all
    /// fetching; empty-name or status-only filters never do.
    #[must_use]
    pub fn can_search(&self) -> bool {
        let name = &self.committed.name;
        name.is_empty() || name.trim().len() >= self.min_search_len
    }

    /// The canonical upstream query for the committed tuple.
    #[must_use]
    pub fn fetch_query(&self) -> FetchQuery {
        self.committed.fetch_query(self.min_search_len)
    }
}
