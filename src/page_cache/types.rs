//! Core data structures for the page-fetch cache.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::types::Character;

/// The deduplicated merge buffer of all items fetched under the current
/// filter.
///
/// Items are keyed by id; merging an id that is already present overwrites
/// the record in place and keeps its original position, matching the
/// semantics of an insertion-ordered map. Merge order is the display order
/// when no sort is applied.
#[derive(Debug, Clone, Default)]
pub struct ItemBuffer {
    order: Vec<u64>,
    items: HashMap<u64, Character>,
}

impl ItemBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of items, overwriting by id.
    pub fn merge(&mut self, batch: Vec<Character>) {
        for item in batch {
            if !self.items.contains_key(&item.id) {
                self.order.push(item.id);
            }
            self.items.insert(item.id, item);
        }
    }

    /// Whether an item with this id is buffered.
    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.items.contains_key(&id)
    }

    /// Look up a buffered item by id.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Character> {
        self.items.get(&id)
    }

    /// Number of distinct items buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the buffer holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Materialize the buffer as a list in merge order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Character> {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id).cloned())
            .collect()
    }

    /// Drop all items.
    pub fn clear(&mut self) {
        self.order.clear();
        self.items.clear();
    }
}

/// Counters describing cache behavior over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Upstream page requests actually issued.
    pub upstream_fetches: u64,
    /// Page requests satisfied from the fetched-page set without a network
    /// call.
    pub cache_hits: u64,
    /// Responses discarded because the cache generation moved on while
    /// they were in flight.
    pub stale_drops: u64,
    /// Number of invalidations.
    pub invalidations: u64,
}

/// Outcome of a single-page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFetch {
    /// The page was fetched and merged.
    Fetched {
        /// Total upstream pages reported by this response.
        total_upstream_pages: u32,
    },
    /// The page was already in the fetched set; no request was issued.
    Cached {
        /// Total upstream pages as currently known.
        total_upstream_pages: u32,
    },
    /// The response arrived after an invalidation and was discarded.
    Stale,
}

/// Outcome of covering one virtual page with upstream fetches.
#[derive(Debug)]
pub struct RangeOutcome {
    /// Total virtual page count derived from the known upstream total,
    /// floored at 1.
    pub virtual_pages: u32,
    /// Upstream pages the range needed that were not yet fetched.
    pub attempted: Vec<u32>,
    /// Pages whose fetch failed, with the cause. Failed pages stay out of
    /// the fetched set so a later call retries them.
    pub failures: Vec<(u32, UpstreamError)>,
}

impl RangeOutcome {
    /// Whether every attempted fetch failed (and at least one was needed).
    #[must_use]
    pub fn is_total_failure(&self) -> bool {
        !self.attempted.is_empty() && self.failures.len() == self.attempted.len()
    }
}
