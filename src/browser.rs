//! The catalog browser: orchestration of filters, pagination and cache.
//!
//! [`CatalogBrowser`] is the top-level entry point. It owns a
//! [`FilterController`], a [`PaginationController`] and a
//! [`PageFetchCache`], and turns every externally observed state change
//! into an explicit action (invalidate, ensure range, fetch next, or
//! nothing) instead of relying on reactive re-evaluation order.
//!
//! ```rust,ignore
//! use pagescope::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PageScopeError> {
//!     let config = PageScopeConfig::default();
//!     let mut browser = CatalogBrowser::over_http(&config)?;
//!
//!     browser.refresh().await?;
//!     browser.set_name("rick");
//!     browser.refresh().await?;
//!
//!     for character in browser.display_items() {
//!         println!("{} ({})", character.name, character.status);
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use crate::config::PageScopeConfig;
use crate::error::{PageScopeError, UpstreamError};
use crate::filters::{FilterChange, FilterController};
use crate::page_cache::{CacheStats, PageFetchCache};
use crate::pagination::PaginationController;
use crate::types::{Character, CharacterFilters, PageSize, SortOrder, Status};
use crate::upstream::{HttpUpstreamClient, UpstreamClient};

/// Browses a paginated upstream catalog under bounded or infinite
/// pagination, with debounced search and client-side page caching.
#[derive(Debug)]
pub struct CatalogBrowser {
    cache: PageFetchCache,
    filters: FilterController,
    pagination: PaginationController,
    virtual_pages: u32,
    loading: bool,
    last_error: Option<String>,
}

impl CatalogBrowser {
    /// Create a browser over an arbitrary upstream client.
    #[must_use]
    pub fn new(client: Arc<dyn UpstreamClient>, config: &PageScopeConfig) -> Self {
        Self {
            cache: PageFetchCache::new(client),
            filters: FilterController::new(&config.browse),
            pagination: PaginationController::new(
                config.browse.initial_page_size,
                config.browse.initial_infinite,
            ),
            virtual_pages: 1,
            loading: false,
            last_error: None,
        }
    }

    /// Create a browser over the configured HTTP upstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn over_http(config: &PageScopeConfig) -> Result<Self, PageScopeError> {
        let client = HttpUpstreamClient::new(&config.upstream)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Update the raw name filter. Takes effect on the next
    /// [`refresh`](Self::refresh), after the debounce window.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.filters.set_name(name);
    }

    /// Update the status filter. Takes effect on the next refresh.
    pub fn set_status(&mut self, status: Option<Status>) {
        self.filters.set_status(status);
    }

    /// Update the sort order. Takes effect on the next refresh; never
    /// triggers network activity.
    pub fn set_sort(&mut self, sort: SortOrder) {
        self.filters.set_sort(sort);
    }

    /// Settle pending filter input and perform whatever load the settled
    /// state requires.
    ///
    /// A name/status change invalidates all fetched state and returns to
    /// page 1 before loading. A sort-only change re-orders in memory and
    /// loads nothing. No change at all still ensures the current view is
    /// covered (the initial load path); already-covered views cost no
    /// requests.
    ///
    /// # Errors
    ///
    /// Propagates a fully failed load; see [`load`](Self::load).
    pub async fn refresh(&mut self) -> Result<(), PageScopeError> {
        match self.filters.settle().await {
            Some(FilterChange::Invalidate) => {
                self.cache.invalidate();
                self.pagination.reset_page();
                self.virtual_pages = 1;
                self.load().await
            }
            Some(FilterChange::Reorder) => Ok(()),
            None => self.load().await,
        }
    }

    /// Go to a virtual page. Out-of-range requests are silently ignored.
    ///
    /// # Errors
    ///
    /// Propagates a fully failed load for the new page.
    pub async fn go_to_page(&mut self, page: u32) -> Result<(), PageScopeError> {
        if self.pagination.set_page(page, self.virtual_pages) {
            self.load().await
        } else {
            Ok(())
        }
    }

    /// Change the virtual page size (bounded mode only). Fetched upstream
    /// pages remain valid; only missing coverage is fetched.
    ///
    /// # Errors
    ///
    /// Propagates a fully failed load for the re-derived view.
    pub async fn set_page_size(&mut self, size: PageSize) -> Result<(), PageScopeError> {
        if self.pagination.set_page_size(size) {
            self.load().await
        } else {
            Ok(())
        }
    }

    /// Toggle infinite accumulation mode. Any actual toggle resets to
    /// page 1 and invalidates fetched state.
    ///
    /// # Errors
    ///
    /// Propagates a fully failed initial load in the new mode.
    pub async fn set_infinite(&mut self, infinite: bool) -> Result<(), PageScopeError> {
        if self.pagination.set_infinite(infinite) {
            self.cache.invalidate();
            self.virtual_pages = 1;
            self.load().await
        } else {
            Ok(())
        }
    }

    /// Run the load appropriate to the current mode.
    ///
    /// Bounded mode ensures the upstream pages covering the current
    /// virtual page; infinite mode fetches upstream page 1 if nothing is
    /// fetched yet. When the searchability gate blocks, this is a no-op
    /// with no error. There is no automatic retry; calling `load` again
    /// re-attempts exactly the missing pages.
    ///
    /// # Errors
    ///
    /// Returns an error when every required fetch failed. If nothing at
    /// all is fetched afterwards, buffer and page count reset. A partial
    /// failure keeps the merged successes, records a message retrievable
    /// via [`last_error`](Self::last_error), and returns `Ok`.
    pub async fn load(&mut self) -> Result<(), PageScopeError> {
        if !self.filters.can_search() {
            self.last_error = None;
            return Ok(());
        }

        self.loading = true;
        self.last_error = None;
        let query = self.filters.fetch_query();

        let result = if self.pagination.infinite() {
            if self.cache.fetched_count() == 0 {
                self.cache
                    .fetch_upstream_page(1, &query)
                    .await
                    .map(|_| ())
                    .map_err(PageScopeError::from)
            } else {
                Ok(())
            }
        } else {
            let outcome = self
                .cache
                .ensure_range_for_virtual_page(
                    self.pagination.page(),
                    self.pagination.page_size(),
                    &query,
                )
                .await;
            if outcome.is_total_failure() {
                let first = outcome
                    .failures
                    .into_iter()
                    .map(|(_, error)| error)
                    .next()
                    .unwrap_or(UpstreamError::Decode("no failure recorded".to_string()));
                Err(PageScopeError::AllPagesFailed { first })
            } else {
                self.virtual_pages = outcome.virtual_pages;
                if let Some((page, error)) = outcome.failures.first() {
                    tracing::warn!(page, %error, "partial page load failure");
                    self.last_error = Some(error.to_string());
                }
                Ok(())
            }
        };
        self.loading = false;

        if let Err(error) = &result {
            self.last_error = Some(error.to_string());
            // A load that leaves nothing fetched resets the view to a
            // clean empty state; earlier successful pages are kept so a
            // retry only re-attempts what failed.
            if self.cache.fetched_count() == 0 {
                self.cache.invalidate();
                self.virtual_pages = 1;
            }
        }
        result
    }

    /// Fetch the next unfetched upstream page (infinite mode only).
    ///
    /// No-op when bounded, blocked by the search gate, already loading,
    /// or there is nothing more to fetch.
    ///
    /// # Errors
    ///
    /// Propagates the fetch failure; the buffer keeps what it has.
    pub async fn load_more(&mut self) -> Result<(), PageScopeError> {
        if !self.pagination.infinite()
            || !self.filters.can_search()
            || self.loading
            || !self.has_more()
        {
            return Ok(());
        }

        self.loading = true;
        self.last_error = None;
        let query = self.filters.fetch_query();
        let next = u32::try_from(self.cache.fetched_count()).unwrap_or(u32::MAX - 1) + 1;
        let result = self.cache.fetch_upstream_page(next, &query).await;
        self.loading = false;

        match result {
            Ok(_) => Ok(()),
            Err(error) => {
                self.last_error = Some(error.to_string());
                Err(error.into())
            }
        }
    }

    /// The items to display for the current mode: the whole sorted buffer
    /// in infinite mode, the current virtual-page slice otherwise.
    #[must_use]
    pub fn display_items(&self) -> Vec<Character> {
        let sorted = self.sorted_buffer();
        if self.pagination.infinite() {
            return sorted;
        }
        let size = self.pagination.page_size().as_u32() as usize;
        let start = (self.pagination.page() as usize - 1) * size;
        sorted.into_iter().skip(start).take(size).collect()
    }

    /// The whole merged buffer under the committed sort order. A stable
    /// lexicographic compare on name; `SortOrder::None` preserves merge
    /// order.
    #[must_use]
    pub fn sorted_buffer(&self) -> Vec<Character> {
        let mut items = self.cache.snapshot();
        match self.filters.filters().sort {
            SortOrder::None => {}
            SortOrder::NameAsc => items.sort_by(|a, b| a.name.cmp(&b.name)),
            SortOrder::NameDesc => items.sort_by(|a, b| b.name.cmp(&a.name)),
        }
        items
    }

    /// Total virtual page count under the current page size, floored at 1.
    #[must_use]
    pub const fn pages(&self) -> u32 {
        self.virtual_pages
    }

    /// Current virtual page (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.pagination.page()
    }

    /// Current virtual page size.
    #[must_use]
    pub const fn page_size(&self) -> PageSize {
        self.pagination.page_size()
    }

    /// Whether infinite accumulation mode is active.
    #[must_use]
    pub const fn infinite(&self) -> bool {
        self.pagination.infinite()
    }

    /// Whether more upstream pages remain to accumulate (infinite mode).
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.pagination.infinite()
            && u32::try_from(self.cache.fetched_count()).unwrap_or(u32::MAX)
                < self.cache.total_upstream_pages()
    }

    /// Whether the committed filters are allowed to fetch.
    #[must_use]
    pub fn can_search(&self) -> bool {
        self.filters.can_search()
    }

    /// The committed filter tuple.
    #[must_use]
    pub fn filters(&self) -> &CharacterFilters {
        self.filters.filters()
    }

    /// Number of distinct buffered items.
    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.cache.len()
    }

    /// Look up a buffered item by id.
    #[must_use]
    pub fn buffered_item(&self, id: u64) -> Option<Character> {
        self.cache.item(id)
    }

    /// Human-readable message for the most recent failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether a load is currently executing.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Lifetime cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
