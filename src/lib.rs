//! `PageScope` - client-side virtual pagination over a fixed-page catalog.
//!
//! `PageScope` lets a caller browse a large, externally hosted character
//! catalog under two consumption modes - bounded "page N of M" browsing
//! with a configurable page size, and open-ended infinite accumulation -
//! with free-text search and status filtering on top. The upstream only
//! serves fixed pages of 20 items, so every other page size and all
//! accumulation semantics are synthesized client-side by the
//! [`page_cache`] module.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pagescope::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PageScopeError> {
//!     let config = PageScopeConfig::default();
//!     let mut browser = CatalogBrowser::over_http(&config)?;
//!
//!     // Initial load of virtual page 1.
//!     browser.refresh().await?;
//!
//!     // Debounced search: the name commits after 300ms of quiescence.
//!     browser.set_name("rick");
//!     browser.set_status(Some(Status::Alive));
//!     browser.refresh().await?;
//!
//!     // Navigate; overlapping upstream pages are never fetched twice.
//!     browser.set_page_size(PageSize::Fifty).await?;
//!     browser.go_to_page(2).await?;
//!
//!     for character in browser.display_items() {
//!         println!("{} ({})", character.name, character.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! user input
//!   │
//!   ▼
//! ┌───────────────────┐   ┌───────────────────────┐
//! │ FilterController  │   │ PaginationController  │
//! │ (debounced name)  │   │ (page, size, mode)    │
//! └─────────┬─────────┘   └──────────┬────────────┘
//!           │                        │
//!           ▼                        ▼
//!        ┌──────────────────────────────┐
//!        │        CatalogBrowser        │  ← computes the required action
//!        └──────────────┬───────────────┘
//!                       ▼
//!        ┌──────────────────────────────┐
//!        │        PageFetchCache        │  ← at most one fetch per page
//!        └──────────────┬───────────────┘
//!                       ▼
//!        ┌──────────────────────────────┐
//!        │        UpstreamClient        │  ← fixed pages of 20 items
//!        └──────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filters;
pub mod page_cache;
pub mod pagination;
pub mod stores;
pub mod types;
pub mod upstream;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::browser::CatalogBrowser;
    pub use crate::config::{BrowseConfig, PageScopeConfig, UpstreamConfig};
    pub use crate::debounce::Debouncer;
    pub use crate::error::{PageScopeError, StoreError, UpstreamError};
    pub use crate::filters::{FilterChange, FilterController};
    pub use crate::page_cache::{
        upstream_range, virtual_page_count, CacheStats, ItemBuffer, PageFetch, PageFetchCache,
        RangeOutcome,
    };
    pub use crate::pagination::PaginationController;
    pub use crate::stores::{
        add_selected_to_favorites, FavoriteItem, FavoritesStorage, FavoritesStore,
        JsonFileStorage, MemoryFavoritesStorage, NotifyStore, SelectionStore, Toast, ToastKind,
    };
    pub use crate::types::{
        ApiInfo, Character, CharacterFilters, CharactersResponse, FetchQuery, LocationRef,
        PageSize, SortOrder, Status, UpstreamPage, UPSTREAM_PAGE_SIZE,
    };
    pub use crate::upstream::{HttpUpstreamClient, MockUpstreamClient, UpstreamClient};
}
