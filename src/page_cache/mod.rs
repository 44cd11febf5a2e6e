//! Page-fetch cache: virtual pages over a fixed-page upstream.
//!
//! The upstream serves immutable pages of exactly
//! [`UPSTREAM_PAGE_SIZE`](crate::types::UPSTREAM_PAGE_SIZE) items, while
//! users browse virtual pages of 10, 20 or 50. A single virtual page can
//! therefore require anywhere from zero to three upstream fetches. This
//! module owns the reconciliation between the two page spaces:
//!
//! - [`types`]: the id-keyed [`ItemBuffer`], [`CacheStats`], and the
//!   [`PageFetch`] / [`RangeOutcome`] result types
//! - [`store`]: the [`PageFetchCache`] itself plus the pure page math
//!   ([`upstream_range`], [`virtual_page_count`])
//!
//! Fetching is keyed by upstream page number; overlapping virtual pages
//! share already-fetched pages, and failed pages stay eligible for retry.
//! Invalidation advances a generation counter so responses from a
//! superseded filter are discarded instead of merged.

pub mod store;
pub mod types;

pub use store::{upstream_range, virtual_page_count, PageFetchCache};
pub use types::{CacheStats, ItemBuffer, PageFetch, RangeOutcome};
