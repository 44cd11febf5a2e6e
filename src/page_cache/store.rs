//! The page-fetch cache.
//!
//! Fetching is keyed by upstream page number, never by virtual page, so
//! two virtual pages that overlap the same upstream page never fetch it
//! twice. This is the central invariant the cache exists to preserve.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use futures::future::join_all;

use super::types::{CacheStats, ItemBuffer, PageFetch, RangeOutcome};
use crate::error::UpstreamError;
use crate::types::{Character, FetchQuery, PageSize, UPSTREAM_PAGE_SIZE};
use crate::upstream::UpstreamClient;

/// Inclusive range of upstream pages covering one virtual page.
///
/// Virtual item indices `[(vpage-1)*size, vpage*size)` map onto fixed-size
/// upstream pages of [`UPSTREAM_PAGE_SIZE`] items.
#[must_use]
pub fn upstream_range(virtual_page: u32, size: PageSize) -> (u32, u32) {
    let size = size.as_u32();
    let first_index = (virtual_page - 1) * size;
    let first = first_index / UPSTREAM_PAGE_SIZE + 1;
    let last = (virtual_page * size).div_ceil(UPSTREAM_PAGE_SIZE);
    (first, last)
}

/// Total virtual page count derived from the upstream page count.
///
/// The upstream total is only known in units of full pages, so the item
/// total is approximated as `total_upstream_pages * UPSTREAM_PAGE_SIZE`.
/// The result is floored at 1.
#[must_use]
pub fn virtual_page_count(total_upstream_pages: u32, size: PageSize) -> u32 {
    let approx_total_items = total_upstream_pages.saturating_mul(UPSTREAM_PAGE_SIZE);
    approx_total_items.div_ceil(size.as_u32()).max(1)
}

#[derive(Debug)]
struct CacheInner {
    buffer: ItemBuffer,
    fetched: BTreeSet<u32>,
    total_upstream_pages: u32,
    generation: u64,
    stats: CacheStats,
}

impl CacheInner {
    fn new() -> Self {
        Self {
            buffer: ItemBuffer::new(),
            fetched: BTreeSet::new(),
            total_upstream_pages: 1,
            generation: 0,
            stats: CacheStats::default(),
        }
    }
}

/// Owns the merge buffer, the set of upstream pages already retrieved, and
/// the known upstream page count.
///
/// All mutation routes through
/// [`fetch_upstream_page`](Self::fetch_upstream_page) and
/// [`invalidate`](Self::invalidate).
/// Every fetch captures the cache generation before touching the network;
/// a response that arrives after an invalidation is discarded instead of
/// merged, so a superseded filter can never pollute the current buffer.
#[derive(Clone)]
pub struct PageFetchCache {
    client: Arc<dyn UpstreamClient>,
    inner: Arc<RwLock<CacheInner>>,
}

impl PageFetchCache {
    /// Create a cache over the given upstream client.
    #[must_use]
    pub fn new(client: Arc<dyn UpstreamClient>) -> Self {
        Self {
            client,
            inner: Arc::new(RwLock::new(CacheInner::new())),
        }
    }

    /// Fetch one upstream page unless it is already in the fetched set.
    ///
    /// On success the returned items merge into the buffer by id, the page
    /// enters the fetched set, and the known upstream total updates. On
    /// failure nothing is mutated and the page stays out of the fetched
    /// set, so a retry re-attempts it.
    ///
    /// # Errors
    ///
    /// Propagates the upstream error for a failed request.
    pub async fn fetch_upstream_page(
        &self,
        page: u32,
        query: &FetchQuery,
    ) -> Result<PageFetch, UpstreamError> {
        let generation = {
            let mut inner = self.inner.write().expect("cache lock poisoned");
            if inner.fetched.contains(&page) {
                inner.stats.cache_hits += 1;
                return Ok(PageFetch::Cached {
                    total_upstream_pages: inner.total_upstream_pages,
                });
            }
            inner.generation
        };

        tracing::debug!(page, "fetching upstream page");
        let fetched = self.client.fetch_page(page, query).await?;

        let mut inner = self.inner.write().expect("cache lock poisoned");
        if inner.generation != generation {
            inner.stats.stale_drops += 1;
            tracing::debug!(page, "discarding stale upstream response");
            return Ok(PageFetch::Stale);
        }

        inner.stats.upstream_fetches += 1;
        inner.buffer.merge(fetched.items);
        inner.fetched.insert(page);
        inner.total_upstream_pages = fetched.total_pages;
        Ok(PageFetch::Fetched {
            total_upstream_pages: fetched.total_pages,
        })
    }

    /// Fetch every upstream page needed to cover one virtual page.
    ///
    /// Missing pages are fetched concurrently and joined with settle-all
    /// semantics: failures are collected per page and do not abort the
    /// pages that succeeded. The total virtual page count is recomputed
    /// from whichever fetch succeeded, or from the cached upstream total
    /// when the range was already fully fetched.
    pub async fn ensure_range_for_virtual_page(
        &self,
        virtual_page: u32,
        size: PageSize,
        query: &FetchQuery,
    ) -> RangeOutcome {
        let (first, last) = upstream_range(virtual_page, size);
        let attempted: Vec<u32> = {
            let inner = self.inner.read().expect("cache lock poisoned");
            (first..=last)
                .filter(|p| !inner.fetched.contains(p))
                .collect()
        };

        let results = join_all(
            attempted
                .iter()
                .map(|&p| self.fetch_upstream_page(p, query)),
        )
        .await;

        let mut failures = Vec::new();
        let mut settled_total = None;
        for (&page, result) in attempted.iter().zip(results) {
            match result {
                Ok(PageFetch::Fetched {
                    total_upstream_pages,
                }
                | PageFetch::Cached {
                    total_upstream_pages,
                }) => {
                    settled_total.get_or_insert(total_upstream_pages);
                }
                Ok(PageFetch::Stale) => {}
                Err(error) => {
                    tracing::warn!(page, %error, "upstream page fetch failed");
                    failures.push((page, error));
                }
            }
        }

        let total = settled_total.unwrap_or_else(|| self.total_upstream_pages());
        RangeOutcome {
            virtual_pages: virtual_page_count(total, size),
            attempted,
            failures,
        }
    }

    /// Reset buffer, fetched-page set, and totals, and advance the
    /// generation so in-flight responses are discarded on arrival.
    pub fn invalidate(&self) {
        let mut inner = self.inner.write().expect("cache lock poisoned");
        inner.buffer.clear();
        inner.fetched.clear();
        inner.total_upstream_pages = 1;
        inner.generation += 1;
        inner.stats.invalidations += 1;
    }

    /// Materialize the buffer in merge order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Character> {
        self.inner
            .read()
            .expect("cache lock poisoned")
            .buffer
            .to_vec()
    }

    /// Look up one buffered item by id.
    #[must_use]
    pub fn item(&self, id: u64) -> Option<Character> {
        self.inner
            .read()
            .expect("cache lock poisoned")
            .buffer
            .get(id)
            .cloned()
    }

    /// Number of distinct buffered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().expect("cache lock poisoned").buffer.len()
    }

    /// Whether the buffer holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of upstream pages in the fetched set.
    #[must_use]
    pub fn fetched_count(&self) -> usize {
        self.inner.read().expect("cache lock poisoned").fetched.len()
    }

    /// Whether an upstream page is in the fetched set.
    #[must_use]
    pub fn contains_page(&self, page: u32) -> bool {
        self.inner
            .read()
            .expect("cache lock poisoned")
            .fetched
            .contains(&page)
    }

    /// Known total number of upstream pages (1 until a fetch reports it).
    #[must_use]
    pub fn total_upstream_pages(&self) -> u32 {
        self.inner
            .read()
            .expect("cache lock poisoned")
            .total_upstream_pages
    }

    /// Lifetime cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.read().expect("cache lock poisoned").stats
    }
}

impl std::fmt::Debug for PageFetchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().expect("cache lock poisoned");
        f.debug_struct("PageFetchCache")
            .field("len", &inner.buffer.len())
            .field("fetched", &inner.fetched)
            .field("total_upstream_pages", &inner.total_upstream_pages)
            .field("generation", &inner.generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::MockUpstreamClient;
    use tokio::sync::Notify;

    fn cache_over(total: u64) -> (PageFetchCache, Arc<MockUpstreamClient>) {
        let client = Arc::new(MockUpstreamClient::new(total));
        (PageFetchCache::new(client.clone()), client)
    }

    #[test]
    fn test_upstream_range_worked_examples() {
        // Items 21..=30 lie entirely in upstream page 2.
        assert_eq!(upstream_range(3, PageSize::Ten), (2, 2));
        // Items 51..=100 span upstream pages 3, 4 and 5.
        assert_eq!(upstream_range(2, PageSize::Fifty), (3, 5));
        // A 50-sized virtual page always spans at least three pages.
        assert_eq!(upstream_range(1, PageSize::Fifty), (1, 3));
        assert_eq!(upstream_range(1, PageSize::Twenty), (1, 1));
        assert_eq!(upstream_range(2, PageSize::Ten), (1, 1));
    }

    #[test]
    fn test_virtual_page_count_derivation() {
        // 3 upstream pages of 20 items: 60 items total.
        assert_eq!(virtual_page_count(3, PageSize::Twenty), 3);
        assert_eq!(virtual_page_count(3, PageSize::Fifty), 2);
        assert_eq!(virtual_page_count(3, PageSize::Ten), 6);
        // Unknown or empty totals floor at one virtual page.
        assert_eq!(virtual_page_count(0, PageSize::Twenty), 1);
    }

    #[tokio::test]
    async fn test_fetch_is_at_most_once_per_page() {
        let (cache, client) = cache_over(60);
        let query = FetchQuery::default();

        let first = cache.fetch_upstream_page(1, &query).await.unwrap();
        assert_eq!(
            first,
            PageFetch::Fetched {
                total_upstream_pages: 3
            }
        );

        let second = cache.fetch_upstream_page(1, &query).await.unwrap();
        assert_eq!(
            second,
            PageFetch::Cached {
                total_upstream_pages: 3
            }
        );

        assert_eq!(client.request_count(), 1);
        assert_eq!(cache.len(), 20);
        assert_eq!(cache.stats().cache_hits, 1);
        assert_eq!(cache.stats().upstream_fetches, 1);
    }

    #[tokio::test]
    async fn test_ensure_range_fetches_only_missing_pages() {
        let (cache, client) = cache_over(100);
        let query = FetchQuery::default();

        let outcome = cache
            .ensure_range_for_virtual_page(1, PageSize::Fifty, &query)
            .await;
        assert_eq!(outcome.attempted, vec![1, 2, 3]);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.virtual_pages, 2);
        assert_eq!(cache.len(), 60);

        // Virtual page 2 overlaps upstream page 3, which is already
        // fetched; only pages 4 and 5 go to the network.
        let outcome = cache
            .ensure_range_for_virtual_page(2, PageSize::Fifty, &query)
            .await;
        assert_eq!(outcome.attempted, vec![4, 5]);
        assert_eq!(cache.len(), 100);
        assert_eq!(client.request_count(), 5);
    }

    #[tokio::test]
    async fn test_fully_cached_range_issues_no_requests() {
        let (cache, client) = cache_over(60);
        let query = FetchQuery::default();

        cache
            .ensure_range_for_virtual_page(1, PageSize::Twenty, &query)
            .await;
        let before = client.request_count();

        let outcome = cache
            .ensure_range_for_virtual_page(1, PageSize::Twenty, &query)
            .await;
        assert!(outcome.attempted.is_empty());
        assert_eq!(outcome.virtual_pages, 3);
        assert_eq!(client.request_count(), before);
    }

    #[tokio::test]
    async fn test_failed_page_stays_out_of_fetched_set() {
        let client = Arc::new(MockUpstreamClient::new(60).with_failing_page(2));
        let cache = PageFetchCache::new(client.clone());
        let query = FetchQuery::default();

        let outcome = cache
            .ensure_range_for_virtual_page(1, PageSize::Fifty, &query)
            .await;
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, 2);
        assert!(!outcome.is_total_failure());
        // Successes were kept and the virtual total still derived.
        assert_eq!(cache.len(), 40);
        assert!(cache.contains_page(1));
        assert!(!cache.contains_page(2));
        assert_eq!(outcome.virtual_pages, 2);

        // Retry re-attempts only the failed page.
        client.clear_failures();
        let outcome = cache
            .ensure_range_for_virtual_page(1, PageSize::Fifty, &query)
            .await;
        assert_eq!(outcome.attempted, vec![2]);
        assert!(outcome.failures.is_empty());
        assert_eq!(cache.len(), 60);
    }

    #[tokio::test]
    async fn test_total_failure_is_detectable() {
        let client = Arc::new(
            MockUpstreamClient::new(60)
                .with_failing_page(1)
                .with_failing_page(2),
        );
        let cache = PageFetchCache::new(client);

        let outcome = cache
            .ensure_range_for_virtual_page(2, PageSize::Twenty, &FetchQuery::default())
            .await;
        assert!(outcome.is_total_failure());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_resets_everything() {
        let (cache, _client) = cache_over(60);
        let query = FetchQuery::default();
        cache.fetch_upstream_page(1, &query).await.unwrap();
        assert_eq!(cache.len(), 20);

        cache.invalidate();
        assert!(cache.is_empty());
        assert_eq!(cache.fetched_count(), 0);
        assert_eq!(cache.total_upstream_pages(), 1);
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let gate = Arc::new(Notify::new());
        let client = Arc::new(MockUpstreamClient::new(60).with_gate(gate.clone()));
        let cache = PageFetchCache::new(client);

        let worker = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .fetch_upstream_page(1, &FetchQuery::default())
                    .await
                    .unwrap()
            })
        };
        // Let the fetch reach the gate, then supersede it.
        tokio::task::yield_now().await;
        cache.invalidate();
        gate.notify_one();

        let outcome = worker.await.unwrap();
        assert_eq!(outcome, PageFetch::Stale);
        assert!(cache.is_empty());
        assert_eq!(cache.fetched_count(), 0);
        assert_eq!(cache.stats().stale_drops, 1);
    }

    #[tokio::test]
    async fn test_no_match_filter_is_an_empty_success() {
        let (cache, _client) = cache_over(60);
        let query = FetchQuery {
            name: Some("does-not-exist".to_string()),
            status: None,
        };

        let outcome = cache.fetch_upstream_page(1, &query).await.unwrap();
        assert_eq!(
            outcome,
            PageFetch::Fetched {
                total_upstream_pages: 0
            }
        );
        assert!(cache.is_empty());
        assert!(cache.contains_page(1));
    }
}
