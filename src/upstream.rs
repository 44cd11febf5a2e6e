//! Upstream catalog client.
//!
//! The [`UpstreamClient`] trait is the seam between the page cache and the
//! network. [`HttpUpstreamClient`] talks to the real catalog over HTTP;
//! [`MockUpstreamClient`] serves a deterministic in-memory catalog for
//! tests and offline exploration.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::types::{
    Character, CharactersResponse, FetchQuery, LocationRef, Status, UpstreamPage,
    UPSTREAM_PAGE_SIZE,
};

/// A client for the upstream catalog.
///
/// Implementations must be `Send + Sync`; the page cache issues concurrent
/// page fetches against a shared client.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetch one fixed-size upstream page under the given filter.
    ///
    /// A "no matches" condition is not an error: implementations return
    /// [`UpstreamPage::empty`] for it.
    ///
    /// # Errors
    ///
    /// Returns an error when the upstream is unreachable, answers with an
    /// unexpected status, or sends a malformed body.
    async fn fetch_page(&self, page: u32, query: &FetchQuery)
        -> Result<UpstreamPage, UpstreamError>;

    /// Fetch a single item by id.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::NotFound`] for an unknown id, or a
    /// transport/status error otherwise.
    async fn fetch_character(&self, id: u64) -> Result<Character, UpstreamError>;
}

/// HTTP implementation of [`UpstreamClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpUpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUpstreamClient {
    /// Build a client from the upstream configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Query parameters for a page request. The name filter is already
    /// length-gated by [`FetchQuery`] construction.
    fn page_params(page: u32, query: &FetchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", page.to_string())];
        if let Some(name) = &query.name {
            params.push(("name", name.clone()));
        }
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }
        params
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn fetch_page(
        &self,
        page: u32,
        query: &FetchQuery,
    ) -> Result<UpstreamPage, UpstreamError> {
        let url = format!("{}/character", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&Self::page_params(page, query))
            .send()
            .await?;

        // The upstream answers 404 with an error body when nothing matches
        // the filter; normalize that to a valid zero-item page.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(UpstreamPage::empty());
        }
        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                status: response.status().as_u16(),
                resource: format!("page {page}"),
            });
        }

        let body: CharactersResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;
        Ok(body.into())
    }

    async fn fetch_character(&self, id: u64) -> Result<Character, UpstreamError> {
        let url = format!("{}/character/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound(id));
        }
        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                status: response.status().as_u16(),
                resource: format!("character {id}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

/// A deterministic in-memory catalog for testing without a network.
///
/// The mock honors name-substring and status filtering, paginates by the
/// fixed upstream page size, records every requested page number, and can
/// inject per-page failures or hold requests at a gate so tests can
/// interleave other operations with an in-flight fetch.
pub struct MockUpstreamClient {
    catalog: Vec<Character>,
    requests: Mutex<Vec<u32>>,
    fail_pages: Mutex<HashSet<u32>>,
    gate: Option<Arc<Notify>>,
}

impl MockUpstreamClient {
    /// Create a mock catalog with `total` generated characters.
    ///
    /// Ids run from 1 to `total`; statuses cycle Alive, Dead, Unknown.
    #[must_use]
    pub fn new(total: u64) -> Self {
        let catalog = (1..=total).map(Self::generate_character).collect();
        Self {
            catalog,
            requests: Mutex::new(Vec::new()),
            fail_pages: Mutex::new(HashSet::new()),
            gate: None,
        }
    }

    /// Make requests for the given upstream page fail with a 500 until
    /// [`clear_failures`](Self::clear_failures) is called.
    #[must_use]
    pub fn with_failing_page(self, page: u32) -> Self {
        self.fail_pages
            .lock()
            .expect("fail page lock poisoned")
            .insert(page);
        self
    }

    /// Hold every page request at `gate` until the gate is notified.
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Stop failing previously failing pages.
    pub fn clear_failures(&self) {
        self.fail_pages
            .lock()
            .expect("fail page lock poisoned")
            .clear();
    }

    /// Every upstream page number requested so far, in request order.
    #[must_use]
    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    /// Total number of page requests issued so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("request log poisoned").len()
    }

    /// Look up a generated catalog record without going through the
    /// client interface.
    #[must_use]
    pub fn catalog_item(&self, id: u64) -> Option<Character> {
        self.catalog.iter().find(|c| c.id == id).cloned()
    }

    fn generate_character(id: u64) -> Character {
        let status = match id % 3 {
            0 => Status::Unknown,
            1 => Status::Alive,
            _ => Status::Dead,
        };
        #[allow(clippy::cast_possible_wrap)]
        let created: DateTime<Utc> =
            DateTime::UNIX_EPOCH + chrono::Duration::seconds(1_500_000_000 + id as i64);
        let unknown = LocationRef {
            name: "unknown".to_string(),
            url: String::new(),
        };
        Character {
            id,
            name: format!("Character {id:04}"),
            status,
            species: "Human".to_string(),
            kind: String::new(),
            gender: "unknown".to_string(),
            origin: unknown.clone(),
            location: unknown,
            image: format!("https://example.test/avatar/{id}.jpeg"),
            episode: Vec::new(),
            url: format!("https://example.test/character/{id}"),
            created,
        }
    }

    fn matching(&self, query: &FetchQuery) -> Vec<Character> {
        let needle = query.name.as_deref().map(str::to_lowercase);
        self.catalog
            .iter()
            .filter(|c| {
                needle
                    .as_deref()
                    .map_or(true, |n| c.name.to_lowercase().contains(n))
                    && query.status.map_or(true, |s| c.status == s)
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UpstreamClient for MockUpstreamClient {
    async fn fetch_page(
        &self,
        page: u32,
        query: &FetchQuery,
    ) -> Result<UpstreamPage, UpstreamError> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(page);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self
            .fail_pages
            .lock()
            .expect("fail page lock poisoned")
            .contains(&page)
        {
            return Err(UpstreamError::Status {
                status: 500,
                resource: format!("page {page}"),
            });
        }

        let matching = self.matching(query);
        let total_count = u32::try_from(matching.len()).unwrap_or(u32::MAX);
        let total_pages = total_count.div_ceil(UPSTREAM_PAGE_SIZE);

        // Out-of-range pages are a 404 on the real upstream; normalized
        // to the empty page here as well.
        if page == 0 || page > total_pages {
            return Ok(UpstreamPage::empty());
        }

        let start = ((page - 1) * UPSTREAM_PAGE_SIZE) as usize;
        let end = (start + UPSTREAM_PAGE_SIZE as usize).min(matching.len());
        Ok(UpstreamPage {
            items: matching[start..end].to_vec(),
            total_pages,
            total_count,
        })
    }

    async fn fetch_character(&self, id: u64) -> Result<Character, UpstreamError> {
        self.catalog
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(UpstreamError::NotFound(id))
    }
}
