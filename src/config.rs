//! Configuration management for `PageScope`.

use serde::{Deserialize, Serialize};

use crate::types::PageSize;

/// Global configuration for `PageScope`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageScopeConfig {
    /// Upstream endpoint configuration.
    pub upstream: UpstreamConfig,
    /// Browsing behavior configuration.
    pub browse: BrowseConfig,
}

impl PageScopeConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the upstream configuration.
    #[must_use]
    pub fn with_upstream(mut self, upstream: UpstreamConfig) -> Self {
        self.upstream = upstream;
        self
    }

    /// Set the browsing configuration.
    #[must_use]
    pub fn with_browse(mut self, browse: BrowseConfig) -> Self {
        self.browse = browse;
        self
    }
}

/// Configuration for the upstream catalog endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://rickandmortyapi.com/api".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl UpstreamConfig {
    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout in milliseconds.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Configuration for browsing behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Quiescence window for the free-text name filter, in milliseconds.
    pub debounce_ms: u64,
    /// Minimum trimmed length for a non-empty name filter to be searchable.
    pub min_search_len: usize,
    /// Virtual page size at startup.
    pub initial_page_size: PageSize,
    /// Whether infinite accumulation mode is active at startup.
    pub initial_infinite: bool,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_search_len: 2,
            initial_page_size: PageSize::Twenty,
            initial_infinite: false,
        }
    }
}

impl BrowseConfig {
    /// Set the debounce window in milliseconds.
    #[must_use]
    pub const fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Set the minimum searchable name length.
    #[must_use]
    pub const fn with_min_search_len(mut self, min_search_len: usize) -> Self {
        self.min_search_len = min_search_len;
        self
    }

    /// Set the initial virtual page size.
    #[must_use]
    pub const fn with_initial_page_size(mut self, size: PageSize) -> Self {
        self.initial_page_size = size;
        self
    }

    /// Set the initial pagination mode.
    #[must_use]
    pub const fn with_initial_infinite(mut self, infinite: bool) -> Self {
        self.initial_infinite = infinite;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PageScopeConfig::default();
        assert_eq!(config.upstream.base_url, "https://rickandmortyapi.com/api");
        assert_eq!(config.upstream.timeout_ms, 10_000);
        assert_eq!(config.browse.debounce_ms, 300);
        assert_eq!(config.browse.min_search_len, 2);
        assert_eq!(config.browse.initial_page_size, PageSize::Twenty);
        assert!(!config.browse.initial_infinite);
    }

    #[test]
    fn test_config_builder() {
        let config = PageScopeConfig::new()
            .with_upstream(
                UpstreamConfig::default()
                    .with_base_url("http://localhost:8080/api")
                    .with_timeout_ms(500),
            )
            .with_browse(
                BrowseConfig::default()
                    .with_debounce_ms(50)
                    .with_initial_infinite(true),
            );

        assert_eq!(config.upstream.base_url, "http://localhost:8080/api");
        assert_eq!(config.upstream.timeout_ms, 500);
        assert_eq!(config.browse.debounce_ms, 50);
        assert!(config.browse.initial_infinite);
    }

    #[test]
    fn test_config_serialization() {
        let config = PageScopeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PageScopeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.upstream.base_url, parsed.upstream.base_url);
        assert_eq!(config.browse.debounce_ms, parsed.browse.debounce_ms);
    }
}
