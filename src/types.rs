//! Core data structures for `PageScope`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of items per page as served by the upstream catalog.
///
/// The upstream cannot be asked for a different page size; every other
/// page size in this crate is synthesized on top of this one.
pub const UPSTREAM_PAGE_SIZE: u32 = 20;

/// Life status of a character as reported by the upstream catalog.
///
/// The upstream spells the third variant lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// The character is alive.
    Alive,
    /// The character is dead.
    Dead,
    /// The upstream does not know.
    #[serde(rename = "unknown")]
    Unknown,
}

impl Status {
    /// Wire representation, suitable for a query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alive => "Alive",
            Self::Dead => "Dead",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named reference to a location resource on the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    /// Human-readable location name.
    pub name: String,
    /// Resource URL (empty for the "unknown" location).
    pub url: String,
}

/// One catalog record. Identity is the integer `id`; records are treated
/// as immutable once fetched (re-fetching the same id overwrites in place).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Unique upstream-assigned identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Life status.
    pub status: Status,
    /// Species label.
    pub species: String,
    /// Sub-type label; frequently empty. Named `type` on the wire.
    #[serde(rename = "type")]
    pub kind: String,
    /// Gender label.
    pub gender: String,
    /// Origin location reference.
    pub origin: LocationRef,
    /// Last known location reference.
    pub location: LocationRef,
    /// Portrait image URL.
    pub image: String,
    /// Episode resource URLs the character appears in.
    pub episode: Vec<String>,
    /// Canonical resource URL.
    pub url: String,
    /// Creation timestamp of the upstream record.
    pub created: DateTime<Utc>,
}

/// Pagination metadata attached to every upstream page response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    /// Total number of matching items.
    pub count: u32,
    /// Total number of upstream pages.
    pub pages: u32,
    /// URL of the next page, if any.
    pub next: Option<String>,
    /// URL of the previous page, if any.
    pub prev: Option<String>,
}

/// The raw upstream response envelope for a page query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharactersResponse {
    /// Pagination metadata.
    pub info: ApiInfo,
    /// Items on this page.
    pub results: Vec<Character>,
}

/// One fixed-size upstream page as consumed by the page cache.
#[derive(Debug, Clone)]
pub struct UpstreamPage {
    /// Items on this page (up to [`UPSTREAM_PAGE_SIZE`]).
    pub items: Vec<Character>,
    /// Total number of upstream pages under the current filter.
    pub total_pages: u32,
    /// Total number of matching items under the current filter.
    pub total_count: u32,
}

impl UpstreamPage {
    /// The normalized "no matches" page. The upstream signals this case
    /// with a 404; callers must never see it as an error.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
            total_count: 0,
        }
    }
}

impl From<CharactersResponse> for UpstreamPage {
    fn from(resp: CharactersResponse) -> Self {
        Self {
            items: resp.results,
            total_pages: resp.info.pages,
            total_count: resp.info.count,
        }
    }
}

/// Buffer ordering applied before display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Preserve fetch/merge order.
    #[default]
    #[serde(rename = "none")]
    None,
    /// Ascending lexicographic by name.
    #[serde(rename = "az")]
    NameAsc,
    /// Descending lexicographic by name.
    #[serde(rename = "za")]
    NameDesc,
}

/// A user-selectable virtual page size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    /// Ten items per virtual page.
    Ten,
    /// Twenty items per virtual page (the upstream's own size).
    #[default]
    Twenty,
    /// Fifty items per virtual page.
    Fifty,
}

impl PageSize {
    /// Numeric page size.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Fifty => 50,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(Self::Ten),
            20 => Ok(Self::Twenty),
            50 => Ok(Self::Fifty),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// The combined name/status/sort criteria currently in effect.
///
/// Equality of the `(name, status)` projection is the cache-invalidation
/// key; a `sort` difference alone only re-orders the in-memory buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterFilters {
    /// Free-text name filter (raw, untrimmed).
    pub name: String,
    /// Status filter; `None` matches every status.
    pub status: Option<Status>,
    /// Buffer ordering.
    pub sort: SortOrder,
}

impl CharacterFilters {
    /// Whether `other` differs in a way that invalidates fetched state.
    #[must_use]
    pub fn invalidates(&self, other: &Self) -> bool {
        self.name != other.name || self.status != other.status
    }

    /// The canonical query sent upstream. The name participates only when
    /// its trimmed length reaches `min_search_len`; `sort` never reaches
    /// the wire.
    #[must_use]
    pub fn fetch_query(&self, min_search_len: usize) -> FetchQuery {
        let trimmed = self.name.trim();
        let name = if trimmed.len() >= min_search_len {
            Some(trimmed.to_string())
        } else {
            None
        };
        FetchQuery {
            name,
            status: self.status,
        }
    }
}

/// The filter projection that actually reaches the upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchQuery {
    /// Trimmed name filter, present only when long enough to search on.
    pub name: Option<String>,
    /// Status filter.
    pub status: Option<Status>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": 1,
        "name": "Rick Sanchez",
        "status": "Alive",
        "species": "Human",
        "type": "",
        "gender": "Male",
        "origin": {"name": "Earth (C-137)", "url": "https://rickandmortyapi.com/api/location/1"},
        "location": {"name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3"},
        "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg",
        "episode": ["https://rickandmortyapi.com/api/episode/1"],
        "url": "https://rickandmortyapi.com/api/character/1",
        "created": "2017-11-04T18:48:46.250Z"
    }"#;

    #[test]
    fn test_character_deserialization() {
        let c: Character = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(c.id, 1);
        assert_eq!(c.name, "Rick Sanchez");
        assert_eq!(c.status, Status::Alive);
        assert_eq!(c.kind, "");
        assert_eq!(c.episode.len(), 1);
    }

    #[test]
    fn test_status_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&Status::Unknown).unwrap(),
            "\"unknown\""
        );
        assert_eq!(serde_json::to_string(&Status::Alive).unwrap(), "\"Alive\"");
        let parsed: Status = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(parsed, Status::Unknown);
    }

    #[test]
    fn test_sort_order_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&SortOrder::NameAsc).unwrap(),
            "\"az\""
        );
        assert_eq!(serde_json::to_string(&SortOrder::None).unwrap(), "\"none\"");
    }

    #[test]
    fn test_page_size_conversions() {
        assert_eq!(PageSize::try_from(50).unwrap(), PageSize::Fifty);
        assert_eq!(PageSize::try_from(25), Err(25));
        assert_eq!(PageSize::default().as_u32(), 20);
    }

    #[test]
    fn test_filters_invalidation_key() {
        let a = CharacterFilters {
            name: "rick".to_string(),
            status: None,
            sort: SortOrder::None,
        };
        let mut b = a.clone();
        b.sort = SortOrder::NameDesc;
        assert!(!a.invalidates(&b));

        b.status = Some(Status::Dead);
        assert!(a.invalidates(&b));
    }

    #[test]
    fn test_fetch_query_name_gating() {
        let filters = CharacterFilters {
            name: "  r  ".to_string(),
            status: Some(Status::Alive),
            sort: SortOrder::None,
        };
        let q = filters.fetch_query(2);
        assert_eq!(q.name, None);
        assert_eq!(q.status, Some(Status::Alive));

        let filters = CharacterFilters {
            name: " ri ".to_string(),
            ..Default::default()
        };
        assert_eq!(filters.fetch_query(2).name.as_deref(), Some("ri"));
    }

    #[test]
    fn test_empty_page_from_no_match() {
        let page = UpstreamPage::empty();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }
}
