//! Pagination state.

use crate::types::PageSize;

/// User-visible pagination state: current virtual page, virtual page size,
/// and whether infinite accumulation mode is active.
///
/// The three axes are independent, with two coupling rules: the page size
/// is frozen while infinite mode is on, and any mode toggle returns to
/// page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationController {
    page: u32,
    page_size: PageSize,
    infinite: bool,
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(PageSize::default(), false)
    }
}

impl PaginationController {
    /// Create a controller at page 1 with the given size and mode.
    #[must_use]
    pub const fn new(page_size: PageSize, infinite: bool) -> Self {
        Self {
            page: 1,
            page_size,
            infinite,
        }
    }

    /// Current virtual page (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Current virtual page size.
    #[must_use]
    pub const fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Whether infinite accumulation mode is active.
    #[must_use]
    pub const fn infinite(&self) -> bool {
        self.infinite
    }

    /// Go to virtual page `page`. Out-of-range requests (below 1 or above
    /// `max_pages`) are silently ignored. Returns whether the page changed.
    pub fn set_page(&mut self, page: u32, max_pages: u32) -> bool {
        if page < 1 || page > max_pages || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    /// Change the virtual page size. Ignored while infinite mode is on.
    /// Returns whether the size changed. Fetched upstream pages stay valid
    /// raw data; only the displayed slice needs re-deriving.
    pub fn set_page_size(&mut self, size: PageSize) -> bool {
        if self.infinite || size == self.page_size {
            return false;
        }
        self.page_size = size;
        true
    }

    /// Toggle infinite mode. Any actual toggle resets to page 1. Returns
    /// whether the mode changed.
    pub fn set_infinite(&mut self, infinite: bool) -> bool {
        if infinite == self.infinite {
            return false;
        }
        self.infinite = infinite;
        self.reset_page();
        true
    }

    /// Force the current page back to 1.
    pub fn reset_page(&mut self) {
        self.page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_pages_are_ignored() {
        let mut p = PaginationController::default();
        assert!(!p.set_page(0, 5));
        assert!(!p.set_page(6, 5));
        assert_eq!(p.page(), 1);

        assert!(p.set_page(5, 5));
        assert_eq!(p.page(), 5);
    }

    #[test]
    fn test_page_size_frozen_in_infinite_mode() {
        let mut p = PaginationController::new(PageSize::Twenty, true);
        assert!(!p.set_page_size(PageSize::Fifty));
        assert_eq!(p.page_size(), PageSize::Twenty);

        assert!(p.set_infinite(false));
        assert!(p.set_page_size(PageSize::Fifty));
        assert_eq!(p.page_size(), PageSize::Fifty);
    }

    #[test]
    fn test_mode_toggle_resets_page() {
        let mut p = PaginationController::default();
        p.set_page(4, 10);

        assert!(p.set_infinite(true));
        assert_eq!(p.page(), 1);

        p.set_page(3, 10);
        assert!(p.set_infinite(false));
        assert_eq!(p.page(), 1);

        // No-op toggle leaves the page alone.
        p.set_page(2, 10);
        assert!(!p.set_infinite(false));
        assert_eq!(p.page(), 2);
    }
}
