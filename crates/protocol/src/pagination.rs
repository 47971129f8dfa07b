use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const DEFAULT_PER_PAGE: usize = 20;
pub const MAX_PER_PAGE: usize = 100;

/// 1-based page selection, already clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<usize>, per_page: Option<usize>) -> Self {
        Self::bounded(page, per_page, DEFAULT_PER_PAGE, MAX_PER_PAGE)
    }

    /// `page` is raised to 1, `per_page` is clamped to `1..=max_per_page`.
    pub fn bounded(
        page: Option<usize>,
        per_page: Option<usize>,
        default_per_page: usize,
        max_per_page: usize,
    ) -> Self {
        let max_per_page = max_per_page.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(default_per_page)
                .clamp(1, max_per_page),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Index window into a result list of `total` rows; empty past the end.
    pub fn window(&self, total: usize) -> Range<usize> {
        let start = self.offset().min(total);
        let end = start.saturating_add(self.per_page).min(total);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.window(items.len())]
    }
}

/// `ceil(total / per_page)`, and 0 when there is nothing to page through.
pub fn total_pages(total: usize, per_page: usize) -> usize {
    if total == 0 || per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(1, 20), 1);
    }

    #[test]
    fn window_is_clamped_to_total() {
        let request = PageRequest::new(Some(3), Some(20));
        assert_eq!(request.offset(), 40);
        assert_eq!(request.window(45), 40..45);
        assert_eq!(request.window(10), 10..10);
    }

    #[test]
    fn request_bounds_are_enforced() {
        let request = PageRequest::new(Some(0), Some(0));
        assert_eq!(request, PageRequest { page: 1, per_page: 1 });

        let request = PageRequest::new(None, Some(10_000));
        assert_eq!(request.per_page, MAX_PER_PAGE);

        let request = PageRequest::bounded(None, None, 50, 25);
        assert_eq!(request.per_page, 25);
    }

    #[test]
    fn slice_returns_requested_page() {
        let items: Vec<u32> = (0..45).collect();
        let request = PageRequest::new(Some(3), Some(20));
        assert_eq!(request.slice(&items), &[40, 41, 42, 43, 44]);
    }
}
