use crate::domain::{Book, CatalogPage};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// `ceil(total_count / page_size)`; `0` means no results or not yet known.
pub fn last_page_for(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Page bookkeeping and merged results for the active search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page_size: u32,
    query: String,
    current_page: u32,
    last_page: u32,
    accumulated: Vec<Book>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Pagination {
            page_size,
            query: String::new(),
            current_page: 1,
            last_page: 0,
            accumulated: Vec::new(),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn accumulated(&self) -> &[Book] {
        &self.accumulated
    }

    /// Whether a loading sentinel row belongs under the results.
    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn begin_new_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.current_page = 1;
        self.last_page = 0;
        self.accumulated.clear();
    }

    /// Merge one response. The first page replaces everything and fixes
    /// `last_page`; later pages append in server order. Callers apply each
    /// page number at most once per query.
    pub fn apply_page(&mut self, page: CatalogPage, is_first_page: bool) {
        if is_first_page {
            self.last_page = last_page_for(page.total_count, self.page_size);
            self.accumulated = page.books;
        } else {
            self.accumulated.extend(page.books);
        }
    }

    /// Move the page counter, clamped to `1..=last_page` once the last page
    /// is known.
    pub fn advance_to(&mut self, page: u32) {
        self.current_page = match self.last_page {
            0 => page.max(1),
            last => page.clamp(1, last),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::fixtures::{books, page};

    #[test]
    fn last_page_is_ceiling() {
        assert_eq!(last_page_for(95, 10), 10);
        assert_eq!(last_page_for(100, 10), 10);
        assert_eq!(last_page_for(101, 10), 11);
        assert_eq!(last_page_for(1, 10), 1);
        assert_eq!(last_page_for(0, 10), 0);
        assert_eq!(last_page_for(25, 0), 0);
    }

    #[test]
    fn first_page_replaces_and_sets_last_page() {
        let mut p = Pagination::default();
        p.begin_new_query("ruby");
        p.apply_page(page(25, Some(1), books("a", 10)), true);
        p.apply_page(page(25, Some(2), books("b", 10)), false);

        p.apply_page(page(7, Some(1), books("c", 7)), true);
        assert_eq!(p.accumulated(), books("c", 7).as_slice());
        assert_eq!(p.last_page(), 1);
    }

    #[test]
    fn later_pages_append_after_existing_entries() {
        let mut p = Pagination::default();
        p.begin_new_query("ruby");
        p.apply_page(page(25, Some(1), books("a", 10)), true);
        p.apply_page(page(25, Some(2), books("b", 10)), false);

        let mut expected = books("a", 10);
        expected.extend(books("b", 10));
        assert_eq!(p.accumulated(), expected.as_slice());
        assert_eq!(p.last_page(), 3);
    }

    #[test]
    fn begin_new_query_resets_everything() {
        let mut p = Pagination::default();
        p.begin_new_query("ruby");
        p.apply_page(page(25, Some(1), books("a", 10)), true);
        p.advance_to(2);

        p.begin_new_query("rust");
        assert_eq!(p.query(), "rust");
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.last_page(), 0);
        assert!(p.accumulated().is_empty());
    }

    #[test]
    fn has_more_tracks_the_page_window() {
        let mut p = Pagination::default();
        p.begin_new_query("ruby");
        assert!(!p.has_more());

        p.apply_page(page(0, Some(1), vec![]), true);
        assert!(!p.has_more());

        p.apply_page(page(15, Some(1), books("a", 10)), true);
        assert!(p.has_more());
        p.advance_to(2);
        assert!(!p.has_more());
    }

    #[test]
    fn advance_is_clamped_to_known_pages() {
        let mut p = Pagination::default();
        p.begin_new_query("ruby");
        p.apply_page(page(25, Some(1), books("a", 10)), true);

        p.advance_to(5);
        assert_eq!(p.current_page(), 3);
        p.advance_to(0);
        assert_eq!(p.current_page(), 1);
    }
}
