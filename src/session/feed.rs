use crate::domain::{Book, CatalogPage};

/// Cache of the unfiltered new-books page. Independent of the search session;
/// replaced only by an explicit refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowsingFeed {
    page: Option<CatalogPage>,
}

impl BrowsingFeed {
    pub fn is_loaded(&self) -> bool {
        self.page.is_some()
    }

    pub fn books(&self) -> &[Book] {
        self.page.as_ref().map(|p| p.books.as_slice()).unwrap_or(&[])
    }

    pub fn replace(&mut self, page: CatalogPage) -> &CatalogPage {
        self.page.insert(page)
    }
}
