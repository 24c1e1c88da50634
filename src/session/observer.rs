use std::fmt;

use crate::{
    catalog_client::FetchError,
    domain::{Book, CatalogPage},
};

/// Which request a failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchContext {
    Feed,
    SearchPage { query: String, page: u32 },
    Detail { isbn13: String },
}

impl fmt::Display for FetchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchContext::Feed => write!(f, "new books"),
            FetchContext::SearchPage { query, page } => write!(f, "search '{}' page {}", query, page),
            FetchContext::Detail { isbn13 } => write!(f, "details of {}", isbn13),
        }
    }
}

/// Presentation hooks. The session layer calls these and never renders.
pub trait CatalogObserver: Send + Sync {
    fn on_feed_updated(&self, page: &CatalogPage);

    fn on_search_page_updated(&self, accumulated: &[Book], has_more: bool);

    fn on_detail_loaded(&self, _book: &Book) {}

    fn on_fetch_failed(&self, error: &FetchError, context: &FetchContext);
}
