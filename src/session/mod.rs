//! Search/pagination session for one catalog screen.
//!
//! [`SearchSession`] holds the mode, query and page progress, [`Pagination`]
//! merges pages, and [`FetchCoordinator`] issues catalog requests off the
//! owning task and folds their completions back in one at a time.

mod coordinator;
mod feed;
mod observer;
mod pagination;
mod state;

pub use coordinator::{Completion, FetchCoordinator};
pub use feed::BrowsingFeed;
pub use observer::{CatalogObserver, FetchContext};
pub use pagination::{DEFAULT_PAGE_SIZE, Pagination, last_page_for};
pub use state::{
    ListView, PageAdvance, PageOutcome, PageRequest, QueryEdit, SearchSession, SessionMode,
};
