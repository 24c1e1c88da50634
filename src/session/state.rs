use std::{fmt, str::FromStr};

use super::pagination::Pagination;
use crate::domain::{Book, CatalogPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Unfiltered new-books feed is visible.
    #[default]
    Browsing,
    /// Search input is active; results come from the paginated search.
    Searching,
}

/// When a "load more" moves the page counter forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageAdvance {
    /// Only once the page has actually been applied. A failed fetch can be
    /// retried for the same page.
    #[default]
    OnSuccess,
    /// As soon as the fetch is issued. A failed fetch leaves a gap.
    OnIssue,
}

impl FromStr for PageAdvance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on-success" | "on_success" => Ok(PageAdvance::OnSuccess),
            "on-issue" | "on_issue" => Ok(PageAdvance::OnIssue),
            other => Err(format!("expected 'on-success' or 'on-issue', got '{}'", other)),
        }
    }
}

/// Identity of one search-page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Bumped on every query change or cancel; stale completions carry an
    /// older value.
    pub generation: u64,
    pub query: String,
    pub page: u32,
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' page {}", self.query, self.page)
    }
}

/// Result of feeding new search text into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEdit {
    Unchanged,
    /// Text became empty while the search input is active.
    Cleared,
    /// A page-1 fetch for the new query has been reserved.
    NewQuery(PageRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Applied { page: u32, added: usize },
    Failed,
    /// Belonged to a superseded query; nothing changed.
    Stale,
}

/// What the renderer should show for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView<'a> {
    Feed(&'a [Book]),
    Results { books: &'a [Book], has_more: bool },
    /// Search input active with nothing typed.
    Placeholder,
    /// A search completed with zero hits.
    NoResults,
}

/// Per-screen mutable state: search mode, query and pagination progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    mode: SessionMode,
    pagination: Pagination,
    in_flight: Option<PageRequest>,
    generation: u64,
    first_page_loaded: bool,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(Pagination::default())
    }
}

impl SearchSession {
    pub fn new(pagination: Pagination) -> Self {
        SearchSession {
            mode: SessionMode::Browsing,
            pagination,
            in_flight: None,
            generation: 0,
            first_page_loaded: false,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn query(&self) -> &str {
        self.pagination.query()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn in_flight(&self) -> Option<&PageRequest> {
        self.in_flight.as_ref()
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Browsing -> Searching. Keeps whatever query is already there.
    pub fn activate_search(&mut self) {
        if self.mode == SessionMode::Browsing {
            tracing::debug!("search activated");
            self.mode = SessionMode::Searching;
        }
    }

    /// Searching -> Browsing. All search state is discarded.
    pub fn cancel_search(&mut self) {
        tracing::debug!(query = %self.query(), "search cancelled");
        self.mode = SessionMode::Browsing;
        self.reset_query("");
    }

    /// Apply the full text of the search input.
    pub fn edit_query(&mut self, text: &str) -> QueryEdit {
        self.activate_search();
        if text == self.query() {
            return self.retry_first_page();
        }
        self.reset_query(text);
        if text.is_empty() {
            return QueryEdit::Cleared;
        }
        match self.begin_fetch(text, 1) {
            Some(request) => QueryEdit::NewQuery(request),
            None => QueryEdit::Unchanged,
        }
    }

    /// Same text again: only worth a fetch when page 1 never arrived and
    /// nothing is pending, e.g. after a failed first page.
    fn retry_first_page(&mut self) -> QueryEdit {
        if self.query().is_empty() || self.first_page_loaded || self.in_flight.is_some() {
            return QueryEdit::Unchanged;
        }
        let query = self.query().to_string();
        match self.begin_fetch(&query, 1) {
            Some(request) => {
                tracing::debug!(%request, "retrying first page");
                QueryEdit::NewQuery(request)
            }
            None => QueryEdit::Unchanged,
        }
    }

    /// The only page that may be fetched next: page 1 until it has been
    /// applied, then the page after `current_page`, never past `last_page`.
    fn expected_page(&self) -> Option<u32> {
        if !self.first_page_loaded {
            return Some(1);
        }
        let next = self.pagination.current_page() + 1;
        (next <= self.pagination.last_page()).then_some(next)
    }

    fn reset_query(&mut self, query: &str) {
        self.generation += 1;
        self.in_flight = None;
        self.first_page_loaded = false;
        self.pagination.begin_new_query(query);
    }

    /// Reserve the single in-flight slot for `query`/`page`.
    pub fn begin_fetch(&mut self, query: &str, page: u32) -> Option<PageRequest> {
        if self.mode != SessionMode::Searching || query.is_empty() || page == 0 {
            return None;
        }
        if query != self.query() {
            tracing::debug!(query, current = %self.query(), "fetch for a query that is not active");
            return None;
        }
        if let Some(pending) = &self.in_flight {
            tracing::debug!(%pending, page, "fetch already in flight");
            return None;
        }
        if self.expected_page() != Some(page) {
            tracing::debug!(
                query,
                page,
                current_page = self.pagination.current_page(),
                last_page = self.pagination.last_page(),
                "page is not the next one to fetch"
            );
            return None;
        }
        let request = PageRequest {
            generation: self.generation,
            query: query.to_string(),
            page,
        };
        self.in_flight = Some(request.clone());
        Some(request)
    }

    /// Reserve the next page, if the scroll position warrants one.
    pub fn next_page_request(&mut self, advance: PageAdvance) -> Option<PageRequest> {
        if self.mode != SessionMode::Searching
            || self.query().is_empty()
            || self.pagination.accumulated().is_empty()
            || !self.pagination.has_more()
            || self.in_flight.is_some()
        {
            return None;
        }
        let next = self.pagination.current_page() + 1;
        let query = self.query().to_string();
        let request = self.begin_fetch(&query, next)?;
        if advance == PageAdvance::OnIssue {
            self.pagination.advance_to(next);
        }
        Some(request)
    }

    /// Fold a search completion back into the session; `None` marks a failed
    /// fetch, which only releases the in-flight slot.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        page: Option<CatalogPage>,
    ) -> PageOutcome {
        if request.generation != self.generation || request.query != self.query() {
            tracing::debug!(%request, current = %self.query(), "discarding stale search result");
            return PageOutcome::Stale;
        }
        if self.in_flight.as_ref() == Some(request) {
            self.in_flight = None;
        }
        match page {
            Some(page) => {
                let added = page.books.len();
                self.pagination.apply_page(page, request.page == 1);
                self.pagination.advance_to(request.page);
                if request.page == 1 {
                    self.first_page_loaded = true;
                }
                PageOutcome::Applied {
                    page: request.page,
                    added,
                }
            }
            None => PageOutcome::Failed,
        }
    }

    pub fn list_view<'a>(&'a self, feed: &'a [Book]) -> ListView<'a> {
        match self.mode {
            SessionMode::Browsing => ListView::Feed(feed),
            SessionMode::Searching if self.query().is_empty() => ListView::Placeholder,
            SessionMode::Searching
                if self.first_page_loaded && self.pagination.accumulated().is_empty() =>
            {
                ListView::NoResults
            }
            SessionMode::Searching => ListView::Results {
                books: self.pagination.accumulated(),
                has_more: self.pagination.has_more(),
            },
        }
    }
}
