use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;

use super::{
    feed::BrowsingFeed,
    observer::{CatalogObserver, FetchContext},
    pagination::Pagination,
    state::{ListView, PageAdvance, PageOutcome, PageRequest, QueryEdit, SearchSession},
};
use crate::{
    catalog_client::{CatalogSource, FetchError},
    domain::{Book, CatalogPage},
};

/// A finished catalog request, waiting to be applied on the owning task.
#[derive(Debug)]
pub enum Completion {
    Feed(Result<CatalogPage, FetchError>),
    SearchPage {
        request: PageRequest,
        result: Result<CatalogPage, FetchError>,
    },
    Detail {
        isbn13: String,
        result: Result<Book, FetchError>,
    },
}

/// Owns the session and the feed cache. Requests run on spawned tasks; their
/// results come back through a channel and are only applied by
/// [`FetchCoordinator::apply`], so every mutation happens on the task that
/// owns the coordinator.
pub struct FetchCoordinator {
    source: Arc<dyn CatalogSource>,
    observer: Arc<dyn CatalogObserver>,
    session: SearchSession,
    feed: BrowsingFeed,
    advance: PageAdvance,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl FetchCoordinator {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        observer: Arc<dyn CatalogObserver>,
        page_size: u32,
        advance: PageAdvance,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        FetchCoordinator {
            source,
            observer,
            session: SearchSession::new(Pagination::new(page_size)),
            feed: BrowsingFeed::default(),
            advance,
            completions_tx,
            completions_rx,
        }
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn feed(&self) -> &BrowsingFeed {
        &self.feed
    }

    pub fn list_view(&self) -> ListView<'_> {
        self.session.list_view(self.feed.books())
    }

    pub fn search_activated(&mut self) {
        self.session.activate_search();
    }

    pub fn search_cancelled(&mut self) {
        self.session.cancel_search();
    }

    /// Feed the full search text. Returns whether a fetch was issued; a
    /// cleared query issues nothing and leaves [`ListView::Placeholder`].
    pub fn query_changed(&mut self, text: &str) -> bool {
        match self.session.edit_query(text) {
            QueryEdit::NewQuery(request) => {
                self.spawn_search(request);
                true
            }
            QueryEdit::Cleared | QueryEdit::Unchanged => false,
        }
    }

    /// New-books fetch; also serves as pull-to-refresh. Never rejected.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn trigger_feed_fetch(&self) {
        let source = Arc::clone(&self.source);
        let tx = self.completions_tx.clone();
        tokio::spawn(
            async move {
                let result = source.fetch_feed().await;
                if tx.send(Completion::Feed(result)).is_err() {
                    tracing::debug!("coordinator gone, dropping feed completion");
                }
            }
            .instrument(tracing::debug_span!("feed_fetch")),
        );
    }

    /// No-op unless `query` is the active query and nothing is in flight.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn trigger_search_fetch(&mut self, query: &str, page: u32) -> bool {
        match self.session.begin_fetch(query, page) {
            Some(request) => {
                self.spawn_search(request);
                true
            }
            None => false,
        }
    }

    /// Called when the list is scrolled near its end.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn trigger_load_more(&mut self) -> bool {
        match self.session.next_page_request(self.advance) {
            Some(request) => {
                self.spawn_search(request);
                true
            }
            None => {
                tracing::debug!(
                    mode = ?self.session.mode(),
                    current_page = self.session.pagination().current_page(),
                    last_page = self.session.pagination().last_page(),
                    in_flight = self.session.is_fetch_in_flight(),
                    "load more ignored"
                );
                false
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn trigger_detail_fetch(&self, isbn13: &str) {
        let source = Arc::clone(&self.source);
        let tx = self.completions_tx.clone();
        let isbn13 = isbn13.to_string();
        tokio::spawn(
            async move {
                let result = source.fetch_detail(&isbn13).await;
                if let Err(unsent) = tx.send(Completion::Detail { isbn13, result }) {
                    tracing::debug!(completion = ?unsent.0, "coordinator gone, dropping detail completion");
                }
            }
            .instrument(tracing::debug_span!("detail_fetch")),
        );
    }

    fn spawn_search(&self, request: PageRequest) {
        tracing::debug!(%request, "issuing search fetch");
        let source = Arc::clone(&self.source);
        let tx = self.completions_tx.clone();
        let span = tracing::debug_span!("search_fetch", query = %request.query, page = request.page);
        tokio::spawn(
            async move {
                let result = source.fetch_search(&request.query, request.page).await;
                if let Err(unsent) = tx.send(Completion::SearchPage { request, result }) {
                    tracing::debug!(completion = ?unsent.0, "coordinator gone, dropping search completion");
                }
            }
            .instrument(span),
        );
    }

    /// Wait for the next finished request. Never yields `None` while the
    /// coordinator is alive, since it holds a sender itself.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    /// Fold a completion into the session/feed and notify the observer.
    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Feed(Ok(page)) => {
                tracing::info!(books = page.books.len(), "new books loaded");
                let page = self.feed.replace(page);
                self.observer.on_feed_updated(page);
            }
            Completion::Feed(Err(error)) => {
                self.report_failure(&error, FetchContext::Feed);
            }
            Completion::SearchPage { request, result } => {
                let failure = result.as_ref().err().cloned();
                match self.session.complete(&request, result.ok()) {
                    PageOutcome::Applied { page, added } => {
                        let pagination = self.session.pagination();
                        tracing::info!(
                            query = %request.query,
                            page,
                            added,
                            total = pagination.accumulated().len(),
                            last_page = pagination.last_page(),
                            "search page applied"
                        );
                        self.observer
                            .on_search_page_updated(pagination.accumulated(), pagination.has_more());
                    }
                    PageOutcome::Failed => {
                        if let Some(error) = failure {
                            self.report_failure(
                                &error,
                                FetchContext::SearchPage {
                                    query: request.query,
                                    page: request.page,
                                },
                            );
                        }
                    }
                    PageOutcome::Stale => {}
                }
            }
            Completion::Detail {
                isbn13,
                result: Ok(book),
            } => {
                tracing::debug!(%isbn13, "detail loaded");
                self.observer.on_detail_loaded(&book);
            }
            Completion::Detail {
                isbn13,
                result: Err(error),
            } => {
                self.report_failure(&error, FetchContext::Detail { isbn13 });
            }
        }
    }

    /// Wait for one completion and apply it.
    pub async fn pump(&mut self) -> bool {
        match self.next_completion().await {
            Some(completion) => {
                self.apply(completion);
                true
            }
            None => false,
        }
    }

    fn report_failure(&self, error: &FetchError, context: FetchContext) {
        tracing::warn!(%error, %context, "catalog fetch failed");
        self.observer.on_fetch_failed(error, &context);
    }
}
