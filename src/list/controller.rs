use super::{
    ListActions, ListItem, Loading, Observable, QueryMode, ERR_LOAD_FAILED, ERR_NO_CONNECTION,
};
use crate::fetch::{FetchError, FetchEvent, FetchHandle, FetchPort, PageReply};
use crate::movie::{Movie, MovieQuery, MoviesPage, PageSet};
use crate::queries::RecentQueries;
use tokio::sync::mpsc;

/// Default cap on remembered search queries.
const DEFAULT_RECENT_QUERIES: usize = 10;

/// Coordinates paged trending/search fetches for one screen session.
///
/// At most one fetch is in flight. Issuing a new one cancels the previous
/// handle and bumps `generation`; callbacks carrying an older generation are
/// dropped, so a port that cannot stop promptly still cannot mutate state.
///
/// Fetch callbacks are queued on an internal channel and applied only when
/// the owner calls [`process_pending`](Self::process_pending),
/// [`next_event`](Self::next_event) or [`settle`](Self::settle). All state
/// mutation therefore happens on the owner's context, in delivery order.
pub struct ListController<P: FetchPort> {
    port: P,
    actions: Option<Box<dyn ListActions + Send>>,

    /// `None` until the first load.
    mode: Option<QueryMode>,
    current_page: u32,
    total_page_count: u32,
    pages: PageSet,
    recent: RecentQueries,

    /// Incremented for every issued fetch. Callbacks tagged with an older
    /// value belong to a superseded fetch and are ignored.
    generation: u64,
    in_flight: Option<FetchHandle>,
    event_tx: mpsc::UnboundedSender<FetchEvent>,
    event_rx: mpsc::UnboundedReceiver<FetchEvent>,

    items: Observable<Vec<Movie>>,
    loading: Observable<Option<Loading>>,
    query: Observable<String>,
    last_error: Observable<Option<String>>,
}

impl<P: FetchPort> ListController<P> {
    pub fn new(port: P) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            port,
            actions: None,
            mode: None,
            current_page: 0,
            total_page_count: 1,
            pages: PageSet::new(),
            recent: RecentQueries::new(DEFAULT_RECENT_QUERIES),
            generation: 0,
            in_flight: None,
            event_tx,
            event_rx,
            items: Observable::new(Vec::new()),
            loading: Observable::new(None),
            query: Observable::new(String::new()),
            last_error: Observable::new(None),
        }
    }

    pub fn with_actions(mut self, actions: impl ListActions + Send + 'static) -> Self {
        self.actions = Some(Box::new(actions));
        self
    }

    pub fn with_recent_queries(mut self, recent: RecentQueries) -> Self {
        self.recent = recent;
        self
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// First load of the session: trending, full screen.
    ///
    /// Does nothing once a mode has been chosen; use
    /// [`cancel_search`](Self::cancel_search) to return to trending.
    pub fn start(&mut self) {
        if let Some(mode) = &self.mode {
            tracing::debug!(mode = ?mode, "start() ignored, list already initialized");
            return;
        }
        self.load_trending();
    }

    /// Load the page after the current one. Ignored while loading or when no pages remain.
    pub fn load_next_page(&mut self) {
        if !self.has_more_pages() || self.loading.get().is_some() {
            tracing::debug!(
                current_page = self.current_page,
                total_pages = self.total_page_count,
                loading = ?*self.loading.get(),
                "Next page not requested"
            );
            return;
        }
        self.issue(Loading::NextPage);
    }

    /// Search by title. Empty text switches back to trending.
    pub fn search(&mut self, text: &str) {
        if text.is_empty() {
            self.load_trending();
            return;
        }
        self.update_query(MovieQuery::new(text));
    }

    pub fn cancel_search(&mut self) {
        self.load_trending();
    }

    /// Ask the navigation collaborator to present recent queries.
    pub fn show_queries_suggestions(&mut self) {
        if let Some(actions) = &mut self.actions {
            actions.show_query_suggestions(self.recent.all());
        }
    }

    pub fn close_queries_suggestions(&mut self) {
        if let Some(actions) = &mut self.actions {
            actions.close_query_suggestions();
        }
    }

    /// A prior query was picked from the suggestions list.
    pub fn select_suggestion(&mut self, query: MovieQuery) {
        self.update_query(query);
    }

    /// Hand the movie at `index` to the navigation collaborator.
    ///
    /// `index` must be within `items`. Out-of-range indices panic in debug
    /// builds and are ignored (with a warning) in release builds.
    pub fn select_item(&mut self, index: usize) {
        let count = self.items.get().len();
        debug_assert!(
            index < count,
            "select_item index {index} out of bounds ({count} items)"
        );
        let Some(movie) = self.pages.movie_at(index) else {
            tracing::warn!(index, count, "select_item index out of bounds, ignoring");
            return;
        };
        tracing::debug!(index, id = %movie.id, "Item selected");
        if let Some(actions) = &mut self.actions {
            actions.show_movie_details(movie);
        }
    }

    // ========================================================================
    // Callback Processing
    // ========================================================================

    /// Apply every queued fetch callback. Returns the number of events handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next fetch callback and apply it.
    pub async fn next_event(&mut self) {
        if let Some(event) = self.event_rx.recv().await {
            self.handle_event(event);
        }
    }

    /// Apply callbacks until no load is in progress.
    ///
    /// Waits forever if the port drops a reply without completing it, so
    /// callers talking to an unreliable port should wrap this in a timeout.
    pub async fn settle(&mut self) {
        self.process_pending();
        while self.loading.get().is_some() {
            self.next_event().await;
        }
    }

    fn handle_event(&mut self, event: FetchEvent) {
        if event.generation() != self.generation {
            tracing::debug!(
                expected = self.generation,
                got = event.generation(),
                "Ignoring stale fetch callback (generation mismatch)"
            );
            return;
        }

        match event {
            FetchEvent::Cached { page, .. } => {
                tracing::debug!(
                    page = page.page,
                    movies = page.movies.len(),
                    "Cached page received"
                );
                self.append_page(page);
            }
            FetchEvent::Completed { result, .. } => {
                self.in_flight = None;
                match result {
                    Ok(page) => {
                        tracing::debug!(
                            page = page.page,
                            total_pages = page.total_pages,
                            movies = page.movies.len(),
                            "Page loaded"
                        );
                        if let Some(QueryMode::Search(query)) = &self.mode {
                            self.recent.record(query.clone());
                        }
                        self.append_page(page);
                    }
                    Err(e) if e.is_cancelled() => {
                        tracing::debug!("Fetch reported cancellation");
                    }
                    Err(e) => self.handle_error(&e),
                }
                self.loading.set(None);
            }
        }
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn load_trending(&mut self) {
        self.reset_pages();
        self.mode = Some(QueryMode::Trending);
        self.query.set(String::new());
        self.issue(Loading::FullScreen);
    }

    fn update_query(&mut self, query: MovieQuery) {
        self.reset_pages();
        self.query.set(query.query.clone());
        self.mode = Some(QueryMode::Search(query));
        self.issue(Loading::FullScreen);
    }

    /// Start a fetch for the current mode at `next_page`, superseding any in-flight one.
    fn issue(&mut self, loading: Loading) {
        let Some(mode) = self.mode.clone() else {
            return;
        };

        self.loading.set(Some(loading));
        self.last_error.set(None);

        if let Some(mut handle) = self.in_flight.take() {
            handle.cancel();
            tracing::debug!(generation = self.generation, "Cancelled superseded fetch");
        }

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let page = self.next_page();
        let reply = PageReply::new(generation, self.event_tx.clone());

        tracing::debug!(mode = ?mode, page, generation, loading = ?loading, "Issuing fetch");

        self.in_flight = match &mode {
            QueryMode::Trending => self.port.fetch_trending(page, reply),
            QueryMode::Search(query) => self.port.fetch_search(query, page, reply),
        };
    }

    /// Replace-or-append by page number, then republish the flattened items.
    fn append_page(&mut self, page: MoviesPage) {
        self.current_page = page.page;
        self.total_page_count = page.total_pages;
        self.pages.insert(page);
        self.items.replace(self.pages.movies());
    }

    fn reset_pages(&mut self) {
        self.current_page = 0;
        self.total_page_count = 1;
        self.pages.clear();
        self.items.replace(Vec::new());
    }

    fn handle_error(&mut self, error: &FetchError) {
        let message = if error.is_connectivity() {
            ERR_NO_CONNECTION
        } else {
            ERR_LOAD_FAILED
        };
        tracing::warn!(error = %error, current_page = self.current_page, "Fetch failed");
        self.last_error.replace(Some(message.to_string()));
    }

    // ========================================================================
    // Outputs
    // ========================================================================

    pub fn items(&self) -> &Observable<Vec<Movie>> {
        &self.items
    }

    pub fn loading(&self) -> &Observable<Option<Loading>> {
        &self.loading
    }

    /// Current search text; empty in trending mode.
    pub fn query(&self) -> &Observable<String> {
        &self.query
    }

    pub fn last_error(&self) -> &Observable<Option<String>> {
        &self.last_error
    }

    pub fn is_empty(&self) -> bool {
        self.items.get().is_empty()
    }

    /// Display rows for the current items.
    pub fn list_items(&self) -> Vec<ListItem> {
        self.items.get().iter().map(ListItem::from).collect()
    }

    pub fn mode(&self) -> Option<&QueryMode> {
        self.mode.as_ref()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_page_count(&self) -> u32 {
        self.total_page_count
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.total_page_count
    }

    /// Page the next fetch asks for. Re-requests the current page once the last one is loaded.
    pub fn next_page(&self) -> u32 {
        if self.has_more_pages() {
            self.current_page + 1
        } else {
            self.current_page
        }
    }

    pub fn recent_queries(&self) -> &RecentQueries {
        &self.recent
    }

    pub fn port(&self) -> &P {
        &self.port
    }
}

/// Cancel the in-flight fetch when the session ends.
impl<P: FetchPort> Drop for ListController<P> {
    fn drop(&mut self) {
        if let Some(mut handle) = self.in_flight.take() {
            handle.cancel();
            tracing::debug!(generation = self.generation, "Cancelled fetch on controller drop");
        }
    }
}
