use crate::catalog::routes;
use crate::client::SearchService;
use crate::config::SearchSettings;
use crate::error::Result;
use crate::metrics::{
    SEARCH_DEBOUNCE_CANCELLATIONS_TOTAL, SEARCH_FAILURES_TOTAL, SEARCH_REQUESTS_TOTAL,
    SEARCH_STALE_RESPONSES_TOTAL,
};
use crate::models::SearchResultItem;
use crate::search::debounce::Debouncer;
use crate::search::state::{
    ApplyOutcome, Dropdown, PaginationCursor, RequestKind, SearchRequest, SearchState,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Receives the detail path computed for a selected result
pub trait Navigator: Send {
    fn navigate(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send,
{
    fn navigate(&self, path: &str) {
        self(path)
    }
}

impl Navigator for mpsc::UnboundedSender<String> {
    fn navigate(&self, path: &str) {
        if self.send(path.to_string()).is_err() {
            warn!(path = path, "Navigation receiver dropped");
        }
    }
}

/// Navigator that keeps every path it is asked to visit
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    visited: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.visited.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited.lock().push(path.to_string());
    }
}

/// Something that happened while the component was idle
#[derive(Debug)]
pub enum SearchEvent {
    /// The quiet period after the last keystroke ran out
    DebounceElapsed { query: String },
    /// A search request finished
    Resolved {
        request: SearchRequest,
        outcome: Result<Vec<SearchResultItem>>,
    },
    /// The grace period after the input lost focus ran out
    BlurElapsed { token: u64 },
}

/// Debounced, paginated type-ahead search.
///
/// Input handlers (`on_query_change`, `on_load_more`, `on_select`,
/// `on_focus`, `on_blur`) run synchronously on the owner. Timers and HTTP
/// requests run as tasks that report back through an event channel;
/// `process_next` applies those events one at a time, so every state
/// mutation happens on the owner in arrival order.
pub struct IncrementalSearch<S: SearchService + 'static> {
    service: Arc<S>,
    navigator: Box<dyn Navigator>,
    settings: SearchSettings,
    state: SearchState,
    debounce: Debouncer,
    blur: Debouncer,
    blur_token: u64,
    in_flight: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<SearchEvent>,
    events_rx: mpsc::UnboundedReceiver<SearchEvent>,
}

impl<S: SearchService + 'static> IncrementalSearch<S> {
    pub fn new(service: Arc<S>, navigator: impl Navigator + 'static, settings: SearchSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            service,
            navigator: Box::new(navigator),
            debounce: Debouncer::new(settings.debounce()),
            blur: Debouncer::new(settings.blur_grace()),
            settings,
            state: SearchState::new(),
            blur_token: 0,
            in_flight: None,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn query(&self) -> &str {
        self.state.query()
    }

    pub fn results(&self) -> &[SearchResultItem] {
        self.state.results()
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.state.cursor()
    }

    pub fn has_more(&self) -> bool {
        self.state.cursor().has_more
    }

    pub fn dropdown(&self) -> Dropdown {
        self.state.dropdown()
    }

    pub fn is_dropdown_visible(&self) -> bool {
        self.state.dropdown() == Dropdown::Visible
    }

    pub fn is_loading(&self) -> bool {
        self.state.pending().is_some()
    }

    pub fn is_debounce_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Record a keystroke. Empty text resets synchronously; anything else
    /// (re)arms the debounce timer.
    pub fn on_query_change(&mut self, text: impl Into<String>) {
        let text = text.into();

        if !self.state.set_query(text.clone()) {
            self.debounce.cancel();
            self.abort_in_flight();
            debug!("Query cleared, search state reset");
            return;
        }

        let tx = self.events_tx.clone();
        let cancelled = self.debounce.schedule(async move {
            let _ = tx.send(SearchEvent::DebounceElapsed { query: text });
        });
        if cancelled {
            SEARCH_DEBOUNCE_CANCELLATIONS_TOTAL.inc();
        }
    }

    /// Issue a fresh search once the quiet period for `text` has elapsed.
    /// Ignored if the input no longer holds `text`.
    pub fn on_debounce_fire(&mut self, text: &str) {
        if text.is_empty() || text != self.state.query() {
            debug!(query = text, "Debounce fired for outdated query, ignoring");
            return;
        }

        let request = self.state.begin_fresh(text);
        self.dispatch(request);
    }

    /// Request the next page of the active query. Returns `false` when no
    /// request was issued (no more pages, or a request is still in flight).
    pub fn on_load_more(&mut self) -> bool {
        match self.state.begin_load_more() {
            Some(request) => {
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    /// Press on a result in the dropdown. Hides the dropdown and navigates
    /// to the result's detail path; returns that path.
    pub fn on_select(&mut self, item: &SearchResultItem) -> Option<String> {
        if self.state.dropdown() != Dropdown::Visible {
            debug!(id = %item.id, "Selection ignored, dropdown is hidden");
            return None;
        }

        self.blur.cancel();
        self.state.hide();

        match routes::search_result_path(item) {
            Some(path) => {
                info!(id = %item.id, path = %path, "Navigating to search result");
                self.navigator.navigate(&path);
                Some(path)
            }
            None => {
                warn!(id = %item.id, "Search result lacks type, subtype or submodel; not navigating");
                None
            }
        }
    }

    pub fn on_focus(&mut self) {
        self.blur_token += 1;
        self.blur.cancel();
        self.state.focus();
    }

    /// Input lost focus: hide the dropdown after the grace period, leaving
    /// time for a press on a result to land first.
    pub fn on_blur(&mut self) {
        self.blur_token += 1;
        let token = self.blur_token;
        let tx = self.events_tx.clone();

        self.blur.schedule(async move {
            let _ = tx.send(SearchEvent::BlurElapsed { token });
        });
    }

    /// Wait for the next timer or request event
    pub async fn next_event(&mut self) -> Option<SearchEvent> {
        self.events_rx.recv().await
    }

    /// Wait for one event and apply it
    pub async fn process_next(&mut self) {
        if let Some(event) = self.next_event().await {
            self.handle_event(event);
        }
    }

    /// Apply every event that is already queued. Returns how many were handled.
    pub fn process_ready(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Keep processing events until no debounce timer is armed and no
    /// request of the current generation is in flight.
    pub async fn settle(&mut self) {
        loop {
            self.process_ready();
            if !self.debounce.is_pending() && !self.is_loading() {
                break;
            }
            self.process_next().await;
        }
    }

    pub fn handle_event(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::DebounceElapsed { query } => self.on_debounce_fire(&query),
            SearchEvent::Resolved { request, outcome } => self.on_resolved(request, outcome),
            SearchEvent::BlurElapsed { token } => {
                if token == self.blur_token {
                    self.state.hide();
                }
            }
        }
    }

    fn on_resolved(&mut self, request: SearchRequest, outcome: Result<Vec<SearchResultItem>>) {
        let kind: &'static str = request.kind.into();

        if let Err(e) = &outcome {
            SEARCH_FAILURES_TOTAL.with_label_values(&[kind]).inc();
            if e.is_search_failure() {
                warn!(
                    kind = kind,
                    query = %request.query,
                    page = request.page,
                    error_code = e.error_code(),
                    error = %e,
                    "Search request failed"
                );
            } else {
                error!(
                    kind = kind,
                    query = %request.query,
                    error_code = e.error_code(),
                    error = %e,
                    "Search service misconfigured"
                );
            }
        }

        match self.state.apply(&request, outcome) {
            ApplyOutcome::Applied => {
                self.in_flight = None;
                debug!(
                    kind = kind,
                    query = %request.query,
                    page = request.page,
                    results = self.state.results().len(),
                    has_more = self.state.cursor().has_more,
                    dropdown = %self.state.dropdown(),
                    "Search response applied"
                );
            }
            ApplyOutcome::Stale => {
                SEARCH_STALE_RESPONSES_TOTAL.inc();
                debug!(
                    kind = kind,
                    query = %request.query,
                    generation = request.generation,
                    current = self.state.generation(),
                    "Discarding stale search response"
                );
            }
        }
    }

    fn dispatch(&mut self, request: SearchRequest) {
        let kind: &'static str = request.kind.into();
        SEARCH_REQUESTS_TOTAL.with_label_values(&[kind]).inc();
        debug!(
            kind = kind,
            query = %request.query,
            page = request.page,
            generation = request.generation,
            "Issuing search request"
        );

        // Anything still running belongs to a superseded generation
        if request.kind == RequestKind::Fresh {
            self.abort_in_flight();
        }

        let service = self.service.clone();
        let tx = self.events_tx.clone();
        let per_page = self.settings.page_size;

        self.in_flight = Some(tokio::spawn(async move {
            let outcome = service.search(&request.query, request.page, per_page).await;
            let _ = tx.send(SearchEvent::Resolved { request, outcome });
        }));
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl<S: SearchService + 'static> Drop for IncrementalSearch<S> {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
