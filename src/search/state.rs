//! Search state machine.
//!
//! Pure, synchronous transitions for the type-ahead dropdown. The async
//! driver in `client` owns one `SearchState` and feeds it keystrokes and
//! request outcomes in arrival order.

use crate::error::AppError;
use crate::models::SearchResultItem;
use serde::{Deserialize, Serialize};

/// Visibility of the results dropdown
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Dropdown {
    #[default]
    Hidden,
    Visible,
}

/// Position in the paginated result stream of the active query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    /// Last page fetched, starting at 1
    pub page: u32,
    /// Whether another page may exist
    pub has_more: bool,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            page: 1,
            has_more: true,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum RequestKind {
    /// Page 1 of a new query; replaces the result list
    Fresh,
    /// A following page of the active query; appends to the result list
    LoadMore,
}

/// A search request as issued, tagged with the generation it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: u64,
    pub kind: RequestKind,
    pub query: String,
    pub page: u32,
}

/// Result of feeding a response into the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The response belonged to the current generation and was applied
    Applied,
    /// A newer request superseded this one; nothing changed
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    active_query: String,
    results: Vec<SearchResultItem>,
    cursor: PaginationCursor,
    dropdown: Dropdown,
    generation: u64,
    pending: Option<RequestKind>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently in the input
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Query the displayed results belong to
    pub fn active_query(&self) -> &str {
        &self.active_query
    }

    pub fn results(&self) -> &[SearchResultItem] {
        &self.results
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    pub fn dropdown(&self) -> Dropdown {
        self.dropdown
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Kind of the request in flight for the current generation, if any
    pub fn pending(&self) -> Option<RequestKind> {
        self.pending
    }

    pub fn can_load_more(&self) -> bool {
        !self.active_query.is_empty() && self.cursor.has_more && self.pending.is_none()
    }

    /// Record a keystroke. Returns `true` when the text is non-empty and a
    /// debounced search should be (re)scheduled.
    pub fn set_query(&mut self, text: String) -> bool {
        self.query = text;
        if self.query.is_empty() {
            self.clear();
            false
        } else {
            true
        }
    }

    /// Drop all derived state and invalidate any request in flight
    fn clear(&mut self) {
        self.active_query.clear();
        self.results.clear();
        self.cursor = PaginationCursor::default();
        self.dropdown = Dropdown::Hidden;
        self.pending = None;
        self.generation += 1;
    }

    /// Start page 1 for `query`, superseding every earlier request
    pub fn begin_fresh(&mut self, query: &str) -> SearchRequest {
        self.generation += 1;
        self.active_query = query.to_string();
        self.pending = Some(RequestKind::Fresh);

        SearchRequest {
            generation: self.generation,
            kind: RequestKind::Fresh,
            query: query.to_string(),
            page: 1,
        }
    }

    /// Start the next page of the active query, if allowed
    pub fn begin_load_more(&mut self) -> Option<SearchRequest> {
        if !self.can_load_more() {
            return None;
        }

        self.pending = Some(RequestKind::LoadMore);
        Some(SearchRequest {
            generation: self.generation,
            kind: RequestKind::LoadMore,
            query: self.active_query.clone(),
            page: self.cursor.page + 1,
        })
    }

    /// Apply a response. Responses from a superseded generation are ignored.
    pub fn apply(
        &mut self,
        request: &SearchRequest,
        outcome: Result<Vec<SearchResultItem>, AppError>,
    ) -> ApplyOutcome {
        if request.generation != self.generation {
            return ApplyOutcome::Stale;
        }
        self.pending = None;

        match (request.kind, outcome) {
            (RequestKind::Fresh, Ok(items)) => {
                self.cursor = PaginationCursor {
                    page: 1,
                    has_more: !items.is_empty(),
                };
                self.results = items;
                self.show_if_populated();
            }
            (RequestKind::Fresh, Err(_)) => {
                self.results.clear();
                self.cursor.has_more = false;
                self.dropdown = Dropdown::Hidden;
            }
            (RequestKind::LoadMore, Ok(items)) => {
                self.cursor = PaginationCursor {
                    page: request.page,
                    has_more: !items.is_empty(),
                };
                self.results.extend(items);
                self.show_if_populated();
            }
            // Already loaded pages survive a failed follow-up page
            (RequestKind::LoadMore, Err(_)) => {
                self.cursor.has_more = false;
            }
        }

        ApplyOutcome::Applied
    }

    fn show_if_populated(&mut self) {
        self.dropdown = if self.results.is_empty() {
            Dropdown::Hidden
        } else {
            Dropdown::Visible
        };
    }

    /// Input regained focus: reopen over the results already held
    pub fn focus(&mut self) {
        if !self.query.is_empty() && !self.results.is_empty() {
            self.dropdown = Dropdown::Visible;
        }
    }

    pub fn hide(&mut self) {
        self.dropdown = Dropdown::Hidden;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(prefix: &str, count: usize) -> Vec<SearchResultItem> {
        (0..count)
            .map(|i| SearchResultItem::new(format!("{}-{}", prefix, i)))
            .collect()
    }

    fn transport_error() -> AppError {
        AppError::Transport("connection reset".to_string())
    }

    #[test]
    fn test_empty_query_clears_everything() {
        let mut state = SearchState::new();
        assert!(state.set_query("brake".to_string()));
        let request = state.begin_fresh("brake");
        state.apply(&request, Ok(items("b", 3)));
        assert_eq!(state.dropdown(), Dropdown::Visible);

        assert!(!state.set_query(String::new()));
        assert!(state.results().is_empty());
        assert_eq!(state.cursor(), PaginationCursor::default());
        assert_eq!(state.dropdown(), Dropdown::Hidden);
        assert_eq!(state.pending(), None);
    }

    #[test]
    fn test_clearing_invalidates_in_flight_request() {
        let mut state = SearchState::new();
        state.set_query("pad".to_string());
        let request = state.begin_fresh("pad");

        state.set_query(String::new());
        assert_eq!(state.apply(&request, Ok(items("p", 2))), ApplyOutcome::Stale);
        assert!(state.results().is_empty());
        assert_eq!(state.dropdown(), Dropdown::Hidden);
    }

    #[test]
    fn test_stale_fresh_response_is_discarded() {
        let mut state = SearchState::new();
        state.set_query("x".to_string());
        let a = state.begin_fresh("x");
        state.set_query("y".to_string());
        let b = state.begin_fresh("y");

        assert_eq!(state.apply(&b, Ok(items("y", 2))), ApplyOutcome::Applied);
        assert_eq!(state.apply(&a, Ok(items("x", 5))), ApplyOutcome::Stale);

        let ids: Vec<_> = state.results().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["y-0", "y-1"]);
        assert_eq!(state.active_query(), "y");
    }

    #[test]
    fn test_pagination_accumulates_in_page_order() {
        let mut state = SearchState::new();
        state.set_query("filter".to_string());
        let first = state.begin_fresh("filter");
        state.apply(&first, Ok(items("p1", 50)));

        let second = state.begin_load_more().unwrap();
        assert_eq!(second.page, 2);
        assert_eq!(second.query, "filter");
        state.apply(&second, Ok(items("p2", 30)));

        assert_eq!(state.results().len(), 80);
        assert_eq!(state.results()[0].id, "p1-0");
        assert_eq!(state.results()[49].id, "p1-49");
        assert_eq!(state.results()[50].id, "p2-0");
        assert_eq!(state.cursor(), PaginationCursor { page: 2, has_more: true });
    }

    #[test]
    fn test_duplicates_across_pages_are_kept() {
        let mut state = SearchState::new();
        state.set_query("oil".to_string());
        let first = state.begin_fresh("oil");
        state.apply(&first, Ok(items("same", 2)));
        let second = state.begin_load_more().unwrap();
        state.apply(&second, Ok(items("same", 2)));

        assert_eq!(state.results().len(), 4);
    }

    #[test]
    fn test_empty_page_ends_pagination() {
        let mut state = SearchState::new();
        state.set_query("rotor".to_string());
        let first = state.begin_fresh("rotor");
        state.apply(&first, Ok(items("r", 10)));
        let second = state.begin_load_more().unwrap();
        state.apply(&second, Ok(vec![]));

        assert!(!state.cursor().has_more);
        assert_eq!(state.results().len(), 10);
        assert!(state.begin_load_more().is_none());
    }

    #[test]
    fn test_empty_first_page_disables_load_more() {
        let mut state = SearchState::new();
        state.set_query("zzz".to_string());
        let first = state.begin_fresh("zzz");
        state.apply(&first, Ok(vec![]));

        assert_eq!(state.dropdown(), Dropdown::Hidden);
        assert!(!state.can_load_more());
    }

    #[test]
    fn test_fresh_failure_clears_previous_results() {
        let mut state = SearchState::new();
        state.set_query("wiper".to_string());
        let first = state.begin_fresh("wiper");
        state.apply(&first, Ok(items("w", 4)));

        state.set_query("brake".to_string());
        let second = state.begin_fresh("brake");
        state.apply(&second, Err(transport_error()));

        assert!(state.results().is_empty());
        assert!(!state.cursor().has_more);
        assert_eq!(state.dropdown(), Dropdown::Hidden);
    }

    #[test]
    fn test_load_more_failure_keeps_loaded_results() {
        let mut state = SearchState::new();
        state.set_query("brake".to_string());
        let first = state.begin_fresh("brake");
        state.apply(&first, Ok(items("b", 7)));

        let second = state.begin_load_more().unwrap();
        state.apply(
            &second,
            Err(AppError::Server {
                status: 500,
                body: String::new(),
            }),
        );

        assert_eq!(state.results().len(), 7);
        assert_eq!(state.dropdown(), Dropdown::Visible);
        assert!(!state.cursor().has_more);
        assert!(state.begin_load_more().is_none());
    }

    #[test]
    fn test_load_more_is_serialized() {
        let mut state = SearchState::new();
        state.set_query("belt".to_string());
        assert!(state.begin_load_more().is_none(), "no active query yet");

        let first = state.begin_fresh("belt");
        assert!(state.begin_load_more().is_none(), "fresh search still in flight");
        state.apply(&first, Ok(items("b", 5)));

        assert!(state.begin_load_more().is_some());
        assert!(state.begin_load_more().is_none(), "load more already in flight");
    }

    #[test]
    fn test_load_more_superseded_by_new_query() {
        let mut state = SearchState::new();
        state.set_query("hose".to_string());
        let first = state.begin_fresh("hose");
        state.apply(&first, Ok(items("h", 5)));
        let more = state.begin_load_more().unwrap();

        state.set_query("hoses".to_string());
        let fresh = state.begin_fresh("hoses");
        assert_eq!(state.apply(&more, Ok(items("old", 5))), ApplyOutcome::Stale);
        assert_eq!(state.pending(), Some(RequestKind::Fresh));

        state.apply(&fresh, Ok(items("new", 1)));
        assert_eq!(state.results().len(), 1);
    }

    #[test]
    fn test_focus_reopens_existing_results() {
        let mut state = SearchState::new();
        state.set_query("cap".to_string());
        let first = state.begin_fresh("cap");
        state.apply(&first, Ok(items("c", 2)));

        state.hide();
        assert_eq!(state.dropdown(), Dropdown::Hidden);
        state.focus();
        assert_eq!(state.dropdown(), Dropdown::Visible);
        assert_eq!(state.results().len(), 2);
    }

    #[test]
    fn test_focus_without_query_stays_hidden() {
        let mut state = SearchState::new();
        state.focus();
        assert_eq!(state.dropdown(), Dropdown::Hidden);
        assert_eq!(Dropdown::Hidden.to_string(), "hidden");
    }
}
