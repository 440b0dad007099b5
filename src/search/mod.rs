//! Incremental type-ahead search.
//!
//! Keystrokes are debounced into page-1 searches; further pages are loaded
//! on demand and appended. Every request carries the generation it was
//! issued under, and responses from an older generation are dropped, so a
//! slow response can never overwrite the results of a newer query.
//!
//! # Example
//!
//! ```no_run
//! use parts_catalog::client::CatalogClient;
//! use parts_catalog::config::Config;
//! use parts_catalog::search::{IncrementalSearch, RecordingNavigator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let client = Arc::new(CatalogClient::new(&config.api)?);
//!     let navigator = RecordingNavigator::new();
//!     let mut search = IncrementalSearch::new(client, navigator.clone(), config.search.clone());
//!
//!     search.on_query_change("brake");
//!     search.settle().await;
//!
//!     if search.has_more() && search.on_load_more() {
//!         search.settle().await;
//!     }
//!
//!     if let Some(first) = search.results().first().cloned() {
//!         search.on_select(&first);
//!     }
//!     println!("visited: {:?}", navigator.visited());
//!     Ok(())
//! }
//! ```

mod client;
mod debounce;
mod state;

pub use client::{IncrementalSearch, Navigator, RecordingNavigator, SearchEvent};
pub use debounce::Debouncer;
pub use state::{
    ApplyOutcome, Dropdown, PaginationCursor, RequestKind, SearchRequest, SearchState,
};
