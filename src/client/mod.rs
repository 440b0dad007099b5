//! REST client for the catalog API and the search endpoint.

mod http;
mod normalize;
mod traits;

pub use http::CatalogClient;
pub use normalize::{normalize_list, normalize_search_results};
pub use traits::{CatalogApi, SearchService};
