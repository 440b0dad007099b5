//! Drill-down catalog: cached listings for each level and the paths between them.

pub mod routes;
mod service;

pub use service::{Catalog, CatalogKey, YearStep};
