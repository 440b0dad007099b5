//! Client library for a vehicle parts catalog.
//!
//! The catalog is browsed as a hierarchy (Type → Model → Submodel →
//! ModelYear → Version → Parts) backed by a REST API, with a debounced,
//! paginated type-ahead search on top.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod search;
pub mod state;

pub use error::{AppError, Result};
