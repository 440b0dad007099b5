//! Response shape normalization.
//!
//! Listing and search endpoints answer with a flat array, an array wrapping
//! the list as its first element, or an object carrying the array under
//! `data`. All three collapse into one flat list.

use crate::error::{AppError, Result};
use crate::models::SearchResultItem;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Flatten a response body into a list of `T`
pub fn normalize_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>> {
    let elements = match body {
        Value::Array(elements) => elements,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(elements)) => elements,
            Some(other) => {
                return Err(AppError::MalformedResponse(format!(
                    "expected an array under `data`, found {}",
                    kind_of(&other)
                )))
            }
            None => {
                return Err(AppError::MalformedResponse(
                    "object response without a `data` array".to_string(),
                ))
            }
        },
        other => {
            return Err(AppError::MalformedResponse(format!(
                "expected an array, found {}",
                kind_of(&other)
            )))
        }
    };

    // A wrapped response carries the list as its first element
    let flat = match elements.first() {
        Some(Value::Array(_)) => match elements.into_iter().next() {
            Some(Value::Array(inner)) => inner,
            _ => Vec::new(),
        },
        _ => elements,
    };

    flat.into_iter()
        .map(|value| serde_json::from_value(value).map_err(AppError::from))
        .collect()
}

/// Flatten a search response into result items
pub fn normalize_search_results(body: Value) -> Result<Vec<SearchResultItem>> {
    normalize_list(body)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
