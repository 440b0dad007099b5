//! Shared fixtures for the search integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use parts_catalog::client::SearchService;
use parts_catalog::config::SearchSettings;
use parts_catalog::models::SearchResultItem;
use parts_catalog::{AppError, Result};
use std::collections::HashMap;
use std::time::Duration;

/// Canned answer for one (query, page) pair
#[derive(Clone)]
pub enum Reply {
    Items(Vec<SearchResultItem>),
    Fail,
}

/// In-memory search service with per-request latency
#[derive(Default)]
pub struct ScriptedSearch {
    replies: Mutex<HashMap<(String, u32), (Duration, Reply)>>,
    calls: Mutex<Vec<(String, u32, u32)>>,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, query: &str, page: u32, delay: Duration, reply: Reply) {
        self.replies
            .lock()
            .insert((query.to_string(), page), (delay, reply));
    }

    pub fn items(&self, query: &str, page: u32, items: Vec<SearchResultItem>) {
        self.reply(query, page, Duration::from_millis(20), Reply::Items(items));
    }

    pub fn fail(&self, query: &str, page: u32) {
        self.reply(query, page, Duration::from_millis(20), Reply::Fail);
    }

    /// (query, page, per_page) of every request received, in order
    pub fn calls(&self) -> Vec<(String, u32, u32)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SearchService for ScriptedSearch {
    async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<Vec<SearchResultItem>> {
        self.calls.lock().push((query.to_string(), page, per_page));

        let scripted = self.replies.lock().get(&(query.to_string(), page)).cloned();
        let (delay, reply) =
            scripted.unwrap_or((Duration::from_millis(20), Reply::Items(Vec::new())));

        tokio::time::sleep(delay).await;

        match reply {
            Reply::Items(items) => Ok(items),
            Reply::Fail => Err(AppError::Transport("connection reset by peer".to_string())),
        }
    }
}

/// `count` routable hits named `{prefix}-{n}`
pub fn hits(prefix: &str, count: usize) -> Vec<SearchResultItem> {
    (0..count)
        .map(|n| {
            SearchResultItem::new(format!("{}-{}", prefix, n))
                .with_kind("Car")
                .with_subtype("Civic")
                .with_submodel("LX")
        })
        .collect()
}

pub fn ids(items: &[SearchResultItem]) -> Vec<String> {
    items.iter().map(|item| item.id.clone()).collect()
}

pub fn settings() -> SearchSettings {
    SearchSettings {
        debounce_ms: 300,
        page_size: 50,
        blur_grace_ms: 200,
    }
}
