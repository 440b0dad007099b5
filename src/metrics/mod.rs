//! Prometheus metrics for the catalog client.
//!
//! Counters are usable before registration; `init_metrics` only attaches
//! them to the registry that `gather_metrics` exports.
//!
//! # Example
//! ```no_run
//! use parts_catalog::metrics::{init_metrics, gather_metrics, SEARCH_REQUESTS_TOTAL};
//!
//! init_metrics().unwrap();
//! SEARCH_REQUESTS_TOTAL.with_label_values(&["fresh"]).inc();
//! println!("{}", gather_metrics());
//! ```

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

const NAMESPACE: &str = "parts_catalog";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Search Metrics
    // ============================================================================

    /// Search requests issued
    ///
    /// Labels: kind (fresh, load_more)
    pub static ref SEARCH_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("search_requests_total", "Total number of search requests issued")
            .namespace(NAMESPACE),
        &["kind"]
    ).expect("Failed to create SEARCH_REQUESTS_TOTAL metric");

    /// Search requests that failed and were collapsed into an empty state
    ///
    /// Labels: kind (fresh, load_more)
    pub static ref SEARCH_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("search_failures_total", "Total number of failed search requests")
            .namespace(NAMESPACE),
        &["kind"]
    ).expect("Failed to create SEARCH_FAILURES_TOTAL metric");

    /// Responses discarded because a newer request superseded them
    pub static ref SEARCH_STALE_RESPONSES_TOTAL: IntCounter = IntCounter::with_opts(
        Opts::new("search_stale_responses_total", "Total number of discarded stale search responses")
            .namespace(NAMESPACE)
    ).expect("Failed to create SEARCH_STALE_RESPONSES_TOTAL metric");

    /// Pending debounce timers cancelled by a later keystroke
    pub static ref SEARCH_DEBOUNCE_CANCELLATIONS_TOTAL: IntCounter = IntCounter::with_opts(
        Opts::new("search_debounce_cancellations_total", "Total number of cancelled debounce timers")
            .namespace(NAMESPACE)
    ).expect("Failed to create SEARCH_DEBOUNCE_CANCELLATIONS_TOTAL metric");

    // ============================================================================
    // Catalog Cache Metrics
    // ============================================================================

    /// Detail-list cache lookups
    ///
    /// Labels: result (fresh, stale, miss)
    pub static ref CATALOG_CACHE_LOOKUPS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("catalog_cache_lookups_total", "Total number of catalog cache lookups")
            .namespace(NAMESPACE),
        &["result"]
    ).expect("Failed to create CATALOG_CACHE_LOOKUPS_TOTAL metric");
}

/// Register all metrics with the global registry
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_FAILURES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_STALE_RESPONSES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_DEBOUNCE_CANCELLATIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(CATALOG_CACHE_LOOKUPS_TOTAL.clone()))?;

    tracing::debug!("Prometheus metrics registered");
    Ok(())
}

/// Render all registered metrics in Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
