//! Prometheus metrics for the prompt service.
//!
//! - Render metrics (count by category/outcome, duration)
//! - Registry metrics (loaded templates, reloads, source failures)

mod helpers;

pub use helpers::{encode_metrics, RegistryMetrics, RenderMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "trip_prompt";

lazy_static! {
    // ============================================================================
    // Render Metrics
    // ============================================================================

    /// Render calls by category and outcome
    pub static ref TEMPLATE_RENDERS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_renders_total", METRIC_PREFIX),
        "Total number of template render calls",
        &["category", "outcome"]
    ).unwrap();

    /// Time spent rendering a template
    pub static ref TEMPLATE_RENDER_DURATION: Histogram = register_histogram!(
        format!("{}_template_render_duration_seconds", METRIC_PREFIX),
        "Template render duration in seconds",
        vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]
    ).unwrap();

    // ============================================================================
    // Registry Metrics
    // ============================================================================

    /// Templates currently registered
    pub static ref TEMPLATES_LOADED: IntGauge = register_int_gauge!(
        format!("{}_templates_loaded", METRIC_PREFIX),
        "Number of registered templates"
    ).unwrap();

    /// Registry reloads by outcome
    pub static ref TEMPLATE_RELOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_reloads_total", METRIC_PREFIX),
        "Total number of registry reloads",
        &["outcome"]
    ).unwrap();

    /// Sources skipped because they failed to load
    pub static ref TEMPLATE_SOURCE_ERRORS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_source_errors_total", METRIC_PREFIX),
        "Total number of template source load failures"
    ).unwrap();
}
