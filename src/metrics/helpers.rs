//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    TEMPLATES_LOADED, TEMPLATE_RELOADS_TOTAL, TEMPLATE_RENDERS_TOTAL, TEMPLATE_RENDER_DURATION,
    TEMPLATE_SOURCE_ERRORS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording render metrics
pub struct RenderMetrics;

impl RenderMetrics {
    /// Record a successful render
    pub fn record_rendered(category: &str, duration_secs: f64) {
        TEMPLATE_RENDERS_TOTAL
            .with_label_values(&[category, "ok"])
            .inc();
        TEMPLATE_RENDER_DURATION.observe(duration_secs);
    }

    /// Record a render for an unregistered category.
    ///
    /// Unknown categories share one label value to keep cardinality bounded.
    pub fn record_not_found() {
        TEMPLATE_RENDERS_TOTAL
            .with_label_values(&["unknown", "not_found"])
            .inc();
    }
}

/// Helper struct for recording registry metrics
pub struct RegistryMetrics;

impl RegistryMetrics {
    /// Set the number of registered templates
    pub fn set_loaded(count: usize) {
        TEMPLATES_LOADED.set(count as i64);
    }

    /// Record a completed reload
    pub fn record_reload(failed_sources: usize) {
        let outcome = if failed_sources == 0 { "ok" } else { "partial" };
        TEMPLATE_RELOADS_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record a source that failed to load
    pub fn record_source_error() {
        TEMPLATE_SOURCE_ERRORS_TOTAL.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_metrics() {
        RenderMetrics::record_rendered("conversation", 0.0001);
        RenderMetrics::record_not_found();
        // Just verify no panics
    }

    #[test]
    fn test_registry_metrics_are_encoded() {
        RegistryMetrics::set_loaded(3);
        RegistryMetrics::record_reload(0);
        RegistryMetrics::record_reload(1);
        RegistryMetrics::record_source_error();

        let output = encode_metrics().unwrap();
        assert!(output.contains("trip_prompt_template_reloads_total"));
        assert!(output.contains("trip_prompt_templates_loaded"));
    }
}
