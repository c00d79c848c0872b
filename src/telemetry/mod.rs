//! Tracing setup with optional OpenTelemetry export.
//!
//! Logs always go to stdout through the `tracing-subscriber` fmt layer,
//! filtered by `RUST_LOG` (default `info`). When `otel.enabled` is set,
//! spans are also exported over OTLP gRPC.
//!
//! # Configuration
//!
//! | Key | Description | Default |
//! |-----|-------------|---------|
//! | `otel.enabled` | Enable OpenTelemetry tracing | `false` |
//! | `otel.endpoint` | OTLP gRPC endpoint | `http://localhost:4317` |
//! | `otel.service_name` | Service name in traces | `trip-prompt-service` |
//! | `otel.sampling_ratio` | Trace sampling ratio (0.0-1.0) | `1.0` |

use anyhow::Context;
use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider as SdkTracerProvider},
    Resource,
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::OtelConfig;

/// Flushes pending spans when dropped at shutdown
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Failed to flush OpenTelemetry spans");
            }
        }
    }
}

/// Install the global subscriber. Hold the guard until the server exits.
pub fn init_telemetry(config: &OtelConfig) -> anyhow::Result<TelemetryGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let provider = config.enabled.then(|| build_tracer_provider(config)).transpose()?;
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer("trip-prompt-service"))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .init();

    match &provider {
        Some(_) => tracing::info!(
            endpoint = %config.endpoint,
            service_name = %config.service_name,
            sampling_ratio = config.sampling_ratio,
            "Tracing initialized with OTLP export"
        ),
        None => tracing::info!("Tracing initialized (OTLP export disabled)"),
    }

    Ok(TelemetryGuard { provider })
}

fn build_tracer_provider(config: &OtelConfig) -> anyhow::Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .build()
        .context("Failed to build OTLP exporter")?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(sampler_for(config.sampling_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(Resource::new([
            KeyValue::new(SERVICE_NAME, config.service_name.clone()),
            KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        ]))
        .build())
}

/// Clamp the configured ratio onto the sampler it implies
fn sampler_for(ratio: f64) -> Sampler {
    if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OtelConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.endpoint, "http://localhost:4317");
        assert_eq!(config.service_name, "trip-prompt-service");
        assert_eq!(config.sampling_ratio, 1.0);
    }

    #[test]
    fn test_sampler_bounds() {
        assert!(matches!(sampler_for(1.5), Sampler::AlwaysOn));
        assert!(matches!(sampler_for(0.0), Sampler::AlwaysOff));
        assert!(matches!(sampler_for(0.25), Sampler::TraceIdRatioBased(r) if r == 0.25));
    }

    #[test]
    fn test_guard_without_provider_drops_quietly() {
        let guard = TelemetryGuard { provider: None };
        drop(guard);
    }
}
