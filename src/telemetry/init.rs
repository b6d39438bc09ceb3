// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Telemetry initialization and the process-wide tracer handle.
//!
//! Initialization is guarded by a checked flag: the first successful call
//! installs the global tracer provider, and later calls never overwrite
//! it. A failed or skipped initialization leaves the global no-op
//! provider in place, so instrumented operations run untraced instead of
//! failing the caller's request.

use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, InstrumentationScope, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::TelemetryError;
use crate::semconv;

/// Instrumentation scope name reported on every exported span.
pub const TRACER_NAME: &str = "llmtrace-core";

static INITIALIZED: AtomicBool = AtomicBool::new(false);

static SCOPE: Lazy<InstrumentationScope> = Lazy::new(|| {
    InstrumentationScope::builder(TRACER_NAME)
        .with_version(env!("CARGO_PKG_VERSION"))
        .build()
});

/// Get the process-wide tracer handle.
///
/// Resolves against whichever provider is globally registered. Before
/// [`init_telemetry`] has run (or if it was skipped), this is the global
/// no-op tracer and instrumented operations run untraced.
pub fn tracer() -> global::BoxedTracer {
    global::tracer_provider().tracer_with_scope(SCOPE.clone())
}

/// Configuration for telemetry initialization.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Master switch; when false no provider is installed.
    pub enabled: bool,

    /// Service name reported in the span resource.
    pub service_name: String,

    /// Service version reported in the span resource.
    pub service_version: String,

    /// OTLP collector endpoint (gRPC), e.g. `http://localhost:4317`.
    pub otlp_endpoint: Option<String>,

    /// Also write spans to stdout (development aid).
    pub console_export: bool,

    /// Custom log filter directive (overrides RUST_LOG).
    pub filter_directive: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "llmtrace".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: None,
            console_export: false,
            filter_directive: None,
        }
    }
}

impl TelemetryConfig {
    /// Create a config suitable for development: stdout spans, no OTLP.
    pub fn development() -> Self {
        Self {
            console_export: true,
            ..Default::default()
        }
    }

    /// Create a config suitable for production export to a collector.
    pub fn production(endpoint: impl Into<String>) -> Self {
        Self {
            otlp_endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    /// Create a disabled config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Set the OTLP collector endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    /// Set the service name.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Enable or disable stdout span export.
    pub fn with_console_export(mut self, console: bool) -> Self {
        self.console_export = console;
        self
    }

    /// Set a custom filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter_directive = Some(filter.into());
        self
    }

    fn validate(&self) -> Result<(), TelemetryError> {
        if self.service_name.is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "service_name must not be empty".to_string(),
            ));
        }
        if matches!(&self.otlp_endpoint, Some(endpoint) if endpoint.is_empty()) {
            return Err(TelemetryError::InvalidConfig(
                "otlp_endpoint must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Guard that flushes and shuts down the tracer provider on drop.
///
/// Keep this guard alive for the duration of your program.
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl TelemetryGuard {
    /// Shut down the provider and flush pending spans.
    pub fn shutdown(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(error) = provider.shutdown() {
                tracing::warn!("failed to shut down tracer provider: {error}");
            }
        }
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Initialize telemetry with the given configuration.
///
/// Builds a tracer provider with a batched OTLP exporter (and optional
/// stdout exporter), installs it as the global provider, and wires a
/// `tracing` subscriber with an OpenTelemetry layer.
///
/// The first successful call wins: later calls log a warning and return
/// a no-op guard without touching the existing provider. A conflicting
/// global `tracing` subscriber likewise degrades with a warning.
///
/// # Errors
///
/// Returns an error for invalid configuration or a failed OTLP exporter
/// build. Neither leaves a partially-registered provider behind.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    if !config.enabled {
        tracing::debug!("telemetry disabled; spans will not be exported");
        return Ok(TelemetryGuard { provider: None });
    }
    config.validate()?;

    if INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::warn!("telemetry already initialized; keeping the existing tracer provider");
        return Ok(TelemetryGuard { provider: None });
    }

    let resource = Resource::new([
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", config.service_version.clone()),
        KeyValue::new(semconv::PROJECT_NAME, config.service_name.clone()),
    ]);

    let mut builder = TracerProvider::builder().with_resource(resource);

    if let Some(endpoint) = &config.otlp_endpoint {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint.clone())
            .build()
            .map_err(|error| TelemetryError::Exporter(error.to_string()))?;
        // Batch rather than per-span export; the collector sees flushes.
        builder = builder.with_batch_exporter(exporter, runtime::Tokio);
    }

    if config.console_export {
        builder = builder.with_simple_exporter(opentelemetry_stdout::SpanExporter::default());
    }

    let provider = builder.build();
    global::set_tracer_provider(provider.clone());

    let filter = match &config.filter_directive {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|error| TelemetryError::InvalidConfig(error.to_string()))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let otel_layer = tracing_opentelemetry::layer().with_tracer(provider.tracer(TRACER_NAME));
    let subscriber_result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .try_init();
    if let Err(error) = subscriber_result {
        tracing::warn!("tracing subscriber already installed; continuing without it: {error}");
    }

    tracing::info!(
        service = %config.service_name,
        endpoint = config.otlp_endpoint.as_deref().unwrap_or("none"),
        "telemetry initialized"
    );

    Ok(TelemetryGuard {
        provider: Some(provider),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TelemetryConfig::default();
        assert!(config.enabled);
        assert_eq!(config.service_name, "llmtrace");
        assert!(config.otlp_endpoint.is_none());
        assert!(!config.console_export);
    }

    #[test]
    fn test_config_builders() {
        let config = TelemetryConfig::default()
            .with_endpoint("http://localhost:4317")
            .with_service_name("agent")
            .with_console_export(true)
            .with_filter("llmtrace=trace");

        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://localhost:4317"));
        assert_eq!(config.service_name, "agent");
        assert!(config.console_export);
        assert_eq!(config.filter_directive.as_deref(), Some("llmtrace=trace"));
    }

    #[test]
    fn test_validate_rejects_empty_endpoint() {
        let config = TelemetryConfig::default().with_endpoint("");
        assert!(matches!(
            init_telemetry(&config),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_disabled_config_installs_nothing() {
        let guard = init_telemetry(&TelemetryConfig::disabled()).unwrap();
        drop(guard);
    }
}
