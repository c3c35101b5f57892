//! Logging, tracing, and metrics setup.
//!
//! Always installs a fmt layer on stderr (stdout carries the run's final
//! output path). When an OTLP endpoint is configured, spans, metrics, and
//! log events are exported there as well.

pub mod dispatch;
pub mod genai;
pub mod metrics;

use crate::error::{Error, Result};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;

/// Configuration for telemetry initialization.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Optional OTLP endpoint (e.g. "http://localhost:4317").
    pub endpoint: Option<String>,
    /// The service name reported in exported signals.
    pub service_name: String,
    /// Filter used when `RUST_LOG` is unset (e.g. "info").
    pub log_level: String,
}

/// OTLP pipelines kept alive for the duration of a run.
struct Exporters {
    tracer: SdkTracerProvider,
    meter: SdkMeterProvider,
    logger: SdkLoggerProvider,
}

/// Flushes and shuts down exporters on drop. Hold it until the run ends so
/// the last batch's spans and counters are not lost.
pub struct TelemetryGuard {
    exporters: Option<Exporters>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        // Logs first so events emitted during span shutdown still go out.
        if let Some(ex) = self.exporters.take() {
            let _ = ex.logger.shutdown();
            let _ = ex.meter.shutdown();
            let _ = ex.tracer.shutdown();
        }
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Fails if an OTLP exporter cannot be built or a global subscriber is
/// already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard> {
    use opentelemetry::trace::TracerProvider as _;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let fmt = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr);

    let Some(endpoint) = config.endpoint.as_deref() else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt)
            .try_init()
            .map_err(|e| Error::Other(format!("failed to init tracing subscriber: {e}")))?;
        return Ok(TelemetryGuard { exporters: None });
    };

    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .build();
    let exporters = build_exporters(endpoint, resource)?;
    opentelemetry::global::set_meter_provider(exporters.meter.clone());

    let trace_layer =
        tracing_opentelemetry::layer().with_tracer(exporters.tracer.tracer("codegen-eval"));
    let log_layer = opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge::new(
        &exporters.logger,
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .with(trace_layer)
        .with(log_layer)
        .try_init()
        .map_err(|e| Error::Other(format!("failed to init tracing subscriber: {e}")))?;

    Ok(TelemetryGuard {
        exporters: Some(exporters),
    })
}

fn build_exporters(endpoint: &str, resource: Resource) -> Result<Exporters> {
    use opentelemetry_otlp::{LogExporter, MetricExporter, SpanExporter, WithExportConfig as _};

    let exporter_err = |signal: &str, e: opentelemetry_otlp::ExporterBuildError| {
        Error::Other(format!("failed to create OTLP {signal} exporter: {e}"))
    };

    let spans = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| exporter_err("span", e))?;
    let metrics = MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| exporter_err("metric", e))?;
    let logs = LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| exporter_err("log", e))?;

    Ok(Exporters {
        tracer: SdkTracerProvider::builder()
            .with_batch_exporter(spans)
            .with_resource(resource.clone())
            .build(),
        meter: SdkMeterProvider::builder()
            .with_periodic_exporter(metrics)
            .with_resource(resource.clone())
            .build(),
        logger: SdkLoggerProvider::builder()
            .with_batch_exporter(logs)
            .with_resource(resource)
            .build(),
    })
}
