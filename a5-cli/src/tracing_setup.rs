//! Logging setup for the a5 binary
//!
//! `RUST_LOG` wins when set. Otherwise the default keeps sqlx and tantivy at
//! `warn` (tantivy logs every commit), and `--debug` adds debug output for
//! the a5 crates and request traces.
//!
//! With the `telemetry` feature, `--otel` also exports spans over OTLP:
//!   OTEL_EXPORTER_OTLP_ENDPOINT       # default http://localhost:4317
//!   OTEL_SERVICE_NAME                 # default a5

use anyhow::{anyhow, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "info,sqlx=warn,tantivy=warn";
const DEBUG_DIRECTIVES: &str = "info,a5=debug,a5_server=debug,tower_http=debug,sqlx=warn,tantivy=warn";

/// Tracing configuration options
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConfig {
    /// Debug output for a5 and request traces
    pub debug: bool,
    /// Export spans over OTLP
    pub otel: bool,
}

fn directives(config: &TracingConfig) -> &'static str {
    if config.debug {
        DEBUG_DIRECTIVES
    } else {
        DEFAULT_DIRECTIVES
    }
}

fn env_filter(config: &TracingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(config)))
}

/// Install the global subscriber: compact console output, plus OTLP export
/// when requested and compiled in.
pub fn init(config: &TracingConfig) -> Result<()> {
    let console = tracing_subscriber::fmt::layer()
        .with_target(config.debug)
        .compact();
    let registry = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(console);

    #[cfg(feature = "telemetry")]
    if config.otel {
        let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4317".to_string());
        let service_name =
            std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "a5".to_string());

        registry
            .with(otel_layer(&endpoint, &service_name)?)
            .try_init()
            .map_err(|err| anyhow!(err))?;
        tracing::info!(endpoint = %endpoint, service = %service_name, "Exporting spans over OTLP");
        return Ok(());
    }

    if config.otel {
        eprintln!("--otel requires the `telemetry` feature; using console logging");
    }
    registry.try_init().map_err(|err| anyhow!(err))
}

#[cfg(feature = "telemetry")]
fn otel_layer<S>(
    endpoint: &str,
    service_name: &str,
) -> Result<tracing_opentelemetry::OpenTelemetryLayer<S, opentelemetry_sdk::trace::Tracer>>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| anyhow!("Failed to create OTLP exporter: {}", e))?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(opentelemetry_sdk::Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.to_owned(),
        )]))
        .build();
    let tracer = provider.tracer("a5");

    // Export stops when the provider is dropped
    let _ = opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer))
}

/// Flush pending spans
#[cfg(feature = "telemetry")]
pub fn shutdown_otel() {
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(not(feature = "telemetry"))]
pub fn shutdown_otel() {}
