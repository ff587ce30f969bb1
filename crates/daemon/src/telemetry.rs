//! Logging and optional OpenTelemetry export
//!
//! # Environment Variables
//!
//! - `LEDGER_RPC_LOG_FORMAT`: `pretty` (default) or `json`
//! - `LEDGER_RPC_LOG_DIR`: also write daily-rotated JSON logs here
//! - `RUST_LOG`: filter (default `ledger_rpc=info`)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint, requires the `telemetry` feature
//! - `OTEL_SERVICE_NAME`: service name (default `ledger-rpcd`)

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

const DEFAULT_LOG_FILTER: &str = "ledger_rpc=info";
const LOG_FILE_PREFIX: &str = "ledger-rpcd.log";
const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

type Filtered = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Filtered> + Send + Sync>;

/// Install the global subscriber. Keep the guard alive to flush file logs.
pub fn init_logging() -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;
    let format = std::env::var("LEDGER_RPC_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let mut layers: Vec<BoxedLayer> = Vec::new();
    match format.as_str() {
        "json" => layers.push(fmt::layer().json().boxed()),
        _ => layers.push(fmt::layer().pretty().boxed()),
    }

    let mut guard = None;
    if let Ok(dir) = std::env::var("LEDGER_RPC_LOG_DIR") {
        let dir = shellexpand::tilde(&dir).into_owned();
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
        guard = Some(file_guard);
    }

    let endpoint = otlp_endpoint();
    if let Some(endpoint) = &endpoint {
        if let Some(layer) = otel_layer(endpoint)? {
            layers.push(layer);
        }
    }

    tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

    match endpoint {
        None => tracing::debug!("OpenTelemetry not configured ({} not set)", OTLP_ENDPOINT_ENV),
        Some(endpoint) if cfg!(feature = "telemetry") => {
            tracing::info!(endpoint = %endpoint, "OpenTelemetry export enabled")
        }
        Some(_) => tracing::warn!(
            "OpenTelemetry endpoint set but feature 'telemetry' not enabled; rebuild with --features telemetry"
        ),
    }

    Ok(guard)
}

fn otlp_endpoint() -> Option<String> {
    std::env::var(OTLP_ENDPOINT_ENV).ok().filter(|s| !s.is_empty())
}

#[cfg(not(feature = "telemetry"))]
fn otel_layer(_endpoint: &str) -> Result<Option<BoxedLayer>> {
    Ok(None)
}

#[cfg(feature = "telemetry")]
fn otel_layer(endpoint: &str) -> Result<Option<BoxedLayer>> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use opentelemetry_sdk::Resource;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "ledger-rpcd".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;
    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new("service.name", service_name.clone())]))
        .build();
    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(Some(tracing_opentelemetry::layer().with_tracer(tracer).boxed()))
}
