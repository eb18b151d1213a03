#![allow(unused_imports)] // some used only for telemetry feature
use opentelemetry::trace::{TraceId, TracerProvider};
use tracing_subscriber::{EnvFilter, Registry, prelude::*};

///  Fetch an opentelemetry::trace::TraceId as hex through the full tracing stack
pub fn get_trace_id() -> TraceId {
    use opentelemetry::trace::TraceContextExt as _; // opentelemetry::Context -> opentelemetry::trace::Span
    use tracing_opentelemetry::OpenTelemetrySpanExt as _; // tracing::Span to opentelemetry::Context
    tracing::Span::current()
        .context()
        .span()
        .span_context()
        .trace_id()
}

#[cfg(feature = "telemetry")]
fn resource() -> opentelemetry_sdk::Resource {
    opentelemetry_sdk::Resource::builder()
        .with_service_name(env!("CARGO_PKG_NAME"))
        .build()
}

#[cfg(feature = "telemetry")]
fn init_tracer() -> opentelemetry_sdk::trace::Tracer {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .expect("failed to build otlp span exporter");

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_resource(resource())
        .with_batch_exporter(exporter)
        .build();

    opentelemetry::global::set_tracer_provider(provider.clone());
    provider.tracer("tracing-otel-subscriber")
}

/// Initialize tracing
///
/// `RUST_LOG` drives the filter (default `info`), `LOG_FORMAT=json` switches to json lines.
pub async fn init() {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(feature = "telemetry")]
    let otel = tracing_opentelemetry::OpenTelemetryLayer::new(init_tracer());

    let collector = Registry::default()
        .with(env_filter)
        .with((!json).then(|| tracing_subscriber::fmt::layer().compact()))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()));

    #[cfg(feature = "telemetry")]
    let collector = collector.with(otel);

    if let Err(e) = tracing::subscriber::set_global_default(collector) {
        eprintln!("tracing subscriber already installed: {e}");
    }
}
