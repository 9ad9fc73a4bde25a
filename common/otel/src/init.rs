//! Process-wide tracing subscriber initialization.

use crate::settings::OtelExporter;
use crate::settings::OtelSettings;
use journeyman_config::LoggingConfig;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Holds the OTel tracer provider alive for the process lifetime; dropping
/// it flushes and shuts down the exporter.
pub struct OtelGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(err) = provider.shutdown() {
                eprintln!("failed to shut down OTel tracer provider: {err}");
            }
        }
    }
}

/// Initializes the global `tracing` subscriber: an `EnvFilter`-gated fmt
/// layer plus, when telemetry is enabled and an OTLP exporter is configured,
/// a tracing-opentelemetry bridge layer.
///
/// Must be called at most once per process; a second call is a logic error
/// in the caller, not something this crate attempts to guard against.
pub fn init_tracing(logging: &LoggingConfig, otel: &OtelSettings) -> OtelGuard {
    let filter = build_env_filter(logging);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(logging.target)
        .with_file(logging.location)
        .with_line_number(logging.location);

    let registry = tracing_subscriber::registry().with(filter).with(fmt_layer);

    if !otel.enabled {
        registry.init();
        return OtelGuard { provider: None };
    }

    match build_tracer_provider(otel) {
        Some(provider) => {
            let tracer = provider.tracer(otel.service_name.clone());
            let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
            registry.with(otel_layer).init();
            OtelGuard {
                provider: Some(provider),
            }
        }
        None => {
            registry.init();
            OtelGuard { provider: None }
        }
    }
}

fn build_env_filter(logging: &LoggingConfig) -> EnvFilter {
    let mut directive = logging.level.clone();
    for module in &logging.modules {
        directive.push(',');
        directive.push_str(module);
    }
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn build_tracer_provider(otel: &OtelSettings) -> Option<SdkTracerProvider> {
    let (endpoint, headers) = match &otel.trace_exporter {
        OtelExporter::None => return None,
        OtelExporter::OtlpHttp { endpoint, headers } => (endpoint.clone(), headers.clone()),
        OtelExporter::OtlpGrpc { endpoint, headers } => (endpoint.clone(), headers.clone()),
    };

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .with_headers(headers)
        .build()
        .ok()?;

    let resource = Resource::builder()
        .with_attributes(vec![
            KeyValue::new("service.name", otel.service_name.clone()),
            KeyValue::new("service.version", otel.service_version.clone()),
            KeyValue::new("deployment.environment", otel.environment.clone()),
        ])
        .build();

    Some(
        SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build(),
    )
}
