//! Telemetry exporter settings, resolved from [`journeyman_config::ConfigDocument`]
//! plus standard `OTEL_*` environment variable overrides.

use std::collections::HashMap;
use std::env;

/// Which backend a signal (traces, metrics, logs) is exported to.
#[derive(Debug, Clone, PartialEq)]
pub enum OtelExporter {
    None,
    OtlpHttp {
        endpoint: String,
        headers: HashMap<String, String>,
    },
    OtlpGrpc {
        endpoint: String,
        headers: HashMap<String, String>,
    },
}

/// Resolved OTel configuration used to build the exporter pipelines.
#[derive(Debug, Clone, PartialEq)]
pub struct OtelSettings {
    pub enabled: bool,
    pub environment: String,
    pub service_name: String,
    pub service_version: String,
    pub trace_exporter: OtelExporter,
    pub metrics_exporter: OtelExporter,
}

impl OtelSettings {
    /// Builds settings from explicit values, honoring the standard
    /// `OTEL_EXPORTER_OTLP_ENDPOINT` / `OTEL_EXPORTER_OTLP_HEADERS` /
    /// `OTEL_SERVICE_NAME` environment variables as overrides, matching the
    /// convention most OTel SDKs follow.
    pub fn resolve(enabled: bool, exporter_name: Option<&str>) -> Self {
        let service_name = env::var("OTEL_SERVICE_NAME")
            .ok()
            .unwrap_or_else(|| "journeyman".to_string());

        let endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4318".to_string());

        let headers = env::var("OTEL_EXPORTER_OTLP_HEADERS")
            .ok()
            .map(parse_headers)
            .unwrap_or_default();

        let exporter = match exporter_name {
            Some("otlp_http") => OtelExporter::OtlpHttp {
                endpoint: endpoint.clone(),
                headers: headers.clone(),
            },
            Some("otlp_grpc") => OtelExporter::OtlpGrpc { endpoint, headers },
            _ => OtelExporter::None,
        };

        Self {
            enabled,
            environment: env::var("JOURNEYMAN_ENV").unwrap_or_else(|_| "development".to_string()),
            service_name,
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            trace_exporter: exporter.clone(),
            metrics_exporter: exporter,
        }
    }
}

fn parse_headers(raw: String) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?.trim().to_string();
            let value = parts.next()?.trim().to_string();
            Some((key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_settings_have_no_exporter() {
        let settings = OtelSettings::resolve(false, None);
        assert!(!settings.enabled);
        assert_eq!(settings.trace_exporter, OtelExporter::None);
    }

    #[test]
    fn parse_headers_splits_pairs() {
        let headers = parse_headers("a=1,b=2".to_string());
        assert_eq!(headers.get("a").map(String::as_str), Some("1"));
        assert_eq!(headers.get("b").map(String::as_str), Some("2"));
    }
}
