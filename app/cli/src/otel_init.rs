//! Tracing/OTel bootstrap from [`journeyman_config::ConfigDocument`].

use journeyman_config::ConfigDocument;
use journeyman_otel::init_tracing;
use journeyman_otel::OtelGuard;
use journeyman_otel::OtelSettings;

/// Initializes the global tracing subscriber, honoring `--telemetry` /
/// `JOURNEYMAN_*`/`OTEL_*` overrides already folded into `config`. Returns a
/// guard that must be held for the process lifetime; dropping it flushes
/// the exporter.
pub fn init(config: &ConfigDocument, telemetry_enabled: bool, exporter: Option<&str>) -> OtelGuard {
    let settings = OtelSettings::resolve(telemetry_enabled, exporter);
    init_tracing(&config.logging, &settings)
}
