//! Structured logging and optional OTLP telemetry export, ambient across
//! every Journeyman crate regardless of which spec features are enabled.

mod init;
mod settings;

pub use init::init_tracing;
pub use init::OtelGuard;
pub use settings::OtelExporter;
pub use settings::OtelSettings;
