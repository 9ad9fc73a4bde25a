//! Environment variable overrides, applied after the YAML document is
//! loaded and before CLI flags (spec §6 load order).

use crate::document::ConfigDocument;
use std::env;
use tracing::debug;
use tracing::warn;

pub const ENV_MAIN_MODEL: &str = "JOURNEYMAN_MAIN_MODEL";
pub const ENV_LOG_LEVEL: &str = "JOURNEYMAN_LOG_LEVEL";
pub const ENV_MAX_TOOL_CONCURRENCY: &str = "JOURNEYMAN_MAX_TOOL_CONCURRENCY";
pub const ENV_MAX_RETRIES: &str = "JOURNEYMAN_MAX_RETRIES";
pub const ENV_SANDBOX_ENABLED: &str = "JOURNEYMAN_SANDBOX_ENABLED";

/// Applies `JOURNEYMAN_*` environment variables on top of a loaded document.
pub fn apply_env_overrides(mut doc: ConfigDocument) -> ConfigDocument {
    if let Some(val) = get_string(ENV_MAIN_MODEL) {
        debug!(env = ENV_MAIN_MODEL, value = %val, "config override");
        doc.models.main = val;
    }
    if let Some(val) = get_string(ENV_LOG_LEVEL) {
        debug!(env = ENV_LOG_LEVEL, value = %val, "config override");
        doc.logging.level = val;
    }
    if let Some(val) = get_u32(ENV_MAX_TOOL_CONCURRENCY) {
        debug!(env = ENV_MAX_TOOL_CONCURRENCY, value = val, "config override");
        doc.tool.max_concurrency = val;
    }
    if let Some(val) = get_u32(ENV_MAX_RETRIES) {
        debug!(env = ENV_MAX_RETRIES, value = val, "config override");
        doc.error_judge.max_retries = val;
    }
    if let Some(val) = get_bool(ENV_SANDBOX_ENABLED) {
        debug!(env = ENV_SANDBOX_ENABLED, value = val, "config override");
        doc.sandbox.enabled = val;
    }
    doc
}

fn get_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn get_u32(key: &str) -> Option<u32> {
    get_string(key).and_then(|s| match s.parse::<u32>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %s, "failed to parse u32 from env var");
            None
        }
    })
}

fn get_bool(key: &str) -> Option<bool> {
    get_string(key).map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_env_leaves_defaults() {
        let doc = apply_env_overrides(ConfigDocument::default());
        assert_eq!(doc, ConfigDocument::default());
    }
}
