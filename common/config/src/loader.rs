//! Layered configuration loading: built-in defaults → `config.yaml` →
//! environment overrides (spec §6). CLI flags are applied by the caller on
//! top of the [`ConfigDocument`] this loader returns.

use crate::document::ConfigDocument;
use crate::env::apply_env_overrides;
use crate::error::ConfigError;
use crate::error::HomeDirNotFoundSnafu;
use crate::error::IoSnafu;
use crate::error::YamlSnafu;
use snafu::OptionExt;
use snafu::ResultExt;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_CONFIG_DIR: &str = ".journeyman";
pub const CONFIG_FILE: &str = "config.yaml";
pub const JOURNEYMAN_HOME_ENV: &str = "JOURNEYMAN_HOME";

/// Resolve the config home directory: `$JOURNEYMAN_HOME` if set, else
/// `~/.journeyman`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(custom) = std::env::var(JOURNEYMAN_HOME_ENV) {
        return Ok(PathBuf::from(custom));
    }
    let home = dirs::home_dir().context(HomeDirNotFoundSnafu)?;
    Ok(home.join(DEFAULT_CONFIG_DIR))
}

/// Loads [`ConfigDocument`]s from a config directory.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub fn from_default_dir() -> Result<Self, ConfigError> {
        Ok(Self {
            config_dir: default_config_dir()?,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_dir: path.as_ref().to_path_buf(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Loads the document: built-in defaults, overlaid with `config.yaml`
    /// if present, overlaid with `JOURNEYMAN_*` environment variables.
    pub fn load(&self) -> Result<ConfigDocument, ConfigError> {
        let path = self.config_dir.join(CONFIG_FILE);
        let doc = if path.exists() {
            let content = std::fs::read_to_string(&path).context(IoSnafu {
                path: path.display().to_string(),
            })?;
            if content.trim().is_empty() {
                debug!(path = %path.display(), "config file empty, using defaults");
                ConfigDocument::default()
            } else {
                serde_yml::from_str(&content).context(YamlSnafu {
                    path: path.display().to_string(),
                })?
            }
        } else {
            debug!(path = %path.display(), "config file not found, using defaults");
            ConfigDocument::default()
        };
        Ok(apply_env_overrides(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = ConfigLoader::from_path(dir.path());
        let doc = loader.load().expect("load");
        assert_eq!(doc.models.main, "anthropic/claude-sonnet");
    }

    #[test]
    fn loads_partial_yaml_with_defaults_for_rest() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "models:\n  main: openai/gpt-5\n",
        )
        .expect("write config");
        let loader = ConfigLoader::from_path(dir.path());
        let doc = loader.load().expect("load");
        assert_eq!(doc.models.main, "openai/gpt-5");
        assert_eq!(doc.tool.max_concurrency, 8);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "models: [this is not a map\n")
            .expect("write config");
        let loader = ConfigLoader::from_path(dir.path());
        assert!(loader.load().is_err());
    }
}
