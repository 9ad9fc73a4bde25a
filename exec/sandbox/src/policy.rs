//! Sandbox enforcement policy (spec §4.4 supplement): the mode and path/
//! network allowlists the wasm executor's host ABI consults before honoring
//! a guest's filesystem or network request.

use crate::error::NetworkDeniedSnafu;
use crate::error::PathDeniedSnafu;
use crate::error::Result;
use crate::error::WriteDeniedSnafu;
use journeyman_config::SandboxConfig as ConfigSandboxConfig;
use std::path::Path;
use std::path::PathBuf;

/// Sandbox enforcement mode, distinct from the plain enabled/disabled flag
/// in [`journeyman_config::SandboxConfig`]: this is the enforcement
/// category the policy is actually evaluated under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SandboxMode {
    /// No sandbox enforcement; every path and network request is allowed.
    #[default]
    None,
    /// Reads are always allowed; writes are always denied.
    ReadOnly,
    /// Only paths explicitly in `allowed_paths` (and not in `denied_paths`)
    /// may be touched; network follows `allow_network`.
    Strict,
}

/// Resolved sandbox policy for one `go_sandbox` invocation.
#[derive(Debug, Clone)]
pub struct SandboxPolicy {
    pub mode: SandboxMode,
    pub allowed_paths: Vec<PathBuf>,
    pub denied_paths: Vec<PathBuf>,
    pub allow_network: bool,
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self {
            mode: SandboxMode::default(),
            allowed_paths: Vec::new(),
            denied_paths: Vec::new(),
            allow_network: false,
        }
    }
}

impl SandboxPolicy {
    /// Builds a policy from the configuration document's sandbox section.
    /// A disabled section maps to [`SandboxMode::None`]; an enabled one
    /// with no allowed paths falls back to [`SandboxMode::ReadOnly`] (no
    /// explicit allowlist means nothing can be written), otherwise
    /// [`SandboxMode::Strict`].
    pub fn from_config(config: &ConfigSandboxConfig) -> Self {
        let mode = if !config.enabled {
            SandboxMode::None
        } else if config.allowed_paths.is_empty() {
            SandboxMode::ReadOnly
        } else {
            SandboxMode::Strict
        };
        Self {
            mode,
            allowed_paths: config.allowed_paths.iter().map(|p| PathBuf::from(p.as_str())).collect(),
            denied_paths: Vec::new(),
            allow_network: config.allow_network,
        }
    }

    fn mode_allows_write(&self) -> bool {
        !matches!(self.mode, SandboxMode::ReadOnly)
    }

    fn is_allowed_path(&self, path: &Path) -> bool {
        if self.allowed_paths.is_empty() {
            return self.mode != SandboxMode::Strict;
        }
        self.allowed_paths.iter().any(|allowed| path.starts_with(allowed))
    }

    fn is_denied_path(&self, path: &Path) -> bool {
        self.denied_paths.iter().any(|denied| path.starts_with(denied))
    }
}

/// Evaluates filesystem/network requests a sandboxed guest makes against a
/// [`SandboxPolicy`].
#[derive(Debug, Clone)]
pub struct PermissionChecker {
    policy: SandboxPolicy,
}

impl PermissionChecker {
    pub fn new(policy: SandboxPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SandboxPolicy {
        &self.policy
    }

    /// Checks whether `path` may be accessed, with `write` distinguishing a
    /// mutation from a read.
    pub fn check_path(&self, path: &Path, write: bool) -> Result<()> {
        match self.policy.mode {
            SandboxMode::None => Ok(()),
            SandboxMode::ReadOnly => {
                if write {
                    return WriteDeniedSnafu {
                        message: format!("sandbox is read-only, cannot write to {}", path.display()),
                    }
                    .fail();
                }
                Ok(())
            }
            SandboxMode::Strict => {
                if self.policy.is_denied_path(path) || !self.policy.is_allowed_path(path) {
                    return PathDeniedSnafu {
                        path: path.display().to_string(),
                    }
                    .fail();
                }
                if write && !self.policy.mode_allows_write() {
                    return WriteDeniedSnafu {
                        message: format!("write denied in strict mode: {}", path.display()),
                    }
                    .fail();
                }
                Ok(())
            }
        }
    }

    pub fn check_network(&self) -> Result<()> {
        if self.policy.mode == SandboxMode::None {
            return Ok(());
        }
        if !self.policy.allow_network {
            return NetworkDeniedSnafu.fail();
        }
        Ok(())
    }
}
