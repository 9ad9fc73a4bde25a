//! Read/write path policy (spec §4.4.3): a context root confines where
//! tools may touch the filesystem. The home directory itself is never an
//! acceptable root; subdirectories of it are fine.

use crate::error::Result;
use crate::error::SandboxViolationSnafu;
use snafu::ensure;
use std::path::Path;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PathPolicy {
    root: PathBuf,
}

impl PathPolicy {
    /// Builds a policy rooted at `root`. Rejects a root that is exactly the
    /// user's home directory, per spec §4.4.3.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if let Some(home) = dirs::home_dir() {
            ensure!(
                root != home,
                SandboxViolationSnafu {
                    path: root.display().to_string(),
                }
            );
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True if `path` (resolved relative to the root when not absolute)
    /// falls within the policy's root.
    pub fn permits(&self, path: &Path) -> bool {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        absolute.starts_with(&self.root)
    }

    pub fn check(&self, path: &Path) -> Result<()> {
        ensure!(
            self.permits(path),
            SandboxViolationSnafu {
                path: path.display().to_string(),
            }
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_directory_root_is_rejected() {
        if let Some(home) = dirs::home_dir() {
            assert!(PathPolicy::new(home).is_err());
        }
    }

    #[test]
    fn subdirectory_of_home_is_accepted() {
        if let Some(home) = dirs::home_dir() {
            assert!(PathPolicy::new(home.join("project")).is_ok());
        }
    }

    #[test]
    fn path_outside_root_is_denied() {
        let policy = PathPolicy::new("/workspace/project").unwrap();
        assert!(policy.permits(Path::new("/workspace/project/src/lib.rs")));
        assert!(!policy.permits(Path::new("/etc/passwd")));
    }

    #[test]
    fn relative_path_resolves_against_root() {
        let policy = PathPolicy::new("/workspace/project").unwrap();
        assert!(policy.permits(Path::new("src/lib.rs")));
    }
}
