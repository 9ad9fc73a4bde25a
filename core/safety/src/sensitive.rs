//! Sensitive-file and locked-directory detection for the authorization gate
//! (spec §4.4.2). Pattern tables mirror the ones a Claude-Code-style agent
//! ships with; `extra_patterns` lets workspace config widen the set.

use std::path::Path;

const SENSITIVE_FILE_PATTERNS: &[&str] = &[
    ".env",
    "*.pem",
    "*.key",
    "credentials.json",
    ".bashrc",
    ".zshrc",
    ".bash_profile",
    ".zprofile",
    ".profile",
    ".gitconfig",
    ".git-credentials",
    ".gitmodules",
    ".ssh/config",
    ".ssh/authorized_keys",
    ".mcp.json",
    ".npmrc",
    ".pypirc",
    ".github/workflows/*.yml",
];

const LOCKED_DIRECTORIES: &[&str] = &[".journeyman/", ".journeyman/commands/"];

const SENSITIVE_DIRECTORIES: &[&str] = &[".git/", ".vscode/", ".idea/"];

pub fn is_sensitive_file(path: &Path, extra_patterns: &[String]) -> bool {
    let path_str = path.to_string_lossy();
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy())
        .unwrap_or_default();

    if SENSITIVE_FILE_PATTERNS
        .iter()
        .any(|p| matches_pattern(p, &path_str, &filename))
        || extra_patterns
            .iter()
            .any(|p| matches_pattern(p, &path_str, &filename))
    {
        return true;
    }

    if filename.starts_with(".env.") {
        return true;
    }
    if filename.starts_with("service-account") && filename.ends_with(".json") {
        return true;
    }
    if path_str.contains(".ssh/id_") {
        return true;
    }
    false
}

pub fn is_locked_directory(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    LOCKED_DIRECTORIES.iter().any(|dir| path_str.contains(dir))
}

pub fn is_sensitive_directory(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    SENSITIVE_DIRECTORIES
        .iter()
        .any(|dir| path_str.contains(dir))
}

fn matches_pattern(pattern: &str, full_path: &str, filename: &str) -> bool {
    if pattern.contains('/') {
        if let Some((prefix, suffix)) = pattern.split_once('*') {
            return full_path.contains(prefix) && full_path.ends_with(suffix);
        }
        return full_path.ends_with(pattern) || full_path.contains(&format!("/{pattern}"));
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return filename.ends_with(suffix);
    }
    filename == pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn dotenv_is_sensitive() {
        assert!(is_sensitive_file(&PathBuf::from("/repo/.env"), &[]));
        assert!(is_sensitive_file(&PathBuf::from("/repo/.env.local"), &[]));
    }

    #[test]
    fn pem_extension_is_sensitive() {
        assert!(is_sensitive_file(&PathBuf::from("/keys/server.pem"), &[]));
    }

    #[test]
    fn ordinary_source_file_is_not_sensitive() {
        assert!(!is_sensitive_file(&PathBuf::from("/repo/src/lib.rs"), &[]));
    }

    #[test]
    fn extra_pattern_widens_detection() {
        let extra = vec!["*.secret".to_string()];
        assert!(is_sensitive_file(
            &PathBuf::from("/repo/prod.secret"),
            &extra
        ));
    }

    #[test]
    fn git_directory_is_sensitive() {
        assert!(is_sensitive_directory(&PathBuf::from("/repo/.git/HEAD")));
    }
}
