//! Binary-content heuristic (spec §4.3): known binary extensions, or a NUL
//! byte within the first 512 bytes of a file, mark it as binary so
//! text-oriented tools can refuse to load it.

use std::path::Path;

const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "avif", "pdf", "zip", "gz", "tar", "bz2",
    "xz", "7z", "rar", "exe", "dll", "so", "dylib", "bin", "wasm", "class", "o", "a", "woff",
    "woff2", "ttf", "otf", "eot", "mp3", "mp4", "mov", "avi", "mkv", "wav", "flac", "sqlite",
    "db", "pyc",
];

const SNIFF_WINDOW: usize = 512;

pub fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| BINARY_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// True if `bytes` (assumed to be a prefix of the file) contains a NUL
/// within the first [`SNIFF_WINDOW`] bytes.
pub fn sniff_contains_nul(bytes: &[u8]) -> bool {
    bytes.iter().take(SNIFF_WINDOW).any(|&b| b == 0)
}

pub fn is_binary(path: &Path, bytes: &[u8]) -> bool {
    has_binary_extension(path) || sniff_contains_nul(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn known_extension_is_binary() {
        assert!(has_binary_extension(&PathBuf::from("logo.PNG")));
        assert!(!has_binary_extension(&PathBuf::from("main.rs")));
    }

    #[test]
    fn nul_byte_within_window_marks_binary() {
        let mut bytes = vec![b'a'; 100];
        bytes[50] = 0;
        assert!(sniff_contains_nul(&bytes));
    }

    #[test]
    fn nul_byte_beyond_window_is_ignored() {
        let mut bytes = vec![b'a'; 600];
        bytes[550] = 0;
        assert!(!sniff_contains_nul(&bytes));
    }
}
