//! Encrypted-at-rest store for provider API keys (spec.md §6 "Persisted
//! state"). Layout: a fixed 5-byte header (magic + version), a 16-byte
//! salt, a 12-byte AES-GCM nonce, then the ciphertext of a JSON map of
//! provider name -> secret value. The key is derived from a
//! process-supplied password via [`crate::kdf::derive_key`]; a wrong
//! password surfaces as [`SecretsError::BadPassword`] rather than garbage
//! plaintext, since AES-GCM authenticates the ciphertext.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use aes_gcm::aead::Aead;
use aes_gcm::aead::KeyInit;
use aes_gcm::Aes256Gcm;
use aes_gcm::Nonce;
use rand::RngCore;
use snafu::ResultExt;

use crate::error::BadPasswordSnafu;
use crate::error::DecodeSnafu;
use crate::error::InvalidFormatSnafu;
use crate::error::IoSnafu;
use crate::error::Result;
use crate::error::UnsupportedVersionSnafu;
use crate::kdf::derive_key;

const MAGIC: &[u8; 4] = b"JSE1";
const VERSION: u8 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const HEADER_LEN: usize = MAGIC.len() + 1;

/// The maximum number of password attempts the CLI boundary should allow
/// before aborting, per spec.md §6.
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;

/// In-memory, decrypted view of the secrets file. Never `Debug`/`Display`
/// in a way that would leak values; callers should not log this type.
pub struct SecretsStore {
    path: PathBuf,
    secrets: BTreeMap<String, String>,
}

impl SecretsStore {
    /// Loads and decrypts an existing secrets file.
    pub fn load(path: impl Into<PathBuf>, password: &str) -> Result<Self> {
        let path = path.into();
        let raw = std::fs::read(&path).context(IoSnafu {
            path: path.display().to_string(),
        })?;
        let secrets = decrypt(&raw, password, &path)?;
        Ok(Self { path, secrets })
    }

    /// Creates a fresh, empty store that will encrypt under `password` on
    /// save. Used the first time a frontend persists provider credentials.
    pub fn new_empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            secrets: BTreeMap::new(),
        }
    }

    /// Loads the file at `path` if it exists, else starts an empty store.
    pub fn load_or_create(path: impl Into<PathBuf>, password: &str) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            Self::load(path, password)
        } else {
            Ok(Self::new_empty(path))
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.secrets.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.secrets.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.secrets.remove(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.secrets.keys().map(String::as_str)
    }

    /// Encrypts the current contents under `password` and writes them to
    /// this store's path, replacing any existing file.
    pub fn save(&self, password: &str) -> Result<()> {
        let encoded = encrypt(&self.secrets, password);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context(IoSnafu {
                path: parent.display().to_string(),
            })?;
        }
        std::fs::write(&self.path, encoded).context(IoSnafu {
            path: self.path.display().to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[allow(clippy::expect_used)]
fn encrypt(secrets: &BTreeMap<String, String>, password: &str) -> Vec<u8> {
    let mut rng = rand::rng();
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key).expect("32-byte key");

    let plaintext = serde_json::to_vec(secrets).expect("map of strings always serializes");
    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_ref())
        .expect("in-memory AES-GCM encryption does not fail");

    let mut out = Vec::with_capacity(HEADER_LEN + SALT_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    out
}

#[allow(clippy::expect_used)]
fn decrypt(raw: &[u8], password: &str, path: &Path) -> Result<BTreeMap<String, String>> {
    let min_len = HEADER_LEN + SALT_LEN + NONCE_LEN;
    if raw.len() < min_len || &raw[..MAGIC.len()] != MAGIC {
        return InvalidFormatSnafu {
            path: path.display().to_string(),
        }
        .fail();
    }
    let version = raw[MAGIC.len()];
    if version != VERSION {
        return UnsupportedVersionSnafu { version }.fail();
    }

    let salt: [u8; SALT_LEN] = raw[HEADER_LEN..HEADER_LEN + SALT_LEN]
        .try_into()
        .expect("slice length checked above");
    let nonce_start = HEADER_LEN + SALT_LEN;
    let nonce = Nonce::from_slice(&raw[nonce_start..nonce_start + NONCE_LEN]);
    let ciphertext = &raw[nonce_start + NONCE_LEN..];

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key).expect("32-byte key");
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| BadPasswordSnafu.build())?;

    serde_json::from_slice(&plaintext).context(DecodeSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_secrets_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("secrets.bin");

        let mut store = SecretsStore::new_empty(&path);
        store.set("anthropic", "sk-test-123");
        store.set("openai", "sk-other-456");
        store.save("correct horse battery staple").expect("save");

        let loaded = SecretsStore::load(&path, "correct horse battery staple").expect("load");
        assert_eq!(loaded.get("anthropic"), Some("sk-test-123"));
        assert_eq!(loaded.get("openai"), Some("sk-other-456"));
    }

    #[test]
    fn bad_password_is_a_distinct_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("secrets.bin");

        let mut store = SecretsStore::new_empty(&path);
        store.set("anthropic", "sk-test-123");
        store.save("right password").expect("save");

        let err = SecretsStore::load(&path, "wrong password").unwrap_err();
        assert!(matches!(err, crate::error::SecretsError::BadPassword));
    }

    #[test]
    fn load_or_create_starts_empty_when_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.bin");

        let store = SecretsStore::load_or_create(&path, "whatever").expect("load_or_create");
        assert_eq!(store.keys().count(), 0);
    }

    #[test]
    fn truncated_file_is_invalid_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("short.bin");
        std::fs::write(&path, b"nope").expect("write");

        let err = SecretsStore::load(&path, "whatever").unwrap_err();
        assert!(matches!(
            err,
            crate::error::SecretsError::InvalidFormat { .. }
        ));
    }
}
