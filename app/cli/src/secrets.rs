//! Password-gated loading of the encrypted provider-secrets file (spec §6
//! "Persisted state"): up to [`MAX_PASSWORD_ATTEMPTS`] password prompts,
//! then abort.

use anyhow::bail;
use anyhow::Result;
use journeyman_secrets::SecretsError;
use journeyman_secrets::SecretsStore;
use journeyman_secrets::MAX_PASSWORD_ATTEMPTS;
use std::path::Path;

/// Opens the secrets file at `path`, prompting for its password on stdin.
/// Returns `Ok(None)` if the file does not exist (nothing to unlock).
pub fn open_secrets(path: &Path) -> Result<Option<SecretsStore>> {
    if !path.exists() {
        return Ok(None);
    }
    for attempt in 1..=MAX_PASSWORD_ATTEMPTS {
        let password = rpassword::prompt_password(format!(
            "password for {} (attempt {attempt}/{MAX_PASSWORD_ATTEMPTS}): ",
            path.display()
        ))?;
        match SecretsStore::load(path, &password) {
            Ok(store) => return Ok(Some(store)),
            Err(SecretsError::BadPassword) if attempt < MAX_PASSWORD_ATTEMPTS => {
                eprintln!("incorrect password");
            }
            Err(err) => bail!(err),
        }
    }
    bail!("too many incorrect password attempts for {}", path.display())
}

pub fn default_secrets_path(config_dir: &Path) -> std::path::PathBuf {
    config_dir.join("secrets.bin")
}
