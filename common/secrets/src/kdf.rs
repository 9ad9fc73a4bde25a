//! Password -> AES-256 key derivation.
//!
//! Deliberately dependency-light: iterated SHA-256 rather than pulling in
//! argon2/pbkdf2 for a single KDF call per process startup (spec.md §6 calls
//! for "a fixed header, key derivation from the password" without mandating
//! a specific algorithm).

use sha2::Digest;
use sha2::Sha256;

const ROUNDS: u32 = 200_000;

pub fn derive_key(password: &str, salt: &[u8; 16]) -> [u8; 32] {
    let mut state = Sha256::new();
    state.update(salt);
    state.update(password.as_bytes());
    let mut digest = state.finalize_reset();
    for _ in 1..ROUNDS {
        state.update(digest);
        state.update(salt);
        digest = state.finalize_reset();
    }
    digest.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_derive_same_key() {
        let salt = [7u8; 16];
        assert_eq!(derive_key("hunter2", &salt), derive_key("hunter2", &salt));
    }

    #[test]
    fn different_passwords_derive_different_keys() {
        let salt = [7u8; 16];
        assert_ne!(derive_key("hunter2", &salt), derive_key("hunter3", &salt));
    }

    #[test]
    fn different_salts_derive_different_keys() {
        assert_ne!(
            derive_key("hunter2", &[1u8; 16]),
            derive_key("hunter2", &[2u8; 16])
        );
    }
}
