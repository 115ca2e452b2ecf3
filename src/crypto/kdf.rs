//! Password-based key derivation.
//!
//! Each format version pins its KDF and work factors (see
//! [`FormatVersion::kdf`]), so the same password + salt + version always
//! yields the same key.  Version 2 uses Argon2id, a memory-hard KDF that
//! resists GPU brute force; version 1 uses PBKDF2-HMAC-SHA512.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use sha2::Sha512;
use zeroize::Zeroizing;

use super::version::{FormatVersion, Kdf, KEY_LEN};
use crate::errors::{MeldSealError, Result};

/// Derive a 32-byte key from a password and salt using the KDF pinned by
/// `version`.
///
/// The key is returned in a `Zeroizing` wrapper so it is wiped on drop.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    version: FormatVersion,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if salt.len() != version.salt_len() {
        return Err(MeldSealError::InvalidInput(format!(
            "salt must be {} bytes for {version} (got {})",
            version.salt_len(),
            salt.len()
        )));
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);

    match version.kdf() {
        Kdf::Pbkdf2Sha512 { rounds } => {
            pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, rounds, key.as_mut());
        }
        Kdf::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => {
            let params = Params::new(memory_kib, iterations, parallelism, Some(KEY_LEN))
                .map_err(|e| {
                    MeldSealError::KeyDerivationFailed(format!("invalid Argon2 params: {e}"))
                })?;

            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password_into(password, salt, key.as_mut())
                .map_err(|e| {
                    MeldSealError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}"))
                })?;
        }
    }

    tracing::trace!(%version, "derived key");
    Ok(key)
}

/// Generate a cryptographically random salt of the length `version` needs.
pub fn generate_salt(version: FormatVersion) -> Vec<u8> {
    let mut salt = vec![0u8; version.salt_len()];
    rand::rng().fill_bytes(&mut salt);
    salt
}
