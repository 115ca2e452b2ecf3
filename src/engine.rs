//! The secret engine: password in, payload out, and back.
//!
//! `SecretEngine` wires key derivation, the AEAD cipher and the payload
//! type together.  It holds only its configuration, so it is cheap to clone
//! and safe to share across threads.  Every call does exactly one key
//! derivation; retrying with another password is the caller's business.
//!
//! Key derivation is slow on purpose.  Hosts with a UI thread should call
//! the engine from a worker.

use zeroize::{Zeroize, Zeroizing};

use crate::codec::EncryptedPayload;
use crate::crypto::{self, FormatVersion};
use crate::errors::{MeldSealError, Result};

/// Explicit engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Version (and thus KDF/cipher parameters) used for new encryptions.
    pub version: FormatVersion,
    /// Whether an empty password may be used to encrypt.
    pub allow_empty_password: bool,
    /// Whether an empty plaintext may be encrypted.
    pub allow_empty_plaintext: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: FormatVersion::CURRENT,
            allow_empty_password: false,
            allow_empty_plaintext: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SecretEngine {
    config: EngineConfig,
}

impl SecretEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Encrypt `plaintext` under `password`, attaching `hint` in the clear.
    ///
    /// Draws a fresh salt and nonce on every call, so encrypting the same
    /// input twice never produces the same payload.
    pub fn encrypt(&self, password: &str, hint: &str, plaintext: &str) -> Result<EncryptedPayload> {
        let version = self.config.version;
        let salt = crypto::generate_salt(version);
        let nonce = crypto::generate_nonce(version);
        self.encrypt_with(password, hint, plaintext, &salt, &nonce)
    }

    /// Encrypt with a caller-chosen salt and nonce.
    ///
    /// Deterministic, for known-answer tests.  The caller must never reuse
    /// a (password, salt, nonce) triple for different plaintexts.
    pub fn encrypt_with(
        &self,
        password: &str,
        hint: &str,
        plaintext: &str,
        salt: &[u8],
        nonce: &[u8],
    ) -> Result<EncryptedPayload> {
        let version = self.config.version;

        if password.is_empty() && !self.config.allow_empty_password {
            return Err(MeldSealError::InvalidInput("password cannot be empty".into()));
        }
        if plaintext.is_empty() && !self.config.allow_empty_plaintext {
            return Err(MeldSealError::InvalidInput("nothing to encrypt".into()));
        }
        if nonce.len() != version.nonce_len() {
            return Err(MeldSealError::InvalidInput(format!(
                "nonce must be {} bytes for {version} (got {})",
                version.nonce_len(),
                nonce.len()
            )));
        }

        let key = crypto::derive_key(password.as_bytes(), salt, version)?;
        let ciphertext = crypto::seal(
            &key,
            nonce,
            plaintext.as_bytes(),
            version.associated_data(),
        )?;

        tracing::debug!(%version, bytes = plaintext.len(), "encrypted secret");

        Ok(EncryptedPayload::from_parts(
            version.as_u32(),
            salt.to_vec(),
            nonce.to_vec(),
            ciphertext,
            hint,
        ))
    }

    /// Decrypt `payload` with `password`.
    ///
    /// An unknown version fails with `UnsupportedVersion` before any key
    /// derivation.  A wrong password and a tampered payload both fail with
    /// `AuthenticationFailed`; the two cases are deliberately
    /// indistinguishable.  The hint plays no part.
    pub fn decrypt(&self, payload: &EncryptedPayload, password: &str) -> Result<Zeroizing<String>> {
        let version = FormatVersion::require(payload.version())?;

        if payload.salt().len() != version.salt_len()
            || payload.nonce().len() != version.nonce_len()
        {
            return Err(MeldSealError::AuthenticationFailed);
        }

        let key = crypto::derive_key(password.as_bytes(), payload.salt(), version)?;
        let mut opened = crypto::open(
            &key,
            payload.nonce(),
            payload.ciphertext(),
            version.associated_data(),
        )?;

        let bytes = std::mem::take(&mut *opened);
        let plaintext = String::from_utf8(bytes).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            MeldSealError::AuthenticationFailed
        })?;

        tracing::debug!(%version, "decrypted secret");
        Ok(Zeroizing::new(plaintext))
    }
}
