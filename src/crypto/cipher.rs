//! AES-256-GCM authenticated encryption with caller-supplied nonces.
//!
//! Unlike a nonce-prepending helper, `seal` takes the nonce as an argument
//! because the payload layout stores it separately from the salt.  Two nonce
//! sizes are supported: the standard 12 bytes and the 16-byte IV of the
//! legacy layout.
//!
//! **Precondition:** a nonce must never be used twice with the same key.
//! Nothing here tracks nonce history; callers draw a fresh nonce from
//! [`generate_nonce`] for every encryption.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, Payload};
use aes_gcm::aes::Aes256;
use aes_gcm::{Aes256Gcm, AesGcm, Key};
use rand::RngCore;
use zeroize::Zeroizing;

use super::version::{FormatVersion, KEY_LEN};
use crate::errors::{MeldSealError, Result};

/// AES-256-GCM with a 16-byte nonce (legacy IV size).
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Encrypt and authenticate `plaintext`.
///
/// Returns `ciphertext || tag`.  The nonce length selects the GCM
/// instantiation; anything other than 12 or 16 bytes is rejected.
pub fn seal(key: &[u8; KEY_LEN], nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let payload = Payload {
        msg: plaintext,
        aad,
    };

    let sealed = match nonce.len() {
        12 => cipher::<Aes256Gcm>(key).encrypt(nonce_ref::<Aes256Gcm>(nonce), payload),
        16 => cipher::<Aes256Gcm16>(key).encrypt(nonce_ref::<Aes256Gcm16>(nonce), payload),
        n => {
            return Err(MeldSealError::InvalidInput(format!(
                "nonce must be 12 or 16 bytes (got {n})"
            )))
        }
    };

    sealed.map_err(|e| MeldSealError::EncryptionFailed(format!("encryption error: {e}")))
}

/// Verify and decrypt `ciphertext_with_tag`.
///
/// Any mismatch (wrong key, wrong nonce, modified ciphertext or associated
/// data, truncated input) yields [`MeldSealError::AuthenticationFailed`].
/// No plaintext is released unless the tag verifies.
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8],
    ciphertext_with_tag: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let payload = Payload {
        msg: ciphertext_with_tag,
        aad,
    };

    let opened = match nonce.len() {
        12 => cipher::<Aes256Gcm>(key).decrypt(nonce_ref::<Aes256Gcm>(nonce), payload),
        16 => cipher::<Aes256Gcm16>(key).decrypt(nonce_ref::<Aes256Gcm16>(nonce), payload),
        _ => return Err(MeldSealError::AuthenticationFailed),
    };

    opened
        .map(Zeroizing::new)
        .map_err(|_| MeldSealError::AuthenticationFailed)
}

fn cipher<C: KeyInit>(key: &[u8; KEY_LEN]) -> C {
    C::new(Key::<C>::from_slice(key))
}

/// Callers match on the slice length first; `from_slice` panics otherwise.
fn nonce_ref<C: AeadCore>(nonce: &[u8]) -> &aes_gcm::aead::Nonce<C> {
    aes_gcm::aead::Nonce::<C>::from_slice(nonce)
}

/// Generate a fresh random nonce of the length `version` needs.
pub fn generate_nonce(version: FormatVersion) -> Vec<u8> {
    let mut nonce = vec![0u8; version.nonce_len()];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::version::TAG_LEN;

    const KEY: [u8; KEY_LEN] = [0x42; KEY_LEN];

    #[test]
    fn seal_open_roundtrip_both_nonce_sizes() {
        for version in FormatVersion::ALL {
            let nonce = generate_nonce(version);
            let sealed = seal(&KEY, &nonce, b"hello", b"ad").unwrap();
            assert_eq!(sealed.len(), 5 + TAG_LEN);

            let opened = open(&KEY, &nonce, &sealed, b"ad").unwrap();
            assert_eq!(opened.as_slice(), b"hello");
        }
    }

    #[test]
    fn wrong_associated_data_fails() {
        let nonce = [1u8; 12];
        let sealed = seal(&KEY, &nonce, b"hello", b"one").unwrap();
        assert!(matches!(
            open(&KEY, &nonce, &sealed, b"two"),
            Err(MeldSealError::AuthenticationFailed)
        ));
    }

    #[test]
    fn truncated_input_fails() {
        let nonce = [1u8; 12];
        assert!(matches!(
            open(&KEY, &nonce, &[0u8; 4], b""),
            Err(MeldSealError::AuthenticationFailed)
        ));
    }

    #[test]
    fn bad_nonce_length_is_rejected() {
        assert!(matches!(
            seal(&KEY, &[0u8; 8], b"x", b""),
            Err(MeldSealError::InvalidInput(_))
        ));
        assert!(matches!(
            open(&KEY, &[0u8; 8], &[0u8; 32], b""),
            Err(MeldSealError::AuthenticationFailed)
        ));
    }

    #[test]
    fn nonces_are_fresh() {
        assert_ne!(
            generate_nonce(FormatVersion::V2),
            generate_nonce(FormatVersion::V2)
        );
    }
}
