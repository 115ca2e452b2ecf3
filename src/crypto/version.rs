//! Format versions and the fixed cryptographic parameters each one pins.
//!
//! A version number is the only thing a payload carries about how it was
//! produced, so every parameter that affects decryption lives here.  Tuning
//! any of them means adding a new variant, never editing an existing one.
//!
//! | Version | KDF                                   | Salt | Nonce | AAD               |
//! |---------|---------------------------------------|------|-------|-------------------|
//! | 1       | PBKDF2-HMAC-SHA512, 210 000 rounds    | 16   | 16    | none              |
//! | 2       | Argon2id, 64 MiB, t=3, p=4            | 16   | 12    | `meld-encrypt:v2` |
//!
//! Both versions use AES-256-GCM with a 16-byte tag.

use std::fmt;

use crate::errors::{MeldSealError, Result};

/// Length of the AES-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Length of every derived key in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Password-based key derivation function pinned by a format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kdf {
    /// PBKDF2 with HMAC-SHA512.
    Pbkdf2Sha512 { rounds: u32 },
    /// Argon2id (v0x13).
    Argon2id {
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    },
}

/// A known payload format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatVersion {
    /// Legacy layout: PBKDF2-SHA512 and a 16-byte IV.
    V1,
    /// Argon2id, 12-byte nonce, version-bound associated data.
    V2,
}

impl FormatVersion {
    /// The version used for new encryptions by default.
    pub const CURRENT: FormatVersion = FormatVersion::V2;

    /// Every version this build can decrypt, oldest first.
    pub const ALL: [FormatVersion; 2] = [FormatVersion::V1, FormatVersion::V2];

    /// Map a wire version number to a known version.
    ///
    /// Returns `None` for anything unknown; callers must fail closed.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }

    /// Like [`from_u32`](Self::from_u32) but as a `Result`.
    pub fn require(value: u32) -> Result<Self> {
        Self::from_u32(value).ok_or(MeldSealError::UnsupportedVersion(value))
    }

    /// The number written to the `version` field on the wire.
    pub fn as_u32(self) -> u32 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    pub fn kdf(self) -> Kdf {
        match self {
            Self::V1 => Kdf::Pbkdf2Sha512 { rounds: 210_000 },
            Self::V2 => Kdf::Argon2id {
                memory_kib: 65_536,
                iterations: 3,
                parallelism: 4,
            },
        }
    }

    pub fn salt_len(self) -> usize {
        16
    }

    pub fn nonce_len(self) -> usize {
        match self {
            Self::V1 => 16,
            Self::V2 => 12,
        }
    }

    /// Associated data bound into the authentication tag.
    ///
    /// Binding the version means a payload relabelled with another
    /// version number fails authentication instead of being reinterpreted.
    pub fn associated_data(self) -> &'static [u8] {
        match self {
            Self::V1 => b"",
            Self::V2 => b"meld-encrypt:v2",
        }
    }

    /// Smallest valid `nonce || salt || ciphertext` blob (empty plaintext).
    pub fn min_encoded_len(self) -> usize {
        self.nonce_len() + self.salt_len() + TAG_LEN
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_u32())
    }
}
