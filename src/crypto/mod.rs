//! Cryptographic primitives for MeldSeal.
//!
//! This module provides:
//! - The closed set of payload format versions and their parameters (`version`)
//! - Password-based key derivation, Argon2id and PBKDF2 (`kdf`)
//! - AES-256-GCM seal/open with explicit nonces (`cipher`)

pub mod cipher;
pub mod kdf;
pub mod version;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive_key, FormatVersion, ...};
pub use cipher::{generate_nonce, open, seal};
pub use kdf::{derive_key, generate_salt};
pub use version::{FormatVersion, Kdf, KEY_LEN, TAG_LEN};
