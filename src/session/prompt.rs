//! Request/response contract with whatever asks the user for a password.
//!
//! The engine never blocks on a UI.  A host implements [`PasswordPrompt`]:
//! it receives a [`PromptRequest`] and answers with the password (and hint,
//! when encrypting) or with [`PromptResponse::Cancelled`].  A cancelled
//! prompt must abort the operation with no side effects.

use zeroize::Zeroizing;

use crate::errors::Result;

/// Why the password is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    Encrypt,
    Decrypt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub purpose: PromptPurpose,
    /// Pre-filled hint when encrypting; the stored hint when decrypting.
    pub default_hint: String,
    /// Ask for the password twice.
    pub confirm_password: bool,
    /// Let the user edit the hint.
    pub ask_hint: bool,
}

impl PromptRequest {
    pub fn encrypt(default_hint: &str, confirm_password: bool, ask_hint: bool) -> Self {
        Self {
            purpose: PromptPurpose::Encrypt,
            default_hint: default_hint.to_string(),
            confirm_password,
            ask_hint,
        }
    }

    pub fn decrypt(stored_hint: &str) -> Self {
        Self {
            purpose: PromptPurpose::Decrypt,
            default_hint: stored_hint.to_string(),
            confirm_password: false,
            ask_hint: false,
        }
    }
}

/// A password and the hint to store next to the secret.
///
/// Transient; never written anywhere.
pub struct PasswordAndHint {
    pub password: Zeroizing<String>,
    pub hint: String,
}

impl PasswordAndHint {
    pub fn new(password: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            password: Zeroizing::new(password.into()),
            hint: hint.into(),
        }
    }
}

pub enum PromptResponse {
    Confirmed(PasswordAndHint),
    Cancelled,
}

/// Something that can ask for a password.
pub trait PasswordPrompt {
    fn request(&mut self, request: &PromptRequest) -> Result<PromptResponse>;

    /// Whether asking again could yield a different answer.
    ///
    /// Non-interactive sources (an environment variable) return `false` so
    /// callers do not retry a known-wrong password.
    fn is_interactive(&self) -> bool {
        true
    }
}
