use thiserror::Error;

/// All errors that can occur in MeldSeal.
#[derive(Debug, Error)]
pub enum MeldSealError {
    // --- Codec errors ---
    #[error("Not an encrypted secret: {0}")]
    ParseFailure(String),

    #[error("Unsupported format version {0}: this secret was written by a newer or incompatible tool")]
    UnsupportedVersion(u32),

    // --- Crypto errors ---
    #[error("Invalid password or corrupted data")]
    AuthenticationFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Text not found: {0}")]
    NotFound(String),
}

impl MeldSealError {
    /// Whether re-prompting for a password could make the operation succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }
}

/// Convenience type alias for MeldSeal results.
pub type Result<T> = std::result::Result<T, MeldSealError>;
