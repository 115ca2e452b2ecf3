//! Password handling around the engine.
//!
//! This module provides:
//! - Remembered passwords with scope levels and expiry (`cache`)
//! - The request/response contract with a password prompt (`prompt`)
//! - `Unlocker`, which combines a cache, a prompt and the engine to decrypt
//!   a payload the way a host UI does (`unlock`)

pub mod cache;
pub mod prompt;
pub mod unlock;

pub use cache::{PasswordCache, PasswordScope, RememberLevel, SessionPasswordCache};
pub use prompt::{PasswordAndHint, PasswordPrompt, PromptPurpose, PromptRequest, PromptResponse};
pub use unlock::{request_new_password, Unlocker};
