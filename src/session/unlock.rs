//! Host-side decrypt flow: remembered password first, then the prompt.
//!
//! The engine performs one attempt per call.  `Unlocker` is the layer that
//! re-prompts after a wrong password, the way a UI would, and remembers the
//! password that worked.

use zeroize::Zeroizing;

use super::cache::{PasswordCache, PasswordScope};
use super::prompt::{PasswordAndHint, PasswordPrompt, PromptRequest, PromptResponse};
use crate::codec::EncryptedPayload;
use crate::crypto::FormatVersion;
use crate::engine::SecretEngine;
use crate::errors::{MeldSealError, Result};

/// Default number of password attempts per secret.
const DEFAULT_MAX_ATTEMPTS: usize = 3;

pub struct Unlocker<'a> {
    engine: &'a SecretEngine,
    cache: &'a dyn PasswordCache,
    max_attempts: usize,
}

impl<'a> Unlocker<'a> {
    pub fn new(engine: &'a SecretEngine, cache: &'a dyn PasswordCache) -> Self {
        Self {
            engine,
            cache,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Decrypt `payload`, using a remembered password for `scope` if one
    /// works and asking `prompt` otherwise.
    ///
    /// Unsupported versions fail before anything is asked.  A cancelled
    /// prompt yields `UserCancelled`; running out of attempts yields
    /// `AuthenticationFailed`.
    pub fn unlock(
        &self,
        prompt: &mut dyn PasswordPrompt,
        payload: &EncryptedPayload,
        scope: &PasswordScope,
    ) -> Result<Zeroizing<String>> {
        FormatVersion::require(payload.version())?;

        if let Some(remembered) = self.cache.get(scope) {
            match self.engine.decrypt(payload, &remembered) {
                Ok(plaintext) => return Ok(plaintext),
                Err(e) if e.is_retryable() => {
                    tracing::debug!(?scope, "remembered password did not fit");
                }
                Err(e) => return Err(e),
            }
        }

        let attempts = if prompt.is_interactive() {
            self.max_attempts
        } else {
            1
        };
        let request = PromptRequest::decrypt(payload.hint());

        for attempt in 1..=attempts {
            let PromptResponse::Confirmed(answer) = prompt.request(&request)? else {
                return Err(MeldSealError::UserCancelled);
            };

            match self.engine.decrypt(payload, &answer.password) {
                Ok(plaintext) => {
                    self.cache.put(scope.clone(), &answer.password);
                    return Ok(plaintext);
                }
                Err(e) if e.is_retryable() => {
                    tracing::info!(attempt, attempts, "wrong password or corrupted data");
                }
                Err(e) => return Err(e),
            }
        }

        Err(MeldSealError::AuthenticationFailed)
    }
}

/// Ask for a new password (and hint) to encrypt with.
///
/// Cancelling yields `UserCancelled`.
pub fn request_new_password(
    prompt: &mut dyn PasswordPrompt,
    request: &PromptRequest,
) -> Result<PasswordAndHint> {
    match prompt.request(request)? {
        PromptResponse::Confirmed(answer) => Ok(answer),
        PromptResponse::Cancelled => Err(MeldSealError::UserCancelled),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::path::Path;

    use super::*;
    use crate::session::cache::{RememberLevel, SessionPasswordCache};

    /// Answers with queued passwords, then cancels.
    struct Scripted {
        answers: VecDeque<&'static str>,
        asked: usize,
    }

    impl Scripted {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: 0,
            }
        }
    }

    impl PasswordPrompt for Scripted {
        fn request(&mut self, _request: &PromptRequest) -> Result<PromptResponse> {
            self.asked += 1;
            Ok(match self.answers.pop_front() {
                Some(pw) => PromptResponse::Confirmed(PasswordAndHint::new(pw, "")),
                None => PromptResponse::Cancelled,
            })
        }
    }

    fn scope() -> PasswordScope {
        PasswordScope::for_secret(RememberLevel::File, Path::new("notes.md"), "x")
    }

    #[test]
    fn reprompts_after_wrong_password_and_remembers() {
        let engine = SecretEngine::default();
        let cache = SessionPasswordCache::new(None);
        let payload = engine.encrypt("right", "", "data").unwrap();

        let mut prompt = Scripted::new(&["wrong", "right"]);
        let plain = Unlocker::new(&engine, &cache)
            .unlock(&mut prompt, &payload, &scope())
            .unwrap();
        assert_eq!(plain.as_str(), "data");
        assert_eq!(prompt.asked, 2);
        assert_eq!(cache.get(&scope()).unwrap().as_str(), "right");

        // Second secret in the same scope: no prompt at all.
        let other = engine.encrypt("right", "", "more").unwrap();
        let mut silent = Scripted::new(&[]);
        let plain = Unlocker::new(&engine, &cache)
            .unlock(&mut silent, &other, &scope())
            .unwrap();
        assert_eq!(plain.as_str(), "more");
        assert_eq!(silent.asked, 0);
    }

    #[test]
    fn cancel_aborts() {
        let engine = SecretEngine::default();
        let cache = SessionPasswordCache::new(None);
        let payload = engine.encrypt("pw", "", "data").unwrap();

        let mut prompt = Scripted::new(&[]);
        let result = Unlocker::new(&engine, &cache).unlock(&mut prompt, &payload, &scope());
        assert!(matches!(result, Err(MeldSealError::UserCancelled)));
        assert!(cache.get(&scope()).is_none());
    }

    #[test]
    fn unsupported_version_never_prompts() {
        let engine = SecretEngine::default();
        let cache = SessionPasswordCache::new(None);
        let payload = EncryptedPayload::from_parts(99_999, vec![], vec![], vec![], "");

        let mut prompt = Scripted::new(&["pw"]);
        let result = Unlocker::new(&engine, &cache).unlock(&mut prompt, &payload, &scope());
        assert!(matches!(result, Err(MeldSealError::UnsupportedVersion(99_999))));
        assert_eq!(prompt.asked, 0);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let engine = SecretEngine::default();
        let cache = SessionPasswordCache::new(None);
        let payload = engine.encrypt("pw", "", "data").unwrap();

        let mut prompt = Scripted::new(&["a", "b", "c"]);
        let result = Unlocker::new(&engine, &cache)
            .with_max_attempts(2)
            .unlock(&mut prompt, &payload, &scope());
        assert!(matches!(result, Err(MeldSealError::AuthenticationFailed)));
        assert_eq!(prompt.asked, 2);
    }
}
