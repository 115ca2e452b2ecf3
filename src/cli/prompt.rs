//! Password prompts used by the CLI.
//!
//! `EnvPrompt` answers from `MELDSEAL_PASSWORD` and never retries;
//! `TerminalPrompt` asks on the terminal through dialoguer.

use std::io;

use console::style;
use dialoguer::{Input, Password};

use crate::errors::{MeldSealError, Result};
use crate::session::{PasswordAndHint, PasswordPrompt, PromptPurpose, PromptRequest, PromptResponse};

/// Answers every request with a fixed password from the environment.
pub struct EnvPrompt {
    password: zeroize::Zeroizing<String>,
    min_len: usize,
}

impl EnvPrompt {
    pub fn new(password: String, min_len: usize) -> Self {
        Self {
            password: zeroize::Zeroizing::new(password),
            min_len,
        }
    }
}

impl PasswordPrompt for EnvPrompt {
    fn request(&mut self, request: &PromptRequest) -> Result<PromptResponse> {
        if request.purpose == PromptPurpose::Encrypt {
            check_length(&self.password, self.min_len)?;
        }
        Ok(PromptResponse::Confirmed(PasswordAndHint::new(
            self.password.as_str(),
            request.default_hint.clone(),
        )))
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Interactive terminal prompt.
pub struct TerminalPrompt {
    min_len: usize,
}

impl TerminalPrompt {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    fn ask_new(&self, request: &PromptRequest) -> Result<PromptResponse> {
        let password = loop {
            let mut prompt = Password::new().with_prompt("Choose password");
            if request.confirm_password {
                prompt = prompt.with_confirmation(
                    "Confirm password",
                    "Passwords do not match, try again",
                );
            }
            let pw = match answer(prompt.interact())? {
                Some(pw) => pw,
                None => return Ok(PromptResponse::Cancelled),
            };
            match check_length(&pw, self.min_len) {
                Ok(()) => break pw,
                Err(e) => eprintln!("{} {e}", style("\u{26a0}").yellow().bold()),
            }
        };

        let hint = if request.ask_hint {
            let input = Input::<String>::new()
                .with_prompt("Hint (stored unencrypted, optional)")
                .with_initial_text(request.default_hint.clone())
                .allow_empty(true)
                .interact_text();
            match answer(input)? {
                Some(h) => h,
                None => return Ok(PromptResponse::Cancelled),
            }
        } else {
            request.default_hint.clone()
        };

        Ok(PromptResponse::Confirmed(PasswordAndHint::new(password, hint)))
    }

    fn ask_existing(&self, request: &PromptRequest) -> Result<PromptResponse> {
        if !request.default_hint.is_empty() {
            eprintln!(
                "{} {}",
                style("Hint:").dim(),
                style(&request.default_hint).cyan()
            );
        }
        let prompt = Password::new().with_prompt("Enter password");
        Ok(match answer(prompt.interact())? {
            Some(pw) => PromptResponse::Confirmed(PasswordAndHint::new(
                pw,
                request.default_hint.clone(),
            )),
            None => PromptResponse::Cancelled,
        })
    }
}

impl PasswordPrompt for TerminalPrompt {
    fn request(&mut self, request: &PromptRequest) -> Result<PromptResponse> {
        match request.purpose {
            PromptPurpose::Encrypt => self.ask_new(request),
            PromptPurpose::Decrypt => self.ask_existing(request),
        }
    }
}

/// Map a dialoguer result: Ctrl-C becomes `None`, other failures an error.
fn answer<T>(result: std::result::Result<T, dialoguer::Error>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(MeldSealError::CommandFailed(format!("password prompt: {e}"))),
    }
}

fn check_length(password: &str, min_len: usize) -> Result<()> {
    if password.chars().count() < min_len {
        return Err(MeldSealError::InvalidInput(format!(
            "password must be at least {min_len} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_prompt_is_not_interactive() {
        let prompt = EnvPrompt::new("pw".into(), 1);
        assert!(!prompt.is_interactive());
    }

    #[test]
    fn env_prompt_keeps_default_hint() {
        let mut prompt = EnvPrompt::new("hunter22".into(), 1);
        let req = PromptRequest::encrypt("the usual", true, true);
        match prompt.request(&req).unwrap() {
            PromptResponse::Confirmed(p) => {
                assert_eq!(p.password.as_str(), "hunter22");
                assert_eq!(p.hint, "the usual");
            }
            PromptResponse::Cancelled => panic!("env prompt never cancels"),
        }
    }

    #[test]
    fn env_prompt_enforces_min_length_on_encrypt_only() {
        let mut prompt = EnvPrompt::new("abc".into(), 8);
        assert!(prompt.request(&PromptRequest::encrypt("", false, false)).is_err());
        assert!(prompt.request(&PromptRequest::decrypt("")).is_ok());
    }

    #[test]
    fn length_counts_characters() {
        assert!(check_length("ééé", 3).is_ok());
        assert!(check_length("éé", 3).is_err());
    }
}
