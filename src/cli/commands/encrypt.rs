//! `meldseal encrypt`: encrypt text and print its embedding.

use crate::cli::{load_settings, password_prompt, read_input, Cli};
use crate::codec::{encode_as, TextualEncoding};
use crate::engine::SecretEngine;
use crate::errors::Result;
use crate::session::{request_new_password, PromptRequest};

/// Execute the `encrypt` command.
pub fn execute(
    cli: &Cli,
    text: Option<&str>,
    hint: Option<&str>,
    format: Option<&str>,
) -> Result<()> {
    let settings = load_settings(cli)?;
    let encoding = match format {
        Some(f) => f.parse::<TextualEncoding>()?,
        None => settings.format()?,
    };
    let plaintext = read_input(text, "text to encrypt")?;

    let mut prompt = password_prompt(&settings);
    let request = PromptRequest::encrypt(
        hint.unwrap_or_default(),
        settings.confirm_password,
        hint.is_none(),
    );
    let answer = request_new_password(prompt.as_mut(), &request)?;

    let engine = SecretEngine::new(settings.engine_config()?);
    let payload = engine.encrypt(&answer.password, &answer.hint, &plaintext)?;

    println!("{}", encode_as(&payload, encoding)?);
    Ok(())
}
