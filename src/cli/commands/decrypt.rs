//! `meldseal decrypt`: decrypt one embedded secret and print the plaintext.

use crate::cli::{load_settings, password_prompt, read_input, Cli};
use crate::codec;
use crate::engine::SecretEngine;
use crate::errors::Result;
use crate::session::{PasswordScope, Unlocker};

/// Execute the `decrypt` command.
pub fn execute(cli: &Cli, text: Option<&str>) -> Result<()> {
    let settings = load_settings(cli)?;
    let input = read_input(text, "secret to decrypt")?;
    let payload = codec::decode(input.trim())?;

    let engine = SecretEngine::new(settings.engine_config()?);
    let cache = settings.password_cache();
    let mut prompt = password_prompt(&settings);

    let plaintext = Unlocker::new(&engine, &cache).unlock(
        prompt.as_mut(),
        &payload,
        &PasswordScope::Vault,
    )?;

    println!("{}", plaintext.as_str());
    Ok(())
}
