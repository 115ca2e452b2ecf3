//! `meldseal completions`: print a shell completion script.
//!
//!   meldseal completions bash > ~/.bash_completion.d/meldseal

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::{MeldSealError, Result};

/// Execute the `completions` command.
pub fn execute(shell: &str) -> Result<()> {
    let shell = parse_shell(shell)?;
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

fn parse_shell(name: &str) -> Result<Shell> {
    let name = name.to_ascii_lowercase();
    let name = if name == "ps" { "powershell" } else { name.as_str() };
    name.parse::<Shell>().map_err(|_| {
        MeldSealError::CommandFailed(format!(
            "unknown shell '{name}'; supported: bash, zsh, fish, powershell, elvish"
        ))
    })
}
