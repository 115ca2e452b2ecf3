//! CLI module: Clap argument parser, password prompts, output helpers, and
//! command implementations.

pub mod commands;
pub mod output;
pub mod prompt;

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::Settings;
use crate::errors::{MeldSealError, Result};
use crate::session::PasswordPrompt;

/// Environment variable holding a password for scripted use.
pub const PASSWORD_ENV: &str = "MELDSEAL_PASSWORD";

/// MeldSeal CLI: password-protected secrets inside plain-text documents.
#[derive(Parser)]
#[command(
    name = "meldseal",
    about = "Password-protected secrets inside plain-text documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding .meldseal.toml (default: current directory)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Encrypt text and print its embedding
    Encrypt {
        /// Text to encrypt (reads stdin if omitted)
        text: Option<String>,
        /// Hint stored unencrypted next to the secret
        #[arg(long)]
        hint: Option<String>,
        /// Embedding: fenced, marker, secret, backtick, json
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Decrypt an embedded secret and print the plaintext
    Decrypt {
        /// Embedded secret (reads stdin if omitted)
        text: Option<String>,
    },

    /// List the secrets embedded in a document
    Scan {
        /// Document to scan
        file: String,
    },

    /// Encrypt the first occurrence of some text inside a document
    Seal {
        /// Document to modify
        file: String,
        /// Text to encrypt
        #[arg(long)]
        find: String,
        /// Hint stored unencrypted next to the secret
        #[arg(long)]
        hint: Option<String>,
        /// Embedding: fenced, marker, secret, backtick, json
        #[arg(short, long)]
        format: Option<String>,
        /// Rewrite the file instead of printing to stdout
        #[arg(short, long)]
        in_place: bool,
    },

    /// Decrypt every secret inside a document
    Reveal {
        /// Document to modify
        file: String,
        /// Rewrite the file instead of printing to stdout
        #[arg(short, long)]
        in_place: bool,
    },

    /// Show version
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config` or the current directory.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let dir = match &cli.config {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    Settings::load(&dir)
}

/// The password source for this run.
///
/// `MELDSEAL_PASSWORD` wins (CI/scripts); otherwise the terminal prompt.
pub fn password_prompt(settings: &Settings) -> Box<dyn PasswordPrompt> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Box::new(prompt::EnvPrompt::new(pw, settings.min_password_len));
        }
    }
    Box::new(prompt::TerminalPrompt::new(settings.min_password_len))
}

/// Use `text` if given, otherwise read all of stdin.
///
/// A single trailing newline from piped input is dropped.
pub fn read_input(text: Option<&str>, what: &str) -> Result<String> {
    if let Some(t) = text {
        return Ok(t.to_string());
    }
    if io::stdin().is_terminal() {
        return Err(MeldSealError::InvalidInput(format!(
            "no {what} given; pass it as an argument or pipe it on stdin"
        )));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    let trimmed = buf
        .strip_suffix('\n')
        .map(|b| b.strip_suffix('\r').unwrap_or(b))
        .unwrap_or(buf.as_str());
    Ok(trimmed.to_string())
}

/// Read a document, mapping a missing file to a clear error.
pub fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MeldSealError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("file not found: {}", path.display()),
        )),
        _ => e.into(),
    })
}

/// Write the mutated document back, or print it.
pub fn emit_document(path: &Path, contents: &str, in_place: bool) -> Result<()> {
    if in_place {
        crate::document::write_atomic(path, contents)
    } else {
        print!("{contents}");
        Ok(())
    }
}
