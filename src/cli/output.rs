//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.  Status lines go to stderr so
//! stdout stays clean for ciphertext, plaintext, and rewritten documents.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::codec::SecretSpan;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    eprintln!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of embedded secrets (Line, Format, Version, Hint).
pub fn print_secrets_table(secrets: &[SecretSpan]) {
    if secrets.is_empty() {
        info("No secrets in this document.");
        tip("Run `meldseal seal <FILE> --find <TEXT>` to encrypt part of it.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Line", "Format", "Version", "Hint"]);

    for s in secrets {
        table.add_row(vec![
            s.line.to_string(),
            s.encoding.name().to_string(),
            format!("v{}", s.payload.version()),
            s.payload.hint().to_string(),
        ]);
    }

    println!("{table}");
}
