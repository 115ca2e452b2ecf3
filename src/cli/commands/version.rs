//! `meldseal version`: display version and supported formats.

use console::style;

use crate::crypto::FormatVersion;
use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("meldseal {current}");

    let versions: Vec<String> = FormatVersion::ALL.iter().map(|v| v.to_string()).collect();
    println!(
        "{} {} (new secrets use {})",
        style("Formats:").dim(),
        versions.join(", "),
        style(FormatVersion::CURRENT).green().bold()
    );
    Ok(())
}
