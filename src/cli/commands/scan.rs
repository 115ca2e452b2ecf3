//! `meldseal scan`: list the secrets embedded in a document.

use std::path::Path;

use crate::cli::{output, read_document};
use crate::codec::scan_report;
use crate::errors::Result;

/// Execute the `scan` command.
pub fn execute(file: &str) -> Result<()> {
    let document = read_document(Path::new(file))?;
    let report = scan_report(&document);

    output::print_secrets_table(&report.secrets);
    for span in &report.unsupported {
        output::warning(&format!(
            "line {}: secret uses format version {} which this build cannot decrypt",
            span.line, span.version
        ));
    }
    Ok(())
}
