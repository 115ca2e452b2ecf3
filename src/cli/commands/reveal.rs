//! `meldseal reveal`: decrypt every secret in a document.

use std::path::Path;

use crate::cli::{emit_document, load_settings, output, password_prompt, read_document, Cli};
use crate::codec::scan_report;
use crate::document::{replace_spans, Edit};
use crate::engine::SecretEngine;
use crate::errors::{MeldSealError, Result};
use crate::session::{PasswordScope, Unlocker};

/// Execute the `reveal` command.
///
/// Secrets whose password is wrong stay encrypted and are reported.  If
/// none decrypt, the command fails and the document is left untouched.
pub fn execute(cli: &Cli, file: &str, in_place: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let level = settings.remember_level()?;
    let path = Path::new(file);
    let document = read_document(path)?;

    let report = scan_report(&document);
    for span in &report.unsupported {
        output::warning(&format!(
            "line {}: skipping secret with unsupported format version {}",
            span.line, span.version
        ));
    }
    if report.secrets.is_empty() {
        output::info(&format!("No secrets found in {}", path.display()));
        return Ok(());
    }

    let engine = SecretEngine::new(settings.engine_config()?);
    let cache = settings.password_cache();
    let unlocker = Unlocker::new(&engine, &cache);
    let mut prompt = password_prompt(&settings);

    let mut edits = Vec::with_capacity(report.secrets.len());
    let mut failed = 0;
    for span in &report.secrets {
        let scope = PasswordScope::for_secret(level, path, &span.payload.encoded_data());
        match unlocker.unlock(prompt.as_mut(), &span.payload, &scope) {
            Ok(plaintext) => {
                tracing::debug!(line = span.line, encoding = %span.encoding, "revealed secret");
                edits.push(Edit::new(span.range.clone(), plaintext.as_str()));
            }
            Err(e) if e.is_retryable() => {
                output::warning(&format!("line {}: {e}, left encrypted", span.line));
                failed += 1;
            }
            Err(e) => return Err(e),
        }
    }
    if edits.is_empty() {
        return Err(MeldSealError::AuthenticationFailed);
    }

    let count = edits.len();
    let updated = replace_spans(&document, edits)?;
    emit_document(path, &updated, in_place)?;
    if in_place {
        output::success(&format!("Revealed {count} secret(s) in {}", path.display()));
    }
    if failed > 0 {
        output::warning(&format!("{failed} secret(s) could not be decrypted"));
    }
    Ok(())
}
