//! `meldseal seal`: encrypt the first occurrence of some text in a document.

use std::path::Path;

use crate::cli::{emit_document, load_settings, output, password_prompt, read_document, Cli};
use crate::codec::{decode, encode_as, scan_report, TextualEncoding};
use crate::document::{find_selection_outside, replace_range};
use crate::engine::SecretEngine;
use crate::errors::{MeldSealError, Result};
use crate::session::{request_new_password, PromptRequest};

/// Options for the `seal` command.
pub struct SealArgs<'a> {
    pub file: &'a str,
    pub find: &'a str,
    pub hint: Option<&'a str>,
    pub format: Option<&'a str>,
    pub in_place: bool,
}

/// Execute the `seal` command.
pub fn execute(cli: &Cli, args: SealArgs<'_>) -> Result<()> {
    let settings = load_settings(cli)?;
    let encoding = match args.format {
        Some(f) => f.parse::<TextualEncoding>()?,
        None => settings.format()?,
    };

    let path = Path::new(args.file);
    let document = read_document(path)?;

    // Occurrences inside existing secrets (hint, base64, or a whole
    // embedding) are never selected.
    let report = scan_report(&document);
    let embedded: Vec<_> = report
        .secrets
        .iter()
        .map(|s| s.range.clone())
        .chain(report.unsupported.iter().map(|s| s.range.clone()))
        .collect();
    let range = find_selection_outside(&document, args.find, &embedded).ok_or_else(|| {
        MeldSealError::NotFound(format!(
            "'{}' outside existing secrets in {}",
            args.find,
            path.display()
        ))
    })?;
    let selection = &document[range.clone()];
    if matches!(
        decode(selection),
        Ok(_) | Err(MeldSealError::UnsupportedVersion(_))
    ) {
        return Err(MeldSealError::InvalidInput(
            "selection is already an encrypted secret".into(),
        ));
    }

    let mut prompt = password_prompt(&settings);
    let request = PromptRequest::encrypt(
        args.hint.unwrap_or_default(),
        settings.confirm_password,
        args.hint.is_none(),
    );
    let answer = request_new_password(prompt.as_mut(), &request)?;

    let engine = SecretEngine::new(settings.engine_config()?);
    let payload = engine.encrypt(&answer.password, &answer.hint, args.find)?;
    let updated = replace_range(&document, range, &encode_as(&payload, encoding)?)?;

    emit_document(path, &updated, args.in_place)?;
    if args.in_place {
        output::success(&format!("Sealed 1 secret in {}", path.display()));
    }
    Ok(())
}
