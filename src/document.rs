//! Document mutation: span replacement and atomic writes.
//!
//! Secrets are swapped in and out of a document by byte range.  Several
//! replacements are applied back-to-front so earlier ranges stay valid.

use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::errors::{MeldSealError, Result};

/// One pending replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl Edit {
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }
}

/// Byte range of the first occurrence of `needle` in `document`.
pub fn find_selection(document: &str, needle: &str) -> Option<Range<usize>> {
    find_selection_outside(document, needle, &[])
}

/// Byte range of the first occurrence of `needle` that overlaps none of
/// `excluded`.
///
/// Used to keep a new selection out of secrets already embedded in the
/// document.
pub fn find_selection_outside(
    document: &str,
    needle: &str,
    excluded: &[Range<usize>],
) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }
    document
        .char_indices()
        .filter(|&(start, _)| document[start..].starts_with(needle))
        .map(|(start, _)| start..start + needle.len())
        .find(|candidate| {
            !excluded
                .iter()
                .any(|ex| candidate.start < ex.end && ex.start < candidate.end)
        })
}

/// Replace `range` in `document` with `replacement`.
pub fn replace_range(document: &str, range: Range<usize>, replacement: &str) -> Result<String> {
    replace_spans(document, vec![Edit::new(range, replacement)])
}

/// Apply several non-overlapping edits at once.
///
/// Ranges must lie on character boundaries and must not overlap; the
/// document is left untouched (an error is returned) otherwise.
pub fn replace_spans(document: &str, mut edits: Vec<Edit>) -> Result<String> {
    edits.sort_by_key(|e| e.range.start);

    let mut previous_end = 0;
    for edit in &edits {
        let Range { start, end } = edit.range;
        if start > end || end > document.len() {
            return Err(MeldSealError::InvalidInput(format!(
                "range {start}..{end} is outside the document"
            )));
        }
        if !document.is_char_boundary(start) || !document.is_char_boundary(end) {
            return Err(MeldSealError::InvalidInput(format!(
                "range {start}..{end} splits a character"
            )));
        }
        if start < previous_end {
            return Err(MeldSealError::InvalidInput(format!(
                "range {start}..{end} overlaps a previous edit"
            )));
        }
        previous_end = end;
    }

    let mut out = document.to_string();
    for edit in edits.iter().rev() {
        out.replace_range(edit.range.clone(), &edit.replacement);
    }
    Ok(out)
}

/// Write `contents` to `path` **atomically**.
///
/// Writes to a temp file in the same directory and renames it over the
/// target, so readers never see a half-written document.  An existing
/// target keeps its permissions.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp_path = parent.join(format!(
        ".{}.meldseal.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, contents)?;
    if let Err(e) = keep_permissions(path, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Copy the mode of `target` (if it exists) onto `tmp_path`.
fn keep_permissions(target: &Path, tmp_path: &Path) -> Result<()> {
    match fs::metadata(target) {
        Ok(meta) => Ok(fs::set_permissions(tmp_path, meta.permissions())?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
