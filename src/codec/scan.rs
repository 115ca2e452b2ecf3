//! Find every embedded secret in a whole document.
//!
//! The scanner walks the document line by line:
//! - fenced code blocks are matched opener-to-closer; `meld-encrypt` blocks
//!   are decoded, other languages are skipped entirely so code samples are
//!   never mistaken for secrets;
//! - a line holding only a JSON object with an `encodedData` key is tried
//!   as bare JSON;
//! - otherwise each inline code span on the line is tried.
//!
//! Spans that do not decode are ignored.  Spans that decode structurally
//! but carry an unknown version are reported separately.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::encoding::{backtick_run, TextualEncoding, MARKER};
use super::{decode_as, recognize, EncryptedPayload};
use crate::errors::MeldSealError;

/// A decodable secret found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretSpan {
    /// Byte range of the whole embedding, delimiters included.
    pub range: Range<usize>,
    /// 1-based line number where the embedding starts.
    pub line: usize,
    pub encoding: TextualEncoding,
    pub payload: EncryptedPayload,
}

/// An embedding whose version this build cannot decrypt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedSpan {
    pub range: Range<usize>,
    pub line: usize,
    pub encoding: TextualEncoding,
    pub version: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub secrets: Vec<SecretSpan>,
    pub unsupported: Vec<UnsupportedSpan>,
}

/// Decodable secrets in `document`, in document order.
pub fn scan(document: &str) -> Vec<SecretSpan> {
    scan_report(document).secrets
}

/// Full scan result, including spans with unsupported versions.
pub fn scan_report(document: &str) -> ScanReport {
    let lines = split_lines(document);
    let mut report = ScanReport::default();

    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        let trimmed = line.text.trim_start();
        let run = backtick_run(trimmed);

        if run >= 3 {
            let closer = (i + 1..lines.len()).find(|&j| is_closing_fence(lines[j].text, run));
            let Some(j) = closer else {
                // An unclosed fence swallows the rest of the document.
                break;
            };

            if trimmed[run..].trim().eq_ignore_ascii_case(MARKER) {
                let start = line.start + (line.text.len() - trimmed.len());
                let end = lines[j].start + lines[j].text.trim_end().len();
                report.consider(document, start..end, line.number);
            }
            i = j + 1;
            continue;
        }

        if let Some(m) = bare_json_pattern().and_then(|re| re.captures(line.text)) {
            if let Some(json) = m.get(1) {
                let range = line.start + json.start()..line.start + json.end();
                if report.consider(document, range, line.number) {
                    i += 1;
                    continue;
                }
            }
        }

        for span in inline_code_spans(line.text) {
            let range = line.start + span.start..line.start + span.end;
            report.consider(document, range, line.number);
        }
        i += 1;
    }

    tracing::debug!(
        secrets = report.secrets.len(),
        unsupported = report.unsupported.len(),
        "scanned document"
    );
    report
}

impl ScanReport {
    /// Try `range` as an embedding; returns whether anything was recorded.
    fn consider(&mut self, document: &str, range: Range<usize>, line: usize) -> bool {
        let text = &document[range.clone()];
        let Some(encoding) = recognize(text) else {
            return false;
        };

        match decode_as(text, encoding) {
            Ok(payload) => {
                self.secrets.push(SecretSpan {
                    range,
                    line,
                    encoding,
                    payload,
                });
                true
            }
            Err(MeldSealError::UnsupportedVersion(version)) => {
                self.unsupported.push(UnsupportedSpan {
                    range,
                    line,
                    encoding,
                    version,
                });
                true
            }
            Err(_) => false,
        }
    }
}

struct Line<'a> {
    /// Byte offset of the first character of the line.
    start: usize,
    /// Line content without the line terminator.
    text: &'a str,
    number: usize,
}

fn split_lines(document: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, raw) in document.split_inclusive('\n').enumerate() {
        let text = raw
            .strip_suffix('\n')
            .map(|t| t.strip_suffix('\r').unwrap_or(t))
            .unwrap_or(raw);
        lines.push(Line {
            start,
            text,
            number: idx + 1,
        });
        start += raw.len();
    }
    lines
}

fn is_closing_fence(line: &str, opening_run: usize) -> bool {
    let t = line.trim();
    t.len() >= opening_run && backtick_run(t) == t.len()
}

fn bare_json_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"^\s*(\{.*"encodedData".*\})\s*$"#).ok())
        .as_ref()
}

/// Byte ranges of inline code spans on one line, delimiters included.
///
/// A span opens with a run of N backticks and closes at the next run of
/// exactly N backticks.  An opener with no closer is literal text.
fn inline_code_spans(line: &str) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let run = backtick_run(&line[i..]);
        let body_start = i + run;

        let mut j = body_start;
        let mut closed = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let close_run = backtick_run(&line[j..]);
                if close_run == run {
                    closed = Some(j + run);
                    break;
                }
                j += close_run;
            } else {
                j += 1;
            }
        }

        match closed {
            Some(end) => {
                spans.push(i..end);
                i = end;
            }
            None => i = body_start,
        }
    }
    spans
}
