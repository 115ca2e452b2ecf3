//! The textual conventions a payload can be embedded with.
//!
//! Every convention that ever shipped stays decodable.  New conventions are
//! appended to [`TextualEncoding`] and to [`TextualEncoding::PRIORITY`];
//! existing recognizers are never changed.

use std::fmt;
use std::str::FromStr;

use crate::errors::{MeldSealError, Result};

/// Language tag of fenced blocks and marker of inline secrets.
pub const MARKER: &str = "meld-encrypt";

/// Marker of the short-lived `secret {json}` inline form.
pub const SECRET_MARKER: &str = "secret";

/// How an encrypted payload is embedded in document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextualEncoding {
    /// A fenced code block tagged `meld-encrypt` whose body is the JSON.
    FencedBlock,
    /// Inline code: `` `meld-encrypt {json}` ``.
    MarkerInline,
    /// Inline code: `` `secret {json}` ``.
    SecretInline,
    /// Inline code holding only the JSON: `` `{json}` ``.
    BacktickJson,
    /// The JSON object on its own.
    BareJson,
}

impl TextualEncoding {
    /// Recognition order: most structured forms first.
    pub const PRIORITY: [TextualEncoding; 5] = [
        TextualEncoding::FencedBlock,
        TextualEncoding::MarkerInline,
        TextualEncoding::SecretInline,
        TextualEncoding::BacktickJson,
        TextualEncoding::BareJson,
    ];

    /// The encoding used for new secrets unless configured otherwise.
    pub const CANONICAL: TextualEncoding = TextualEncoding::MarkerInline;

    /// Short name used in config files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::FencedBlock => "fenced",
            Self::MarkerInline => "marker",
            Self::SecretInline => "secret",
            Self::BacktickJson => "backtick",
            Self::BareJson => "json",
        }
    }

    /// Whether this is an inline form that lives on a single line.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            Self::MarkerInline | Self::SecretInline | Self::BacktickJson
        )
    }

    /// Return the JSON body if `text` has this encoding's shape.
    ///
    /// Only the shape is checked; the body is not parsed.
    pub fn unwrap(self, text: &str) -> Option<&str> {
        let text = text.trim();
        match self {
            Self::FencedBlock => fenced_body(text),
            Self::MarkerInline => inline_body(text).and_then(|b| after_marker(b, MARKER)),
            Self::SecretInline => inline_body(text).and_then(|b| after_marker(b, SECRET_MARKER)),
            Self::BacktickJson => inline_body(text).filter(|b| is_object_shaped(b)),
            Self::BareJson => Some(text).filter(|t| is_object_shaped(t)),
        }
    }

    /// Embed a JSON object using this encoding.
    pub fn wrap(self, json: &str) -> String {
        match self {
            Self::FencedBlock => format!("```{MARKER}\n{json}\n```"),
            Self::MarkerInline => format!("`{MARKER} {json}`"),
            Self::SecretInline => format!("`{SECRET_MARKER} {json}`"),
            Self::BacktickJson => format!("`{json}`"),
            Self::BareJson => json.to_string(),
        }
    }

    /// Does `text` have this encoding's shape?
    pub fn matches(self, text: &str) -> bool {
        self.unwrap(text).is_some()
    }
}

impl fmt::Display for TextualEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextualEncoding {
    type Err = MeldSealError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fenced" | "block" | "fenced-block" => Ok(Self::FencedBlock),
            "marker" | "meld-encrypt" | "inline" => Ok(Self::MarkerInline),
            "secret" => Ok(Self::SecretInline),
            "backtick" | "backtick-json" => Ok(Self::BacktickJson),
            "json" | "bare" | "bare-json" => Ok(Self::BareJson),
            other => Err(MeldSealError::InvalidInput(format!(
                "unknown format '{other}'; supported: fenced, marker, secret, backtick, json"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Shape helpers
// ---------------------------------------------------------------------------

fn is_object_shaped(s: &str) -> bool {
    let s = s.trim();
    s.len() >= 2 && s.starts_with('{') && s.ends_with('}')
}

/// Number of consecutive backticks at the start of `s`.
pub(crate) fn backtick_run(s: &str) -> usize {
    s.bytes().take_while(|&b| b == b'`').count()
}

/// Body of an inline code span delimited by one or two backticks.
///
/// Three or more backticks are a fence, not inline code.
fn inline_body(text: &str) -> Option<&str> {
    let run = backtick_run(text);
    if run == 0 || run > 2 || text.contains('\n') {
        return None;
    }
    let inner = text.get(run..text.len().checked_sub(run)?)?;
    if inner.is_empty() || inner.starts_with('`') || inner.ends_with('`') {
        return None;
    }
    if text.len() < 2 * run || !text.ends_with(&"`".repeat(run)) {
        return None;
    }
    Some(inner.trim())
}

/// Text after a case-insensitive `marker` and at least one space, if it is
/// object-shaped.
fn after_marker<'a>(body: &'a str, marker: &str) -> Option<&'a str> {
    let head = body.get(..marker.len())?;
    if !head.eq_ignore_ascii_case(marker) {
        return None;
    }
    let rest = &body[marker.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();
    is_object_shaped(rest).then_some(rest)
}

/// JSON body of a fenced `meld-encrypt` block.
///
/// The opening fence is three or more backticks followed by the language
/// tag; the closing fence is a line of at least as many backticks.
fn fenced_body(text: &str) -> Option<&str> {
    let run = backtick_run(text);
    if run < 3 {
        return None;
    }
    let (opening, rest) = text.split_once('\n')?;
    if !opening[run..].trim().eq_ignore_ascii_case(MARKER) {
        return None;
    }

    let (body, closing) = match rest.rsplit_once('\n') {
        Some((body, closing)) => (body, closing),
        None => ("", rest),
    };
    let closing = closing.trim();
    if closing.len() < run || backtick_run(closing) != closing.len() {
        return None;
    }

    let body = body.trim();
    is_object_shaped(body).then_some(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{"version":2,"encodedData":"abc","hint":""}"#;

    fn recognized_by(text: &str) -> Vec<TextualEncoding> {
        TextualEncoding::PRIORITY
            .into_iter()
            .filter(|e| e.matches(text))
            .collect()
    }

    #[test]
    fn each_wrapped_form_matches_only_its_own_variant() {
        for encoding in TextualEncoding::PRIORITY {
            let text = encoding.wrap(JSON);
            assert_eq!(recognized_by(&text), vec![encoding], "{text}");
            assert_eq!(encoding.unwrap(&text), Some(JSON));
        }
    }

    #[test]
    fn marker_is_case_insensitive() {
        let text = format!("`Meld-Encrypt {JSON}`");
        assert_eq!(TextualEncoding::MarkerInline.unwrap(&text), Some(JSON));
        let text = format!("```MELD-ENCRYPT\n{JSON}\n```");
        assert_eq!(TextualEncoding::FencedBlock.unwrap(&text), Some(JSON));
    }

    #[test]
    fn marker_needs_a_separator() {
        let text = format!("`meld-encrypt{JSON}`");
        assert!(!TextualEncoding::MarkerInline.matches(&text));
    }

    #[test]
    fn double_backtick_inline_code_is_accepted() {
        let text = format!("``meld-encrypt {JSON}``");
        assert_eq!(TextualEncoding::MarkerInline.unwrap(&text), Some(JSON));
    }

    #[test]
    fn fenced_block_tolerates_longer_fences_and_whitespace() {
        let text = format!("  ````meld-encrypt  \n\n{JSON}\n\n````  ");
        assert_eq!(TextualEncoding::FencedBlock.unwrap(&text), Some(JSON));
    }

    #[test]
    fn fenced_block_with_other_language_is_not_recognized() {
        let text = format!("```json\n{JSON}\n```");
        assert!(recognized_by(&text).is_empty());
    }

    #[test]
    fn unclosed_fence_is_not_recognized() {
        let text = format!("```meld-encrypt\n{JSON}");
        assert!(!TextualEncoding::FencedBlock.matches(&text));
    }

    #[test]
    fn plain_inline_code_is_not_recognized() {
        assert!(recognized_by("`not json at all`").is_empty());
        assert!(recognized_by("`meld-encrypt`").is_empty());
        assert!(recognized_by("``").is_empty());
        assert!(recognized_by("`").is_empty());
        assert!(recognized_by("").is_empty());
    }

    #[test]
    fn format_names_parse() {
        for encoding in TextualEncoding::PRIORITY {
            assert_eq!(encoding.name().parse::<TextualEncoding>().unwrap(), encoding);
        }
        assert!("yaml".parse::<TextualEncoding>().is_err());
    }
}
