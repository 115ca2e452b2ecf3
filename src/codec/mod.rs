//! Payload codec: moves `EncryptedPayload`s in and out of document text.
//!
//! This module provides:
//! - `EncryptedPayload` and its JSON wire record (`payload`)
//! - The five historical embedding conventions (`encoding`)
//! - Whole-document scanning for embedded secrets (`scan`)
//!
//! Decoding is expected to fail often: callers probe arbitrary spans of a
//! document, so "not a secret" is an ordinary `Err(ParseFailure)` or `None`.

pub mod encoding;
pub mod payload;
pub mod scan;

pub use encoding::TextualEncoding;
pub use payload::EncryptedPayload;
pub use scan::{scan, scan_report, ScanReport, SecretSpan, UnsupportedSpan};

use crate::errors::{MeldSealError, Result};
use payload::WireRecord;

/// Serializes payloads with a chosen canonical encoding and decodes any
/// known encoding.
#[derive(Debug, Clone, Copy)]
pub struct PayloadCodec {
    canonical: TextualEncoding,
}

impl Default for PayloadCodec {
    fn default() -> Self {
        Self::new(TextualEncoding::CANONICAL)
    }
}

impl PayloadCodec {
    pub fn new(canonical: TextualEncoding) -> Self {
        Self { canonical }
    }

    /// The encoding `encode` writes.
    pub fn canonical(&self) -> TextualEncoding {
        self.canonical
    }

    /// Serialize `payload` with the canonical encoding.
    pub fn encode(&self, payload: &EncryptedPayload) -> Result<String> {
        encode_as(payload, self.canonical)
    }

    pub fn recognize(&self, text: &str) -> Option<TextualEncoding> {
        recognize(text)
    }

    pub fn decode(&self, text: &str) -> Result<EncryptedPayload> {
        decode(text)
    }

    pub fn is_encrypted(&self, text: &str) -> bool {
        is_encrypted(text)
    }
}

/// Serialize `payload` with an explicit encoding.
pub fn encode_as(payload: &EncryptedPayload, encoding: TextualEncoding) -> Result<String> {
    let json = payload.to_record().to_json()?;
    Ok(encoding.wrap(&json))
}

/// Which known encoding `text` uses, probing in priority order.
///
/// `None` means the text is not encrypted content.
pub fn recognize(text: &str) -> Option<TextualEncoding> {
    TextualEncoding::PRIORITY
        .into_iter()
        .find(|encoding| encoding.matches(text))
}

/// Parse `text` as an embedded secret.
///
/// Fails with `ParseFailure` when no convention matches or the JSON is
/// malformed or incomplete, and with `UnsupportedVersion` when the JSON is
/// well-formed but carries a version this build does not know.
pub fn decode(text: &str) -> Result<EncryptedPayload> {
    let encoding = recognize(text).ok_or_else(|| {
        MeldSealError::ParseFailure("text does not match any known embedding".into())
    })?;
    decode_as(text, encoding)
}

/// Parse `text` with a specific encoding.
pub fn decode_as(text: &str, encoding: TextualEncoding) -> Result<EncryptedPayload> {
    let json = encoding.unwrap(text).ok_or_else(|| {
        MeldSealError::ParseFailure(format!("text is not in {encoding} form"))
    })?;
    let record = WireRecord::parse(json)?;
    EncryptedPayload::from_record(record)
}

/// Whether `text` decodes to a payload this build can decrypt.
pub fn is_encrypted(text: &str) -> bool {
    decode(text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(hint: &str) -> EncryptedPayload {
        EncryptedPayload::from_parts(2, vec![5; 16], vec![6; 12], vec![7; 24], hint)
    }

    #[test]
    fn encode_uses_canonical_encoding() {
        let codec = PayloadCodec::default();
        let text = codec.encode(&payload("h")).unwrap();
        assert!(text.starts_with("`meld-encrypt {"));
        assert_eq!(codec.recognize(&text), Some(TextualEncoding::MarkerInline));
    }

    #[test]
    fn every_encoding_decodes_back() {
        let original = payload("hint with ` backtick");
        for encoding in TextualEncoding::PRIORITY {
            let text = encode_as(&original, encoding).unwrap();
            assert_eq!(recognize(&text), Some(encoding));
            assert_eq!(decode(&text).unwrap(), original);
        }
    }

    #[test]
    fn not_json_is_not_recognized() {
        assert_eq!(recognize("`not json at all`"), None);
        assert!(matches!(
            decode("`not json at all`"),
            Err(MeldSealError::ParseFailure(_))
        ));
    }

    #[test]
    fn json_without_required_fields_is_not_a_secret() {
        let text = r#"`{"title":"shopping list"}`"#;
        assert_eq!(recognize(text), Some(TextualEncoding::BacktickJson));
        assert!(!is_encrypted(text));
    }

    #[test]
    fn malformed_json_is_parse_failure() {
        let text = "`meld-encrypt {\"version\":2,}`";
        assert!(matches!(decode(text), Err(MeldSealError::ParseFailure(_))));
    }

    #[test]
    fn hint_defaults_to_empty() {
        let with_hint = encode_as(&payload("x"), TextualEncoding::BareJson).unwrap();
        let without = with_hint.replace(r#","hint":"x""#, "");
        assert_eq!(decode(&without).unwrap().hint(), "");
    }
}
