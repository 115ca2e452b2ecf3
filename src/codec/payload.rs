//! `EncryptedPayload` and its JSON wire record.
//!
//! On the wire a payload is a small JSON object:
//!
//! ```text
//! {"version":2,"encodedData":"<base64(nonce || salt || ciphertext+tag)>","hint":"..."}
//! ```
//!
//! The nonce and salt lengths depend on the version, so an unknown version
//! cannot even be split into its parts and is rejected while decoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::crypto::FormatVersion;
use crate::errors::{MeldSealError, Result};

/// One encrypted secret: everything needed to decrypt it except the password.
///
/// Immutable once built.  The hint is stored in the clear and is not part
/// of the authenticated data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    version: u32,
    salt: Vec<u8>,
    nonce: Vec<u8>,
    ciphertext: Vec<u8>,
    hint: String,
}

impl EncryptedPayload {
    /// Assemble a payload from its parts.
    ///
    /// No validation happens here; the engine checks lengths and version
    /// before touching the ciphertext.
    pub fn from_parts(
        version: u32,
        salt: Vec<u8>,
        nonce: Vec<u8>,
        ciphertext: Vec<u8>,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            version,
            salt,
            nonce,
            ciphertext,
            hint: hint.into(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// Ciphertext followed by the authentication tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// `nonce || salt || ciphertext`, base64-encoded.
    pub fn encoded_data(&self) -> String {
        let mut blob =
            Vec::with_capacity(self.nonce.len() + self.salt.len() + self.ciphertext.len());
        blob.extend_from_slice(&self.nonce);
        blob.extend_from_slice(&self.salt);
        blob.extend_from_slice(&self.ciphertext);
        BASE64.encode(blob)
    }

    pub(crate) fn to_record(&self) -> WireRecord {
        WireRecord {
            version: Some(self.version),
            encoded_data: Some(self.encoded_data()),
            hint: self.hint.clone(),
        }
    }

    /// Split a wire record into a payload.
    ///
    /// Missing fields, bad base64 and short blobs are `ParseFailure`; a
    /// well-formed record with an unknown version is `UnsupportedVersion`.
    pub(crate) fn from_record(record: WireRecord) -> Result<Self> {
        let version = record
            .version
            .ok_or_else(|| MeldSealError::ParseFailure("missing `version` field".into()))?;
        let encoded = record
            .encoded_data
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MeldSealError::ParseFailure("missing `encodedData` field".into()))?;

        let known = FormatVersion::require(version)?;

        let blob = BASE64
            .decode(encoded.trim())
            .map_err(|e| MeldSealError::ParseFailure(format!("encodedData is not base64: {e}")))?;

        if blob.len() < known.min_encoded_len() {
            return Err(MeldSealError::ParseFailure(format!(
                "encodedData too short for {known}: {} bytes, need at least {}",
                blob.len(),
                known.min_encoded_len()
            )));
        }

        let (nonce, rest) = blob.split_at(known.nonce_len());
        let (salt, ciphertext) = rest.split_at(known.salt_len());

        Ok(Self {
            version,
            salt: salt.to_vec(),
            nonce: nonce.to_vec(),
            ciphertext: ciphertext.to_vec(),
            hint: record.hint,
        })
    }
}

/// The JSON object as it appears in documents.
///
/// Required fields are `Option` so a JSON object lacking them parses and is
/// reported as "not a secret" rather than as a serde error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireRecord {
    #[serde(default)]
    pub version: Option<u32>,

    #[serde(rename = "encodedData", default)]
    pub encoded_data: Option<String>,

    #[serde(default)]
    pub hint: String,
}

impl WireRecord {
    /// Parse a JSON object.  Anything else is a `ParseFailure`.
    pub fn parse(json: &str) -> Result<Self> {
        if !json.trim_start().starts_with('{') {
            return Err(MeldSealError::ParseFailure("not a JSON object".into()));
        }
        serde_json::from_str(json)
            .map_err(|e| MeldSealError::ParseFailure(format!("malformed JSON: {e}")))
    }

    /// Serialize to compact JSON with every backtick escaped as `\u0060`.
    ///
    /// serde_json only emits backticks inside string literals, where the
    /// escape is equivalent, and the result can never close an inline code
    /// span or a fence.
    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::to_string(self)
            .map_err(|e| MeldSealError::EncryptionFailed(format!("serializing payload: {e}")))?;
        Ok(json.replace('`', "\\u0060"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptedPayload {
        EncryptedPayload::from_parts(2, vec![1; 16], vec![2; 12], vec![3; 20], "hint")
    }

    #[test]
    fn record_roundtrip_keeps_every_part() {
        let payload = sample();
        let back = EncryptedPayload::from_record(payload.to_record()).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn encoded_data_layout_is_nonce_salt_ciphertext() {
        let raw = BASE64.decode(sample().encoded_data()).unwrap();
        assert_eq!(&raw[..12], &[2; 12]);
        assert_eq!(&raw[12..28], &[1; 16]);
        assert_eq!(&raw[28..], &[3; 20]);
    }

    #[test]
    fn missing_fields_are_parse_failures() {
        let record = WireRecord::parse(r#"{"hint":"x"}"#).unwrap();
        assert!(matches!(
            EncryptedPayload::from_record(record),
            Err(MeldSealError::ParseFailure(_))
        ));

        let record = WireRecord::parse(r#"{"version":2,"encodedData":""}"#).unwrap();
        assert!(matches!(
            EncryptedPayload::from_record(record),
            Err(MeldSealError::ParseFailure(_))
        ));
    }

    #[test]
    fn unknown_version_is_unsupported() {
        let record = WireRecord::parse(r#"{"version":99999,"encodedData":"AAAA"}"#).unwrap();
        assert!(matches!(
            EncryptedPayload::from_record(record),
            Err(MeldSealError::UnsupportedVersion(99_999))
        ));
    }

    #[test]
    fn short_blob_is_parse_failure() {
        let record = WireRecord::parse(r#"{"version":2,"encodedData":"AAAA"}"#).unwrap();
        assert!(matches!(
            EncryptedPayload::from_record(record),
            Err(MeldSealError::ParseFailure(_))
        ));
    }

    #[test]
    fn backticks_in_hint_are_escaped() {
        let payload = EncryptedPayload::from_parts(2, vec![0; 16], vec![0; 12], vec![0; 16], "a`b");
        let json = payload.to_record().to_json().unwrap();
        assert!(!json.contains('`'));

        let parsed = WireRecord::parse(&json).unwrap();
        assert_eq!(parsed.hint, "a`b");
    }

    #[test]
    fn non_object_json_is_parse_failure() {
        assert!(WireRecord::parse("[1,2,3]").is_err());
        assert!(WireRecord::parse("not json").is_err());
    }
}
