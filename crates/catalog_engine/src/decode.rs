use encoding_rs::{Encoding, UTF_8};

use crate::{FailureKind, FetchError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decode a response body to UTF-8 using: BOM -> Content-Type charset -> UTF-8.
/// The BOM itself is stripped so the JSON parser never sees it.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedText, DecodeError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(&bytes[bom_len..], encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    decode_with(bytes, UTF_8)
}

/// Decodes and parses a feed document.
pub fn parse_document(
    bytes: &[u8],
    content_type: Option<&str>,
) -> Result<serde_json::Value, FetchError> {
    let decoded = decode_body(bytes, content_type)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
    serde_json::from_str(&decoded.text)
        .map_err(|err| FetchError::new(FailureKind::Parse, err.to_string()))
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches(&['"', '\''][..]).to_string())
        })
        .next()
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedText, DecodeError> {
    let (text, had_errors) = enc.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: enc.name().to_string(),
            message: "decoding error".into(),
        });
    }
    Ok(DecodedText {
        text: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_stripped_before_parsing() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(br#"[{"id":"1"}]"#);
        let value = parse_document(&bytes, None).expect("parse");
        assert_eq!(value[0]["id"], "1");
    }

    #[test]
    fn charset_from_content_type_is_honoured() {
        // "Atención" in windows-1252.
        let bytes = b"[\"Atenci\xf3n\"]";
        let value = parse_document(bytes, Some("application/json; charset=windows-1252"))
            .expect("parse");
        assert_eq!(value[0], "Atención");
    }

    #[test]
    fn invalid_utf8_is_a_decode_failure() {
        let err = parse_document(b"[\"\xff\"]", Some("application/json")).unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
        assert!(err.is_parse_failure());
    }

    #[test]
    fn malformed_json_is_a_parse_failure() {
        let err = parse_document(b"{not json", None).unwrap_err();
        assert_eq!(err.kind, FailureKind::Parse);
    }

    #[test]
    fn charset_parameter_is_case_insensitive() {
        assert_eq!(
            extract_charset("application/json; Charset=\"ISO-8859-1\"").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(extract_charset("application/json"), None);
    }
}
