use std::fmt;
use wasm_bindgen::JsValue;

pub use wallet_codec::redact::scrub_error_message;

pub fn scrub_js_error_value(err: JsValue) -> JsValue {
    if let Some(message) = err.as_string() {
        return JsValue::from_str(&scrub_error_message(&message));
    }
    JsValue::from_str(&scrub_error_message(&format!("{err:?}")))
}

/// Parse payload error with message name context.
///
/// Important: `serde_wasm_bindgen::Error` can embed the full JS value in its
/// Display representation (including secrets).
pub struct ParsePayloadError {
    pub message_name: String,
    pub serde_error: serde_wasm_bindgen::Error,
}

impl ParsePayloadError {
    pub fn new(message_name: &str, serde_error: serde_wasm_bindgen::Error) -> Self {
        Self {
            message_name: message_name.to_string(),
            serde_error,
        }
    }
}

impl fmt::Debug for ParsePayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsePayloadError")
            .field("message_name", &self.message_name)
            .field(
                "error",
                &format_parse_payload_error(&self.message_name, &self.serde_error),
            )
            .finish()
    }
}

impl fmt::Display for ParsePayloadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            format_parse_payload_error(&self.message_name, &self.serde_error)
        )
    }
}

impl From<ParsePayloadError> for String {
    fn from(err: ParsePayloadError) -> Self {
        err.to_string()
    }
}

impl From<ParsePayloadError> for JsValue {
    fn from(err: ParsePayloadError) -> Self {
        scrub_js_error_value(JsValue::from_str(&err.to_string()))
    }
}

fn format_parse_payload_error(
    message_name: &str,
    serde_error: &serde_wasm_bindgen::Error,
) -> String {
    // We rely on scrub_error_message to hide secrets.
    // We want the structural details (e.g. "invalid type: found integer") to remain.
    let message = format!("Invalid payload for {}: {}", message_name, serde_error);
    scrub_error_message(&message)
}

// Custom error type for KDF operations
#[derive(Debug)]
pub enum KdfError {
    JsonParseError(String),
    Base64DecodeError(String),
    InvalidClientData,
    MissingField(&'static str),
    HkdfError,
    InvalidOperationContext,
    InvalidInput(String),
    EncryptionError(String),
}

impl fmt::Display for KdfError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KdfError::JsonParseError(e) => write!(f, "JSON parse error: {}", e),
            KdfError::Base64DecodeError(e) => write!(f, "Base64 decode error: {}", e),
            KdfError::InvalidClientData => write!(f, "Invalid client data"),
            KdfError::MissingField(field) => write!(f, "Missing field: {}", field),
            KdfError::HkdfError => write!(f, "HKDF operation failed"),
            KdfError::InvalidOperationContext => write!(f, "Invalid operation context"),
            KdfError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
            KdfError::EncryptionError(e) => write!(f, "Encryption error: {}", e),
        }
    }
}

impl From<KdfError> for JsValue {
    fn from(err: KdfError) -> Self {
        scrub_js_error_value(JsValue::from_str(&err.to_string()))
    }
}

impl From<String> for KdfError {
    fn from(err: String) -> Self {
        KdfError::Base64DecodeError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::scrub_error_message;

    #[test]
    fn scrubs_plain_json_string_fields() {
        let input = r#"{"nearPrivateKey":"ed25519:SECRET","wrapKeySeed":"SEED","ok":true}"#;
        let scrubbed = scrub_error_message(input);
        assert!(scrubbed.contains(r#""nearPrivateKey":"[REDACTED]""#));
        assert!(scrubbed.contains(r#""wrapKeySeed":"[REDACTED]""#));
        assert!(scrubbed.contains(r#""ok":true"#));
        assert!(!scrubbed.contains("ed25519:SECRET"));
        assert!(!scrubbed.contains("SEED"));
    }

    #[test]
    fn scrubs_escaped_json_string_fields() {
        let input = r#"{\"nearPrivateKey\":\"ed25519:SECRET\",\"wrapKeySeed\":\"SEED\"}"#;
        let scrubbed = scrub_error_message(input);
        assert!(scrubbed.contains(r#"\"nearPrivateKey\":\"[REDACTED]\""#));
        assert!(scrubbed.contains(r#"\"wrapKeySeed\":\"[REDACTED]\""#));
        assert!(!scrubbed.contains("ed25519:SECRET"));
        assert!(!scrubbed.contains("SEED"));
    }

    #[test]
    fn scrubs_prf_first_second_when_prf_present() {
        let input = r#"{"prf":{"first":"AAA","second":"BBB"}}"#;
        let scrubbed = scrub_error_message(input);
        assert!(scrubbed.contains(r#""first":"[REDACTED]""#));
        assert!(scrubbed.contains(r#""second":"[REDACTED]""#));
        assert!(!scrubbed.contains(r#""first":"AAA""#));
        assert!(!scrubbed.contains(r#""second":"BBB""#));
    }
}
