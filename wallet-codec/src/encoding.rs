//! base64url (no padding) and standard base64 codecs.
//!
//! base64url is the wire form for WebAuthn and cryptographic material
//! throughout the wallet; standard base64 is used only where a downstream
//! consumer (NEAR RPC `args_base64`) expects it.

use base64ct::{Base64, Base64UrlUnpadded, Encoding};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    InvalidEncoding(String),
    LengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::InvalidEncoding(msg) => write!(f, "invalid encoding: {msg}"),
            CodecError::LengthMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {expected} bytes, got {actual}")
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Decode a base64url (unpadded) string.
pub fn base64_url_decode(input: &str) -> Result<Vec<u8>, CodecError> {
    Base64UrlUnpadded::decode_vec(input).map_err(|e| CodecError::InvalidEncoding(e.to_string()))
}

/// Encode bytes as base64url (unpadded).
pub fn base64_url_encode(data: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(data)
}

/// Decode a standard (padded) base64 string.
pub fn base64_standard_decode(input: &str) -> Result<Vec<u8>, CodecError> {
    Base64::decode_vec(input).map_err(|e| CodecError::InvalidEncoding(e.to_string()))
}

/// Encode bytes as standard (padded) base64.
pub fn base64_standard_encode(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Decode a base64url string into a fixed-size array, failing with
/// `LengthMismatch` if the decoded length doesn't match `N`.
pub fn base64_url_decode_fixed<const N: usize>(input: &str) -> Result<[u8; N], CodecError> {
    let bytes = base64_url_decode(input)?;
    if bytes.len() != N {
        return Err(CodecError::LengthMismatch {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_url_round_trip() {
        let data = b"Hello, World!";
        let encoded = base64_url_encode(data);
        assert_eq!(base64_url_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn base64_standard_round_trip() {
        let data = b"Hello, World!";
        let encoded = base64_standard_encode(data);
        assert_eq!(base64_standard_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        assert!(base64_url_decode("invalid!!!").is_err());
        assert!(base64_standard_decode("invalid!!!").is_err());
    }

    #[test]
    fn empty_string_decodes_to_empty_vec() {
        assert_eq!(base64_url_decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn fixed_length_decode_rejects_wrong_size() {
        let encoded = base64_url_encode(b"too short");
        let result: Result<[u8; 32], _> = base64_url_decode_fixed(&encoded);
        assert!(matches!(result, Err(CodecError::LengthMismatch { .. })));
    }
}
