//! Little-endian/base64url BigUint helpers shared by the Shamir 3-pass
//! client (VRF worker) and server (relay orchestrator) implementations.

use base64ct::{Base64UrlUnpadded, Encoding};
use num_bigint::BigUint;

/// Encode a `BigUint` as big-endian bytes, base64url.
///
/// Matches the wire form the VRF worker and relay orchestrator exchange
/// for `kek_c_b64u` / `kek_cs_b64u` / `e_s_b64u` / `d_s_b64u`.
pub fn encode_biguint_b64u(value: &BigUint) -> String {
    Base64UrlUnpadded::encode_string(&value.to_bytes_be())
}

/// Decode a base64url string into a `BigUint` (big-endian).
pub fn decode_biguint_b64u(input: &str) -> Result<BigUint, super::CodecError> {
    let bytes = Base64UrlUnpadded::decode_vec(input)
        .map_err(|e| super::CodecError::InvalidEncoding(e.to_string()))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_base64url() {
        let value = BigUint::from(123456789u64);
        let encoded = encode_biguint_b64u(&value);
        assert_eq!(decode_biguint_b64u(&encoded).unwrap(), value);
    }

    #[test]
    fn zero_round_trips() {
        let value = BigUint::from(0u64);
        let encoded = encode_biguint_b64u(&value);
        assert_eq!(decode_biguint_b64u(&encoded).unwrap(), value);
    }
}
