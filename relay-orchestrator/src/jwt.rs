//! Session credential issuance via injected `SignToken`/`VerifyToken` hooks.
//! The teacher's demo code hardcodes a JWT secret string and signs inline;
//! here that becomes a trait seam so a deployment can swap in its own KMS-
//! backed signer without this crate depending on a JWT library at all. The
//! default implementation is plain HS256 over `hmac`+`sha2`, matching the
//! only two crates the spec allows for this (no bundled JWT crate).

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_EXPIRY_SECS: u64 = 24 * 60 * 60;

pub trait SignToken: Send + Sync {
    fn sign(&self, claims: Value) -> Result<String, String>;
}

pub trait VerifyToken: Send + Sync {
    fn verify(&self, token: &str) -> Result<Value, String>;
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

/// HS256 session tokens with a configurable issuer/audience and a default
/// 24h expiry, applied only when the caller's claims don't already set
/// `exp`.
pub struct Hs256SessionTokens {
    secret: Vec<u8>,
    issuer: String,
    audience: String,
}

impl Hs256SessionTokens {
    pub fn new(secret: impl Into<Vec<u8>>, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Hs256SessionTokens {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("hmac accepts keys of any length")
    }
}

fn b64url_encode(bytes: &[u8]) -> String {
    wallet_codec::base64_url_encode(bytes)
}

fn b64url_decode(s: &str) -> Result<Vec<u8>, String> {
    wallet_codec::base64_url_decode(s).map_err(|e| e.to_string())
}

impl SignToken for Hs256SessionTokens {
    fn sign(&self, mut claims: Value) -> Result<String, String> {
        let obj = claims
            .as_object_mut()
            .ok_or_else(|| "claims must be a JSON object".to_string())?;
        obj.entry("iss").or_insert_with(|| self.issuer.clone().into());
        obj.entry("aud").or_insert_with(|| self.audience.clone().into());
        if !obj.contains_key("exp") {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| e.to_string())?
                .as_secs();
            obj.insert("exp".into(), (now + DEFAULT_EXPIRY_SECS).into());
        }

        let header = Header {
            alg: "HS256",
            typ: "JWT",
        };
        let header_b64 = b64url_encode(&serde_json::to_vec(&header).map_err(|e| e.to_string())?);
        let claims_b64 = b64url_encode(&serde_json::to_vec(&claims).map_err(|e| e.to_string())?);
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        let signature_b64 = b64url_encode(&mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature_b64}"))
    }
}

impl VerifyToken for Hs256SessionTokens {
    fn verify(&self, token: &str) -> Result<Value, String> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or("malformed token")?;
        let claims_b64 = parts.next().ok_or("malformed token")?;
        let signature_b64 = parts.next().ok_or("malformed token")?;
        if parts.next().is_some() {
            return Err("malformed token".into());
        }

        let signing_input = format!("{header_b64}.{claims_b64}");
        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        let expected = mac.finalize().into_bytes();
        let actual = b64url_decode(signature_b64)?;
        if actual.len() != expected.len() || !constant_time_eq(&actual, &expected) {
            return Err("signature mismatch".into());
        }

        let claims_bytes = b64url_decode(claims_b64)?;
        let claims: Value = serde_json::from_slice(&claims_bytes).map_err(|e| e.to_string())?;

        if let Some(exp) = claims.get("exp").and_then(Value::as_u64) {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| e.to_string())?
                .as_secs();
            if now >= exp {
                return Err("token expired".into());
            }
        }

        Ok(claims)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    wallet_codec::constant_time_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signed_token_verifies_and_round_trips_claims() {
        let tokens = Hs256SessionTokens::new(b"top-secret".to_vec(), "relay", "wallet");
        let token = tokens.sign(json!({ "sub": "alice.near" })).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims["sub"], "alice.near");
        assert_eq!(claims["iss"], "relay");
    }

    #[test]
    fn tampered_token_fails_verification() {
        let tokens = Hs256SessionTokens::new(b"top-secret".to_vec(), "relay", "wallet");
        let token = tokens.sign(json!({ "sub": "alice.near" })).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(tokens.verify(&tampered).is_err());
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let signer = Hs256SessionTokens::new(b"secret-a".to_vec(), "relay", "wallet");
        let verifier = Hs256SessionTokens::new(b"secret-b".to_vec(), "relay", "wallet");
        let token = signer.sign(json!({ "sub": "alice.near" })).unwrap();
        assert!(verifier.verify(&token).is_err());
    }
}
