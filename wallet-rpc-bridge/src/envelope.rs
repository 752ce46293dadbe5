use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::BridgeError;

/// Wire protocol version advertised in `READY` (spec §4.J/§6.1).
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// The outer shape every message shares: `{ type, requestId?, payload? }`
/// (spec §6.1). Extracted field-by-field rather than deserialized straight
/// into a tagged enum over the whole envelope, mirroring the teacher's
/// `wasm_signer_worker::types::worker_messages::parse_worker_request_envelope`:
/// that function reads `type`/`payload` individually via `Reflect::get`
/// specifically to avoid a fragile whole-value decode swallowing a
/// malformed envelope into an opaque error. Here the wasm/JsValue concern
/// doesn't apply, but the same discipline keeps the error message pointing
/// at which field was missing instead of "didn't match any enum variant".
#[derive(Debug, Clone)]
pub struct RawEnvelope {
    pub message_type: String,
    pub request_id: Option<String>,
    pub payload: Value,
}

pub fn parse_envelope(raw: &Value) -> Result<RawEnvelope, BridgeError> {
    let message_type = raw
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| BridgeError::InvalidEnvelope("type".into()))?
        .to_string();

    let request_id = raw
        .get("requestId")
        .and_then(Value::as_str)
        .map(str::to_string);

    let payload = raw.get("payload").cloned().unwrap_or(Value::Null);

    Ok(RawEnvelope { message_type, request_id, payload })
}

/// Deserializes a typed payload, naming the offending message type in the
/// error (same rationale as the signer worker's `ParsePayloadError`: the
/// type name is what a caller needs to find the bug, not a bare serde
/// path).
pub fn parse_typed_payload<T: DeserializeOwned>(
    payload: &Value,
    message_type: &str,
) -> Result<T, BridgeError> {
    serde_json::from_value(payload.clone()).map_err(|source| BridgeError::InvalidPayload {
        message_type: message_type.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_envelope() {
        let raw = json!({"type": "PM_REGISTER", "requestId": "req-1", "payload": {"nearAccountId": "alice.testnet"}});
        let env = parse_envelope(&raw).unwrap();
        assert_eq!(env.message_type, "PM_REGISTER");
        assert_eq!(env.request_id.as_deref(), Some("req-1"));
        assert_eq!(env.payload["nearAccountId"], "alice.testnet");
    }

    #[test]
    fn missing_type_is_invalid_envelope() {
        let raw = json!({"requestId": "req-1"});
        let err = parse_envelope(&raw).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidEnvelope(field) if field == "type"));
    }

    #[test]
    fn request_id_and_payload_are_optional() {
        let raw = json!({"type": "PM_CANCEL"});
        let env = parse_envelope(&raw).unwrap();
        assert_eq!(env.request_id, None);
        assert_eq!(env.payload, Value::Null);
    }
}
