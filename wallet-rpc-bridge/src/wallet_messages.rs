use serde::Serialize;
use serde_json::{json, Value};

use crate::envelope::PROTOCOL_VERSION;

/// `PM_RESULT{error}`'s shape (spec §7 error taxonomy: `code` is one of the
/// named error kinds, e.g. `"UserCancelled"`/`"IntentMismatch"`).
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}

/// Every Wallet→Parent message type (spec §6.1). Built as plain JSON via
/// `to_envelope` rather than a `#[serde(tag = "type")]` enum: the wire
/// format's `type` values (`"PM_RESULT"`, `"PREFERENCES_CHANGED"`, ...)
/// don't follow a single case-conversion rule from these variant names, and
/// a literal `{type, requestId?, payload?}` shape is what every consumer
/// (and `parent_messages::parse_envelope`) expects regardless of which
/// enum produced it.
#[derive(Debug, Clone)]
pub enum WalletMessage {
    Ready,
    Pong,
    Progress {
        request_id: String,
        step: u32,
        phase: String,
        status: String,
        message: Option<String>,
        data: Option<Value>,
    },
    PmResult {
        request_id: String,
        ok: bool,
        result: Option<Value>,
        error: Option<ErrorPayload>,
    },
    PreferencesChanged {
        near_account_id: String,
        confirmation_config: Value,
        signer_mode: String,
        updated_at: u64,
    },
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
}

impl WalletMessage {
    pub fn pm_result_ok(request_id: impl Into<String>, result: Value) -> Self {
        WalletMessage::PmResult {
            request_id: request_id.into(),
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn pm_result_err(request_id: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        WalletMessage::PmResult {
            request_id: request_id.into(),
            ok: false,
            result: None,
            error: Some(ErrorPayload { code: code.into(), message: message.into(), details: None }),
        }
    }

    /// Shorthand for the cancellation `PM_RESULT` invariant (spec §8
    /// "after `PM_CANCEL(requestId)`, any subsequent `PM_RESULT` for that
    /// id must have `ok:false, error:"UserCancelled"`").
    pub fn pm_result_cancelled(request_id: impl Into<String>) -> Self {
        Self::pm_result_err(request_id, "UserCancelled", "the request was cancelled")
    }

    pub fn to_envelope(&self) -> Value {
        match self {
            WalletMessage::Ready => json!({"type": "READY", "payload": {"protocolVersion": PROTOCOL_VERSION}}),
            WalletMessage::Pong => json!({"type": "PONG"}),
            WalletMessage::Progress { request_id, step, phase, status, message, data } => json!({
                "type": "PROGRESS",
                "requestId": request_id,
                "payload": {
                    "step": step,
                    "phase": phase,
                    "status": status,
                    "message": message,
                    "data": data,
                },
            }),
            WalletMessage::PmResult { request_id, ok, result, error } => json!({
                "type": "PM_RESULT",
                "requestId": request_id,
                "payload": {
                    "ok": ok,
                    "result": result,
                    "error": error.as_ref().map(|e| json!({
                        "code": e.code,
                        "message": e.message,
                        "details": e.details,
                    })),
                },
            }),
            WalletMessage::PreferencesChanged { near_account_id, confirmation_config, signer_mode, updated_at } => json!({
                "type": "PREFERENCES_CHANGED",
                "payload": {
                    "nearAccountId": near_account_id,
                    "confirmationConfig": confirmation_config,
                    "signerMode": signer_mode,
                    "updatedAt": updated_at,
                },
            }),
            WalletMessage::Error { code, message, details } => json!({
                "type": "ERROR",
                "payload": {"code": code, "message": message, "details": details},
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_carries_protocol_version() {
        let env = WalletMessage::Ready.to_envelope();
        assert_eq!(env["type"], "READY");
        assert_eq!(env["payload"]["protocolVersion"], "1.0.0");
    }

    #[test]
    fn pm_result_cancelled_matches_the_spec_invariant() {
        let env = WalletMessage::pm_result_cancelled("req-1").to_envelope();
        assert_eq!(env["type"], "PM_RESULT");
        assert_eq!(env["payload"]["ok"], false);
        assert_eq!(env["payload"]["error"]["code"], "UserCancelled");
    }
}
