use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::{parse_envelope, parse_typed_payload};
use crate::error::BridgeError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerConfig {
    pub url: String,
    pub initial_use_relayer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetConfigPayload {
    pub near_rpc_url: String,
    pub near_network: String,
    pub contract_id: String,
    pub near_explorer_url: Option<String>,
    pub signer_mode: Option<String>,
    pub relayer: Option<RelayerConfig>,
    pub rp_id_override: Option<String>,
    pub vrf_worker_configs: Option<Value>,
    pub authenticator_options: Option<Value>,
    pub assets_base_url: Option<String>,
    pub ui_registry: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub near_account_id: String,
    pub ui_mode: Option<String>,
    pub confirmation_config: Option<Value>,
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOnlyPayload {
    pub near_account_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOptions {
    pub signer_mode: Option<String>,
    pub confirmation_config: Option<Value>,
    pub confirmer_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTxsWithActionsPayload {
    pub near_account_id: String,
    pub transactions: Vec<Value>,
    #[serde(default)]
    pub options: SignOptions,
}

/// Spec §6.1: the same fields as `PM_SIGN_TXS_WITH_ACTIONS` plus `waitUntil`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaitUntil {
    None,
    Included,
    IncludedFinal,
    Executed,
    Final,
    ExecutedOptimistic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignAndSendTxsPayload {
    pub near_account_id: String,
    pub transactions: Vec<Value>,
    #[serde(default)]
    pub options: SignOptions,
    pub wait_until: WaitUntil,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionPayload {
    pub signed_transaction: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteActionPayload {
    pub near_account_id: String,
    pub receiver_id: String,
    pub action_args: Value,
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignDelegateActionPayload {
    pub near_account_id: String,
    pub delegate: Value,
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nep413Params {
    pub message: String,
    pub recipient: String,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignNep413Payload {
    pub near_account_id: String,
    pub params: Nep413Params,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportKeypairUiPayload {
    pub near_account_id: String,
    pub variant: String,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDeviceScannedQrPayload {
    pub qr_data: String,
    pub funding_amount: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDevice2LinkingPayload {
    pub ui: String,
    pub camera_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecoveryPayload {
    pub account_id: String,
    pub options: Option<Value>,
}

/// Every Parent→Wallet request type in spec §6.1, with the payload fields
/// the table lists. Unlike the signer worker's all-`Value` path-through
/// (that crate treats its payload as opaque until a handler needs it),
/// this crate types the full surface up front: the bridge's entire job is
/// routing these, so an unknown/malformed request must fail here rather
/// than downstream in a handler that never gets reached.
#[derive(Debug, Clone)]
pub enum ParentRequest {
    SetConfig { request_id: String, payload: SetConfigPayload },
    Register { request_id: String, payload: RegisterPayload },
    Login { request_id: String, payload: AccountOnlyPayload },
    Logout { request_id: String, payload: AccountOnlyPayload },
    GetLoginSession { request_id: String, payload: AccountOnlyPayload },
    SignTxsWithActions { request_id: String, payload: SignTxsWithActionsPayload },
    SignAndSendTxs { request_id: String, payload: SignAndSendTxsPayload },
    SendTransaction { request_id: String, payload: SendTransactionPayload },
    ExecuteAction { request_id: String, payload: ExecuteActionPayload },
    SignDelegateAction { request_id: String, payload: SignDelegateActionPayload },
    SignNep413 { request_id: String, payload: SignNep413Payload },
    ExportNearKeypairUi { request_id: String, payload: ExportKeypairUiPayload },
    SetConfirmBehavior { request_id: String, payload: Value },
    SetConfirmationConfig { request_id: String, payload: Value },
    GetConfirmationConfig { request_id: String, payload: Value },
    SetSignerMode { request_id: String, payload: Value },
    LinkDeviceWithScannedQrData { request_id: String, payload: LinkDeviceScannedQrPayload },
    StartDevice2LinkingFlow { request_id: String, payload: StartDevice2LinkingPayload },
    StartEmailRecovery { request_id: String, payload: EmailRecoveryPayload },
    FinalizeEmailRecovery { request_id: String, payload: EmailRecoveryPayload },
    StopEmailRecovery { request_id: String, payload: EmailRecoveryPayload },
    /// `requestId` is optional here only (spec §6.1: "without an id
    /// requests a best-effort global cancel").
    Cancel { request_id: Option<String> },
}

impl ParentRequest {
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ParentRequest::Cancel { request_id } => request_id.as_deref(),
            ParentRequest::SetConfig { request_id, .. }
            | ParentRequest::Register { request_id, .. }
            | ParentRequest::Login { request_id, .. }
            | ParentRequest::Logout { request_id, .. }
            | ParentRequest::GetLoginSession { request_id, .. }
            | ParentRequest::SignTxsWithActions { request_id, .. }
            | ParentRequest::SignAndSendTxs { request_id, .. }
            | ParentRequest::SendTransaction { request_id, .. }
            | ParentRequest::ExecuteAction { request_id, .. }
            | ParentRequest::SignDelegateAction { request_id, .. }
            | ParentRequest::SignNep413 { request_id, .. }
            | ParentRequest::ExportNearKeypairUi { request_id, .. }
            | ParentRequest::SetConfirmBehavior { request_id, .. }
            | ParentRequest::SetConfirmationConfig { request_id, .. }
            | ParentRequest::GetConfirmationConfig { request_id, .. }
            | ParentRequest::SetSignerMode { request_id, .. }
            | ParentRequest::LinkDeviceWithScannedQrData { request_id, .. }
            | ParentRequest::StartDevice2LinkingFlow { request_id, .. }
            | ParentRequest::StartEmailRecovery { request_id, .. }
            | ParentRequest::FinalizeEmailRecovery { request_id, .. }
            | ParentRequest::StopEmailRecovery { request_id, .. } => Some(request_id),
        }
    }
}

fn require_request_id(message_type: &str, request_id: Option<String>) -> Result<String, BridgeError> {
    request_id.ok_or_else(|| BridgeError::InvalidEnvelope(format!("{message_type}.requestId")))
}

/// Parses a raw JSON message into a typed `ParentRequest`, dispatching on
/// `type` exactly as `parse_worker_request_envelope` dispatches on the
/// signer worker's numeric request type, generalized to this bridge's
/// string-tagged wire format (spec §4.J/§6.1).
pub fn parse_parent_request(raw: &Value) -> Result<ParentRequest, BridgeError> {
    let env = parse_envelope(raw)?;
    let t = env.message_type.as_str();

    macro_rules! typed {
        ($variant:ident, $payload_ty:ty) => {{
            let request_id = require_request_id(t, env.request_id)?;
            let payload = parse_typed_payload::<$payload_ty>(&env.payload, t)?;
            Ok(ParentRequest::$variant { request_id, payload })
        }};
    }

    match t {
        "PM_SET_CONFIG" => typed!(SetConfig, SetConfigPayload),
        "PM_REGISTER" => typed!(Register, RegisterPayload),
        "PM_LOGIN" => typed!(Login, AccountOnlyPayload),
        "PM_LOGOUT" => typed!(Logout, AccountOnlyPayload),
        "PM_GET_LOGIN_SESSION" => typed!(GetLoginSession, AccountOnlyPayload),
        "PM_SIGN_TXS_WITH_ACTIONS" => typed!(SignTxsWithActions, SignTxsWithActionsPayload),
        "PM_SIGN_AND_SEND_TXS" => typed!(SignAndSendTxs, SignAndSendTxsPayload),
        "PM_SEND_TRANSACTION" => typed!(SendTransaction, SendTransactionPayload),
        "PM_EXECUTE_ACTION" => typed!(ExecuteAction, ExecuteActionPayload),
        "PM_SIGN_DELEGATE_ACTION" => typed!(SignDelegateAction, SignDelegateActionPayload),
        "PM_SIGN_NEP413" => typed!(SignNep413, SignNep413Payload),
        "PM_EXPORT_NEAR_KEYPAIR_UI" => typed!(ExportNearKeypairUi, ExportKeypairUiPayload),
        "PM_SET_CONFIRM_BEHAVIOR" => Ok(ParentRequest::SetConfirmBehavior {
            request_id: require_request_id(t, env.request_id)?,
            payload: env.payload,
        }),
        "PM_SET_CONFIRMATION_CONFIG" => Ok(ParentRequest::SetConfirmationConfig {
            request_id: require_request_id(t, env.request_id)?,
            payload: env.payload,
        }),
        "PM_GET_CONFIRMATION_CONFIG" => Ok(ParentRequest::GetConfirmationConfig {
            request_id: require_request_id(t, env.request_id)?,
            payload: env.payload,
        }),
        "PM_SET_SIGNER_MODE" => Ok(ParentRequest::SetSignerMode {
            request_id: require_request_id(t, env.request_id)?,
            payload: env.payload,
        }),
        "PM_LINK_DEVICE_WITH_SCANNED_QR_DATA" => {
            typed!(LinkDeviceWithScannedQrData, LinkDeviceScannedQrPayload)
        }
        "PM_START_DEVICE2_LINKING_FLOW" => typed!(StartDevice2LinkingFlow, StartDevice2LinkingPayload),
        "PM_START_EMAIL_RECOVERY" => typed!(StartEmailRecovery, EmailRecoveryPayload),
        "PM_FINALIZE_EMAIL_RECOVERY" => typed!(FinalizeEmailRecovery, EmailRecoveryPayload),
        "PM_STOP_EMAIL_RECOVERY" => typed!(StopEmailRecovery, EmailRecoveryPayload),
        "PM_CANCEL" => Ok(ParentRequest::Cancel { request_id: env.request_id }),
        other => Err(BridgeError::UnknownType(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_sign_and_send_txs_with_wait_until() {
        let raw = json!({
            "type": "PM_SIGN_AND_SEND_TXS",
            "requestId": "req-1",
            "payload": {
                "nearAccountId": "alice.testnet",
                "transactions": [{"receiverId": "bob.testnet", "actions": []}],
                "options": {"signerMode": "local"},
                "waitUntil": "FINAL",
            }
        });
        let parsed = parse_parent_request(&raw).unwrap();
        match parsed {
            ParentRequest::SignAndSendTxs { request_id, payload } => {
                assert_eq!(request_id, "req-1");
                assert_eq!(payload.wait_until, WaitUntil::Final);
                assert_eq!(payload.options.signer_mode.as_deref(), Some("local"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn cancel_without_request_id_is_a_global_cancel() {
        let raw = json!({"type": "PM_CANCEL"});
        let parsed = parse_parent_request(&raw).unwrap();
        assert!(matches!(parsed, ParentRequest::Cancel { request_id: None }));
    }

    #[test]
    fn cancel_with_request_id_targets_one_request() {
        let raw = json!({"type": "PM_CANCEL", "requestId": "req-1"});
        let parsed = parse_parent_request(&raw).unwrap();
        assert_eq!(parsed.request_id(), Some("req-1"));
    }

    #[test]
    fn missing_request_id_on_a_required_type_is_an_error() {
        let raw = json!({"type": "PM_LOGIN"});
        let err = parse_parent_request(&raw).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidEnvelope(_)));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let raw = json!({"type": "PM_DOES_NOT_EXIST", "requestId": "req-1"});
        let err = parse_parent_request(&raw).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownType(t) if t == "PM_DOES_NOT_EXIST"));
    }

    #[test]
    fn invalid_payload_names_the_message_type() {
        let raw = json!({"type": "PM_REGISTER", "requestId": "req-1", "payload": {}});
        let err = parse_parent_request(&raw).unwrap_err();
        match err {
            BridgeError::InvalidPayload { message_type, .. } => assert_eq!(message_type, "PM_REGISTER"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
