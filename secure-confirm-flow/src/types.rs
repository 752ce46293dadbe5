use serde::{Deserialize, Serialize};

/// Mirrors `wasm_vrf_worker::types::VRFChallengeData`, plain-serde so this
/// crate never needs to link the wasm32 VRF worker to move a challenge
/// across an await boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VrfChallenge {
    pub vrf_input: String,
    pub vrf_output: String,
    pub vrf_proof: String,
    pub vrf_public_key: String,
    pub user_id: String,
    pub rp_id: String,
    pub block_height: String,
    pub block_hash: String,
    pub intent_digest: Option<String>,
    pub session_policy_digest_32: Option<String>,
}

/// Opaque serialized WebAuthn credential (rawId/clientDataJSON/authData/
/// signature/PRF outputs, already base64url per §4.B). Kept opaque here:
/// the credential adapter crate owns its shape, this crate only threads it
/// through to the worker handoff untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedCredential(pub serde_json::Value);

/// `{receiverId, actions[]}` — action bodies are left as opaque JSON; only
/// the pieces this state machine actually inspects (count, for nonce
/// reservation) are typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInput {
    pub receiver_id: String,
    pub actions: Vec<serde_json::Value>,
}

/// What `RenderUI` shows the user: a digest of the same payload the
/// worker will re-derive its own `intentDigest` from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub method: Option<String>,
    pub highlighted_args: serde_json::Value,
    pub total_yocto: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiMode {
    Skip,
    Modal,
    Drawer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmBehavior {
    RequireClick,
    AutoProceed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    pub ui_mode: UiMode,
    pub behavior: ConfirmBehavior,
    pub auto_proceed_delay_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            ui_mode: UiMode::Modal,
            behavior: ConfirmBehavior::RequireClick,
            auto_proceed_delay_ms: 0,
        }
    }
}

/// Tagged union the flow dispatches on (spec §3 `SecureConfirmRequest`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecureConfirmRequest {
    SignTransaction {
        request_id: String,
        near_account_id: String,
        device_number: u32,
        transactions: Vec<TransactionInput>,
        confirmation_config: ConfirmationConfig,
    },
    SignNep413Message {
        request_id: String,
        near_account_id: String,
        device_number: u32,
        message: String,
        recipient: String,
        confirmation_config: ConfirmationConfig,
    },
    RegisterAccount {
        request_id: String,
        near_account_id: String,
        device_number: u32,
        confirmation_config: ConfirmationConfig,
    },
    LinkDevice {
        request_id: String,
        near_account_id: String,
        device_number: u32,
        confirmation_config: ConfirmationConfig,
    },
    DecryptPrivateKeyWithPrf {
        request_id: String,
        near_account_id: String,
        device_number: u32,
    },
    ShowSecurePrivateKeyUi {
        request_id: String,
        near_account_id: String,
        device_number: u32,
    },
}

impl SecureConfirmRequest {
    pub fn request_id(&self) -> &str {
        match self {
            SecureConfirmRequest::SignTransaction { request_id, .. }
            | SecureConfirmRequest::SignNep413Message { request_id, .. }
            | SecureConfirmRequest::RegisterAccount { request_id, .. }
            | SecureConfirmRequest::LinkDevice { request_id, .. }
            | SecureConfirmRequest::DecryptPrivateKeyWithPrf { request_id, .. }
            | SecureConfirmRequest::ShowSecurePrivateKeyUi { request_id, .. } => request_id,
        }
    }

    pub fn near_account_id(&self) -> &str {
        match self {
            SecureConfirmRequest::SignTransaction { near_account_id, .. }
            | SecureConfirmRequest::SignNep413Message { near_account_id, .. }
            | SecureConfirmRequest::RegisterAccount { near_account_id, .. }
            | SecureConfirmRequest::LinkDevice { near_account_id, .. }
            | SecureConfirmRequest::DecryptPrivateKeyWithPrf { near_account_id, .. }
            | SecureConfirmRequest::ShowSecurePrivateKeyUi { near_account_id, .. } => near_account_id,
        }
    }

    pub fn device_number(&self) -> u32 {
        match self {
            SecureConfirmRequest::SignTransaction { device_number, .. }
            | SecureConfirmRequest::SignNep413Message { device_number, .. }
            | SecureConfirmRequest::RegisterAccount { device_number, .. }
            | SecureConfirmRequest::LinkDevice { device_number, .. }
            | SecureConfirmRequest::DecryptPrivateKeyWithPrf { device_number, .. }
            | SecureConfirmRequest::ShowSecurePrivateKeyUi { device_number, .. } => *device_number,
        }
    }

    pub fn confirmation_config(&self) -> ConfirmationConfig {
        match self {
            SecureConfirmRequest::SignTransaction { confirmation_config, .. }
            | SecureConfirmRequest::SignNep413Message { confirmation_config, .. }
            | SecureConfirmRequest::RegisterAccount { confirmation_config, .. }
            | SecureConfirmRequest::LinkDevice { confirmation_config, .. } => {
                confirmation_config.clone()
            }
            SecureConfirmRequest::DecryptPrivateKeyWithPrf { .. }
            | SecureConfirmRequest::ShowSecurePrivateKeyUi { .. } => ConfirmationConfig {
                ui_mode: UiMode::Skip,
                behavior: ConfirmBehavior::AutoProceed,
                auto_proceed_delay_ms: 0,
            },
        }
    }

    pub fn tx_count(&self) -> usize {
        match self {
            SecureConfirmRequest::SignTransaction { transactions, .. } => transactions.len(),
            _ => 0,
        }
    }
}

/// `Classify`'s output: which of the four lanes this request takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    LocalOnly,
    Registration,
    Signing,
    Unsupported,
}

impl SecureConfirmRequest {
    pub fn classify(&self) -> RequestClass {
        match self {
            SecureConfirmRequest::DecryptPrivateKeyWithPrf { .. }
            | SecureConfirmRequest::ShowSecurePrivateKeyUi { .. } => RequestClass::LocalOnly,
            SecureConfirmRequest::RegisterAccount { .. } | SecureConfirmRequest::LinkDevice { .. } => {
                RequestClass::Registration
            }
            SecureConfirmRequest::SignTransaction { .. } | SecureConfirmRequest::SignNep413Message { .. } => {
                RequestClass::Signing
            }
        }
    }
}

/// The tx context threaded from `FetchContext` through to `HandoffToWorker`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxContext {
    pub reserved_nonces: Vec<u64>,
    pub block_height: u64,
    pub block_hash: String,
}

/// `HandoffToWorker`'s sanitized payload: no functions, no live handles,
/// just values (spec §4.G step 7 / §4.J "functions and handles must not be
/// posted").
#[derive(Debug, Clone, Serialize)]
pub struct WorkerHandoffEnvelope {
    pub request_id: String,
    pub intent_digest: Option<String>,
    pub credential: SerializedCredential,
    pub prf_output_b64u: String,
    pub vrf_challenge: VrfChallenge,
    pub tx_context: TxContext,
}
