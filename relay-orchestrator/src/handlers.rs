use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use near_rpc_client::{Finality, SendTransactionWaitUntil};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::RelayError;
use crate::jwt::SignToken;
use crate::near_tx::{AccessKey, AccessKeyPermission, Action, FunctionCallAction, PublicKey};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub account_id: String,
    pub public_key: String,
    #[serde(default)]
    pub initial_balance: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `createAccount(accountId, publicKey, initialBalance)`: checks existence
/// via `viewAccount`, returning `AccountAlreadyExists` on a positive hit;
/// otherwise submits `CreateAccount + Transfer + AddKey(fullAccess)` on the
/// relayer's own account.
pub async fn create_account(
    State(state): State<SharedState>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<Json<CreateAccountResponse>, RelayError> {
    if req.account_id.is_empty() {
        return Err(RelayError::InvalidInput("accountId must not be empty".into()));
    }

    match state.rpc.view_account(&req.account_id, Finality::Final).await {
        Ok(_) => return Err(RelayError::AccountAlreadyExists(req.account_id)),
        Err(near_rpc_client::RpcError::AccountMissing(_)) => {}
        Err(other) => return Err(RelayError::from(other)),
    }

    let deposit: u128 = req
        .initial_balance
        .as_deref()
        .unwrap_or(&state.config.account_initial_balance.to_string())
        .parse()
        .map_err(|_| RelayError::InvalidInput("initialBalance must be a decimal yoctoNEAR string".into()))?;

    let new_public_key = PublicKey::from_near_str(&req.public_key)
        .map_err(RelayError::InvalidInput)?;

    let actions = vec![
        Action::CreateAccount,
        Action::Transfer { deposit },
        Action::AddKey {
            public_key: new_public_key,
            access_key: AccessKey {
                nonce: 0,
                permission: AccessKeyPermission::FullAccess,
            },
        },
    ];

    let sent = state
        .queue
        .submit(&req.account_id, actions, SendTransactionWaitUntil::Final)
        .await?;

    Ok(Json(CreateAccountResponse {
        success: true,
        transaction_hash: Some(sent.transaction.hash),
        error: None,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountAndRegisterUserRequest {
    pub new_account_id: String,
    pub new_public_key: String,
    pub vrf_data: Value,
    pub webauthn_registration: Value,
    pub deterministic_vrf_public_key: Value,
    #[serde(default)]
    pub authenticator_options: Value,
}

/// `createAccountAndRegisterUser`: an atomic `FunctionCall` into the
/// WebAuthn contract's registration method. Receipts are opaque to this
/// crate; failures surface as `RelayError::Rpc`/`AccountAlreadyExists` from
/// the RPC layer's own classification.
pub async fn create_account_and_register_user(
    State(state): State<SharedState>,
    Json(req): Json<CreateAccountAndRegisterUserRequest>,
) -> Result<Json<CreateAccountResponse>, RelayError> {
    if req.new_account_id.is_empty() || req.new_public_key.is_empty() {
        return Err(RelayError::InvalidInput(
            "newAccountId and newPublicKey are required".into(),
        ));
    }

    let args = serde_json::to_vec(&json!({
        "new_account_id": req.new_account_id,
        "new_public_key": req.new_public_key,
        "vrf_data": req.vrf_data,
        "webauthn_registration": req.webauthn_registration,
        "deterministic_vrf_public_key": req.deterministic_vrf_public_key,
        "authenticator_options": req.authenticator_options,
    }))
    .map_err(|e| RelayError::InvalidInput(e.to_string()))?;

    let actions = vec![Action::FunctionCall(Box::new(FunctionCallAction {
        method_name: "create_account_and_register_user".to_string(),
        args,
        gas: state.config.create_account_and_register_gas,
        deposit: 0,
    }))];

    let sent = state
        .queue
        .submit(&state.config.webauthn_contract_id, actions, SendTransactionWaitUntil::Final)
        .await?;

    Ok(Json(CreateAccountResponse {
        success: true,
        transaction_hash: Some(sent.transaction.hash),
        error: None,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyAuthenticationResponseRequest {
    pub session_kind: SessionKind,
    pub vrf_data: Value,
    pub webauthn_authentication: Value,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Jwt,
    Cookie,
}

#[derive(Debug, Serialize)]
pub struct VerifyAuthenticationResponseBody {
    pub success: bool,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
}

/// `verifyAuthenticationResponse`: calls the contract, and on success issues
/// a session credential through the injected `SignToken` hook — either as a
/// JSON `jwt` field or as an `HttpOnly` cookie, per `sessionKind`.
pub async fn verify_authentication_response(
    State(state): State<SharedState>,
    Json(req): Json<VerifyAuthenticationResponseRequest>,
) -> Result<Response, RelayError> {
    let args = serde_json::to_vec(&json!({
        "vrf_data": req.vrf_data,
        "webauthn_authentication": req.webauthn_authentication,
    }))
    .map_err(|e| RelayError::InvalidInput(e.to_string()))?;

    let result = state
        .rpc
        .call_function(&state.config.webauthn_contract_id, "verify_authentication_response", &args, Finality::Final)
        .await?;

    let verified = result
        .parsed()
        .get("verified")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if !verified {
        let body = Json(VerifyAuthenticationResponseBody {
            success: true,
            verified: false,
            jwt: None,
        });
        return Ok(body.into_response());
    }

    let token = state
        .sign_token()
        .sign(json!({ "sub": "webauthn-session" }))
        .map_err(RelayError::Token)?;

    match req.session_kind {
        SessionKind::Jwt => Ok(Json(VerifyAuthenticationResponseBody {
            success: true,
            verified: true,
            jwt: Some(token),
        })
        .into_response()),
        SessionKind::Cookie => {
            let same_site = if state.config.network_id == "mainnet" { "None" } else { "Lax" };
            let cookie = format!(
                "w3a_session={token}; HttpOnly; Secure; SameSite={same_site}; Path=/; Max-Age=86400"
            );
            let mut response = Json(VerifyAuthenticationResponseBody {
                success: true,
                verified: true,
                jwt: None,
            })
            .into_response();
            response.headers_mut().insert(
                header::SET_COOKIE,
                HeaderValue::from_str(&cookie).map_err(|e| RelayError::Token(e.to_string()))?,
            );
            Ok(response)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplyServerLockRequest {
    pub kek_c_b64u: String,
}

#[derive(Debug, Serialize)]
pub struct ApplyServerLockResponse {
    pub kek_cs_b64u: String,
}

pub async fn apply_server_lock(
    State(state): State<SharedState>,
    Json(req): Json<ApplyServerLockRequest>,
) -> Result<Json<ApplyServerLockResponse>, RelayError> {
    let kek_cs_b64u = crate::shamir::apply_server_lock(
        &state.shamir_keys.shamir,
        &state.shamir_keys.e_s,
        &req.kek_c_b64u,
    )?;
    Ok(Json(ApplyServerLockResponse { kek_cs_b64u }))
}

#[derive(Debug, Deserialize)]
pub struct RemoveServerLockRequest {
    pub kek_cs_b64u: String,
}

#[derive(Debug, Serialize)]
pub struct RemoveServerLockResponse {
    pub kek_c_b64u: String,
}

pub async fn remove_server_lock(
    State(state): State<SharedState>,
    Json(req): Json<RemoveServerLockRequest>,
) -> Result<Json<RemoveServerLockResponse>, RelayError> {
    let kek_c_b64u = crate::shamir::remove_server_lock(
        &state.shamir_keys.shamir,
        &state.shamir_keys.d_s,
        &req.kek_cs_b64u,
    )?;
    Ok(Json(RemoveServerLockResponse { kek_c_b64u }))
}

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct ReadyzResponse {
    pub ready: bool,
    pub nonce_drift_count: u64,
    pub shamir_configured: bool,
}

pub async fn readyz(State(state): State<SharedState>) -> Json<ReadyzResponse> {
    Json(ReadyzResponse {
        ready: true,
        nonce_drift_count: state.queue.drift_counter(),
        shamir_configured: !state.config.shamir_e_s_b64u.is_empty() && !state.config.shamir_d_s_b64u.is_empty(),
    })
}
