use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::error::RpcError;
use crate::types::{AccessKeyListView, AccessKeyView, BlockView, CallResult, Finality};

/// `waitUntil` values accepted by `send_transaction`, per spec §6.1's
/// `PM_SIGN_AND_SEND_TXS.options.waitUntil`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendTransactionWaitUntil {
    None,
    Included,
    IncludedFinal,
    Executed,
    Final,
    ExecutedOptimistic,
}

impl SendTransactionWaitUntil {
    fn as_str(self) -> &'static str {
        match self {
            SendTransactionWaitUntil::None => "NONE",
            SendTransactionWaitUntil::Included => "INCLUDED",
            SendTransactionWaitUntil::IncludedFinal => "INCLUDED_FINAL",
            SendTransactionWaitUntil::Executed => "EXECUTED",
            SendTransactionWaitUntil::Final => "FINAL",
            SendTransactionWaitUntil::ExecutedOptimistic => "EXECUTED_OPTIMISTIC",
        }
    }
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Typed NEAR JSON-RPC client, grounded in
/// `silvestrpredko-near-client::rpc::client::RpcClient`'s request/response
/// envelope plumbing over `reqwest`.
#[derive(Clone)]
pub struct NearRpcClient {
    http: Client,
    url: Url,
}

impl NearRpcClient {
    pub fn new(rpc_url: &str) -> Result<Self, RpcError> {
        let url = Url::parse(rpc_url)?;
        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(RpcError::from_reqwest)?;
        Ok(Self { http, url })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: "dontcare",
            method,
            params,
        };

        let resp = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(RpcError::from_reqwest)?;

        if resp.status().is_server_error() {
            return Err(RpcError::Transient(format!(
                "near rpc returned {}",
                resp.status()
            )));
        }

        let bytes = resp.bytes().await.map_err(RpcError::from_reqwest)?;
        if bytes.is_empty() {
            return Err(RpcError::Transient("empty rpc response body".into()));
        }

        let parsed: JsonRpcResponse = serde_json::from_slice(&bytes)
            .map_err(|e| RpcError::Transient(format!("malformed rpc response: {e}")))?;

        match (parsed.result, parsed.error) {
            (Some(result), _) => extract_nested_error(result),
            (None, Some(error)) => Err(classify_rpc_error(&error)),
            (None, None) => Err(RpcError::Transient("rpc response had neither result nor error".into())),
        }
    }

    /// Generic `query` RPC call (the other `view_*` methods are thin
    /// wrappers around this with a typed `request_type`).
    pub async fn query(&self, request: Value) -> Result<Value, RpcError> {
        self.call("query", request).await
    }

    pub async fn view_access_key(
        &self,
        account_id: &str,
        public_key: &str,
        finality: Finality,
    ) -> Result<AccessKeyView, RpcError> {
        let result = self
            .query(json!({
                "request_type": "view_access_key",
                "finality": finality,
                "account_id": account_id,
                "public_key": public_key,
            }))
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::Fatal(format!("bad view_access_key response: {e}")))
    }

    pub async fn view_access_key_list(
        &self,
        account_id: &str,
        finality: Finality,
    ) -> Result<AccessKeyListView, RpcError> {
        let result = self
            .query(json!({
                "request_type": "view_access_key_list",
                "finality": finality,
                "account_id": account_id,
            }))
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::Fatal(format!("bad view_access_key_list response: {e}")))
    }

    pub async fn view_account(
        &self,
        account_id: &str,
        finality: Finality,
    ) -> Result<Value, RpcError> {
        let result = self
            .query(json!({
                "request_type": "view_account",
                "finality": finality,
                "account_id": account_id,
            }))
            .await;
        match result {
            Ok(v) => Ok(v),
            Err(RpcError::Fatal(msg)) if msg.contains("does not exist") => {
                Err(RpcError::AccountMissing(account_id.to_string()))
            }
            Err(other) => Err(other),
        }
    }

    pub async fn view_block(&self, finality: Finality) -> Result<BlockView, RpcError> {
        let result = self.call("block", json!({ "finality": finality })).await?;
        serde_json::from_value(result).map_err(|e| RpcError::Fatal(format!("bad block response: {e}")))
    }

    pub async fn call_function(
        &self,
        contract_id: &str,
        method_name: &str,
        args: &[u8],
        finality: Finality,
    ) -> Result<CallResult, RpcError> {
        use wallet_codec::base64_standard_encode;
        let result = self
            .query(json!({
                "request_type": "call_function",
                "finality": finality,
                "account_id": contract_id,
                "method_name": method_name,
                "args_base64": base64_standard_encode(args),
            }))
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::Fatal(format!("bad call_function response: {e}")))
    }

    /// Broadcasts a BORSH-encoded, already-signed transaction. Transport is
    /// opaque: the signer worker is the only component that understands the
    /// bytes' structure, this client just base64-encodes and posts them.
    pub async fn send_transaction(
        &self,
        signed_tx_borsh: &[u8],
        wait_until: SendTransactionWaitUntil,
    ) -> Result<crate::types::SentTransaction, RpcError> {
        use wallet_codec::base64_standard_encode;
        let result = self
            .call(
                "send_tx",
                json!({
                    "signed_tx_base64": base64_standard_encode(signed_tx_borsh),
                    "wait_until": wait_until.as_str(),
                }),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::Fatal(format!("bad send_tx response: {e}")))
    }
}

/// `query` responses that include an error in the result body itself
/// (`result.error`) instead of the top-level JSON-RPC `error` field — NEAR's
/// `UNKNOWN_ACCOUNT`/`UNKNOWN_ACCESS_KEY` shape.
fn extract_nested_error(result: Value) -> Result<Value, RpcError> {
    if let Some(error) = result.get("error").and_then(Value::as_str) {
        if error.contains("does not exist") {
            return Err(RpcError::AccountMissing(error.to_string()));
        }
        return Err(RpcError::Fatal(error.to_string()));
    }
    Ok(result)
}

fn classify_rpc_error(error: &Value) -> RpcError {
    let name = error.get("name").and_then(Value::as_str).unwrap_or("");
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown rpc error");
    match name {
        "TIMEOUT_ERROR" => RpcError::Transient(message.to_string()),
        "HANDLER_ERROR" => {
            let cause = error
                .get("cause")
                .and_then(|c| c.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("");
            if cause == "UNKNOWN_ACCOUNT" || cause == "UNKNOWN_ACCESS_KEY" {
                RpcError::AccountMissing(message.to_string())
            } else {
                RpcError::Fatal(message.to_string())
            }
        }
        _ => RpcError::Fatal(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn view_access_key_parses_nonce() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "dontcare",
                "result": {
                    "nonce": 41,
                    "permission": "FullAccess",
                    "block_height": 100,
                    "block_hash": "abc",
                },
            })))
            .mount(&server)
            .await;

        let client = NearRpcClient::new(&server.uri()).unwrap();
        let key = client
            .view_access_key("alice.testnet", "ed25519:abc", Finality::Final)
            .await
            .unwrap();
        assert_eq!(key.nonce, 41);
    }

    #[tokio::test]
    async fn account_missing_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "dontcare",
                "error": {
                    "name": "HANDLER_ERROR",
                    "cause": { "name": "UNKNOWN_ACCOUNT" },
                    "message": "account ghost.testnet does not exist",
                },
            })))
            .mount(&server)
            .await;

        let client = NearRpcClient::new(&server.uri()).unwrap();
        let err = client
            .view_access_key("ghost.testnet", "ed25519:abc", Finality::Final)
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::AccountMissing(_)));
    }

    #[tokio::test]
    async fn empty_body_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![], "application/json"))
            .mount(&server)
            .await;

        let client = NearRpcClient::new(&server.uri()).unwrap();
        let err = client.view_block(Finality::Final).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn call_result_falls_back_to_trimmed_string_on_invalid_json() {
        let result = CallResult {
            result: b"  not json  ".to_vec(),
            logs: vec![],
            block_height: 0,
        };
        assert_eq!(result.parsed(), Value::String("not json".to_string()));
    }

    #[test]
    fn call_result_parses_valid_json() {
        let result = CallResult {
            result: br#"{"ok":true}"#.to_vec(),
            logs: vec![],
            block_height: 0,
        };
        assert_eq!(result.parsed(), json!({"ok": true}));
    }
}
