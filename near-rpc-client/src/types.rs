use serde::{Deserialize, Serialize};

/// Block reference finality, as accepted by NEAR's `block_id`/`finality`
/// query params.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finality {
    Optimistic,
    #[serde(rename = "near-final")]
    NearFinal,
    Final,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeaderView {
    pub height: u64,
    pub hash: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockView {
    pub header: BlockHeaderView,
}

/// `view_access_key` result: the access key's current nonce and (for full
/// access keys) permission, used by the nonce manager to seed
/// `AccessKeyCache.chainNonce`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessKeyView {
    pub nonce: u64,
    pub permission: serde_json::Value,
    #[serde(default)]
    pub block_height: u64,
    #[serde(default)]
    pub block_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessKeyInfoView {
    pub public_key: String,
    pub access_key: AccessKeyView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessKeyListView {
    pub keys: Vec<AccessKeyInfoView>,
}

/// `call_function` result: raw bytes plus logs. Per spec §4.C, callers get
/// bytes→UTF-8→`serde_json::from_str`, falling back to the trimmed raw
/// string on parse failure — `CallResult::parsed()` implements that.
#[derive(Debug, Clone, Deserialize)]
pub struct CallResult {
    pub result: Vec<u8>,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub block_height: u64,
}

impl CallResult {
    /// Decode `result` as UTF-8 then `serde_json::from_str`; on any failure,
    /// return the trimmed UTF-8 string instead (lossy if not valid UTF-8).
    pub fn parsed(&self) -> serde_json::Value {
        let text = String::from_utf8_lossy(&self.result);
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => serde_json::Value::String(text.trim().to_string()),
        }
    }
}

/// Outcome of `send_transaction`: the broadcast transaction's hash plus the
/// finality the RPC node reported at the `wait_until` the caller asked for.
#[derive(Debug, Clone, Deserialize)]
pub struct SentTransaction {
    pub transaction: SentTransactionInfo,
    #[serde(default)]
    pub status: serde_json::Value,
    #[serde(default)]
    pub final_execution_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentTransactionInfo {
    pub hash: String,
    #[serde(default)]
    pub nonce: u64,
}
