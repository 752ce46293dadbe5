/// Error taxonomy surfaced to callers per spec §7: `RpcTransient` covers
/// timeouts/empty bodies/connection failures that the caller (typically the
/// nonce manager) may retry; `RpcFatal` covers well-formed protocol errors
/// that retrying will not fix.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("near rpc request failed transiently: {0}")]
    Transient(String),
    #[error("near rpc returned a fatal error: {0}")]
    Fatal(String),
    #[error("near rpc account missing: {0}")]
    AccountMissing(String),
    #[error("failed to serialize rpc request: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid rpc url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl RpcError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RpcError::Transient(_))
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            RpcError::Transient(err.to_string())
        } else {
            RpcError::Fatal(err.to_string())
        }
    }
}
