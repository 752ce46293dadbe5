#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("envelope missing required field: {0}")]
    InvalidEnvelope(String),
    #[error("unknown message type: {0}")]
    UnknownType(String),
    #[error("invalid payload for {message_type}: {source}")]
    InvalidPayload {
        message_type: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("message rejected: origin {0} is not in the allowlist")]
    OriginRejected(String),
    #[error("request {0} already has a terminal PM_RESULT")]
    DuplicateResult(String),
    #[error("no pending request with id {0}")]
    UnknownRequestId(String),
    #[error("request {0} was cancelled")]
    Cancelled(String),
}
