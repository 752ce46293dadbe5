use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("account {0} already exists")]
    AccountAlreadyExists(String),
    #[error("account {0} does not exist")]
    AccountMissing(String),
    #[error("relayer account lacks balance for state")]
    LackBalanceForState,
    #[error("near rpc error: {0}")]
    Rpc(#[from] near_rpc_client::RpcError),
    #[error("nonce manager error: {0}")]
    Nonce(#[from] nonce_context_manager::NonceManagerError),
    #[error("shamir protocol error: {0}")]
    Shamir(#[from] crate::shamir::ShamirError),
    #[error("session token error: {0}")]
    Token(String),
    #[error("boot-time configuration error: {0}")]
    Config(String),
}

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RelayError::AccountAlreadyExists(_) => StatusCode::CONFLICT,
            RelayError::AccountMissing(_) => StatusCode::NOT_FOUND,
            RelayError::LackBalanceForState => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::Shamir(_) => StatusCode::BAD_REQUEST,
            RelayError::Token(_) => StatusCode::UNAUTHORIZED,
            RelayError::Rpc(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::Rpc(_) => StatusCode::BAD_GATEWAY,
            RelayError::Nonce(_) => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}
