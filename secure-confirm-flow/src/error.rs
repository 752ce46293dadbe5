#[derive(Debug, thiserror::Error)]
pub enum SecureConfirmError {
    #[error("request type is not supported by the secure confirm flow")]
    Unsupported,
    #[error("nonce manager error: {0}")]
    Nonce(#[from] nonce_context_manager::NonceManagerError),
    #[error("near rpc error: {0}")]
    Rpc(#[from] near_rpc_client::RpcError),
    #[error("vrf challenge generation failed: {0}")]
    VrfChallengeFailed(String),
    #[error("user declined the confirmation")]
    UiRejected,
    #[error("confirmation UI timed out waiting for a decision")]
    UiTimeout,
    #[error("authenticator ceremony was cancelled")]
    CredentialCancelled,
    #[error("credential excluded: an authenticator for this device is already registered")]
    CredentialExcluded,
    #[error("authenticator ceremony failed: {0}")]
    CredentialFailed(String),
    #[error("worker handoff failed: {0}")]
    WorkerHandoffFailed(String),
    #[error("request {0} was cancelled")]
    Cancelled(String),
}
