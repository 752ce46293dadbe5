#[derive(Debug, thiserror::Error)]
pub enum NonceManagerError {
    #[error("near rpc error: {0}")]
    Rpc(#[from] near_rpc_client::RpcError),
    #[error("account missing: {0}")]
    AccountMissing(String),
    #[error("nonce {0} already reserved")]
    NonceAlreadyReserved(u64),
    #[error("tx context is stale and caller did not opt in to a stale context")]
    Stale,
}
