use async_trait::async_trait;

use crate::error::SecureConfirmError;
use crate::types::{
    ConfirmationConfig, RequestClass, SerializedCredential, TransactionSummary, VrfChallenge,
};

/// The VRF worker, reached across the wasm32 boundary in the real wallet;
/// here it's an injected collaborator so this crate stays a plain native
/// async library with no wasm-bindgen in its dependency graph.
#[async_trait]
pub trait VrfBroker: Send + Sync {
    async fn generate_vrf_challenge(
        &self,
        user_id: &str,
        rp_id: &str,
        block_height: u64,
        block_hash: &str,
        intent_digest: Option<&str>,
    ) -> Result<VrfChallenge, SecureConfirmError>;

    async fn generate_vrf_keypair_bootstrap(
        &self,
        user_id: &str,
        rp_id: &str,
        block_height: u64,
        block_hash: &str,
    ) -> Result<VrfChallenge, SecureConfirmError>;
}

/// The on-screen confirmation surface (modal/drawer/skip). `render` drives
/// `RenderUI`'s decision; `update_challenge` pushes a live JIT-refreshed
/// challenge to an already-mounted UI; `close` tears it down on Terminate.
#[async_trait]
pub trait UiBroker: Send + Sync {
    async fn render(
        &self,
        request_id: &str,
        class: RequestClass,
        summary: Option<&TransactionSummary>,
        intent_digest: Option<&str>,
        config: &ConfirmationConfig,
    ) -> Result<bool, SecureConfirmError>;

    async fn update_challenge(&self, request_id: &str, challenge: &VrfChallenge);

    async fn close(&self, request_id: &str);
}

/// The WebAuthn authenticator ceremony (`navigator.credentials.create`/
/// `.get` in the browser).
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    async fn create(
        &self,
        near_account_id: &str,
        device_number: u32,
        vrf_challenge: &VrfChallenge,
    ) -> Result<SerializedCredential, SecureConfirmError>;

    async fn get(
        &self,
        near_account_id: &str,
        device_number: u32,
        vrf_challenge: &VrfChallenge,
    ) -> Result<SerializedCredential, SecureConfirmError>;
}

/// The signer worker's handoff endpoint. Returns the worker's raw JSON
/// response; this crate does not interpret it further.
#[async_trait]
pub trait WorkerHandoff: Send + Sync {
    async fn handoff(
        &self,
        envelope: crate::types::WorkerHandoffEnvelope,
    ) -> Result<serde_json::Value, SecureConfirmError>;
}
