//! Single-writer transaction queue over the relayer's own account.
//!
//! The relayer signs every request with one key, so two concurrent
//! `createAccount` calls racing for the same nonce would otherwise corrupt
//! each other's transaction. [`RelayQueue`] reuses [`NonceContextManager`]
//! (already built for per-user nonce bookkeeping) for the relayer's own
//! account, and adds an `admin_tx_lock`-style `tokio::sync::Mutex` around
//! the reserve → build → sign → broadcast sequence so submissions are
//! strictly serialized end to end, not just nonce-disjoint — grounded in
//! the key pool's admin lock around scale-up batches, generalized here to a
//! single always-present key instead of a pool.

use std::sync::Arc;

use near_rpc_client::{NearRpcClient, SendTransactionWaitUntil};
use nonce_context_manager::NonceContextManager;
use tokio::sync::Mutex;

use crate::error::RelayError;
use crate::near_tx::{self, Action, AccountId, CryptoHash, PublicKey, Transaction};

pub struct RelayQueue {
    rpc: NearRpcClient,
    nonce_manager: Arc<NonceContextManager>,
    signing_key: ed25519_dalek::SigningKey,
    signer_id: String,
    admin_tx_lock: Mutex<()>,
}

impl RelayQueue {
    pub fn new(
        rpc: NearRpcClient,
        nonce_manager: Arc<NonceContextManager>,
        signing_key: ed25519_dalek::SigningKey,
        signer_id: String,
    ) -> Self {
        RelayQueue {
            rpc,
            nonce_manager,
            signing_key,
            signer_id,
            admin_tx_lock: Mutex::new(()),
        }
    }

    /// Chain-behind drift count from the relayer's own nonce manager,
    /// surfaced by `/readyz`.
    pub fn drift_counter(&self) -> u64 {
        self.nonce_manager.drift_counter()
    }

    /// Builds, signs, and submits a single transaction to `receiver_id`
    /// carrying `actions`, waiting for the relay's own reserved nonce and
    /// the relay's own lock so concurrent requests never interleave.
    pub async fn submit(
        &self,
        receiver_id: &str,
        actions: Vec<Action>,
        wait_until: SendTransactionWaitUntil,
    ) -> Result<near_rpc_client::SentTransaction, RelayError> {
        let _guard = self.admin_tx_lock.lock().await;

        let ctx = self.nonce_manager.get_nonce_block_hash_and_height(false).await?;
        let reserved = self.nonce_manager.reserve_nonces(1).await?;
        let nonce = reserved[0];

        let transaction = Transaction {
            signer_id: AccountId::new(self.signer_id.clone())
                .map_err(RelayError::InvalidInput)?,
            public_key: PublicKey::from_ed25519_bytes(self.signing_key.verifying_key().as_bytes()),
            nonce,
            receiver_id: AccountId::new(receiver_id)
                .map_err(RelayError::InvalidInput)?,
            block_hash: CryptoHash::from_base58(&ctx.tx_block_hash)
                .map_err(RelayError::InvalidInput)?,
            actions,
        };

        let signed = near_tx::sign_transaction(transaction, &self.signing_key);

        let result = self
            .rpc
            .send_transaction(&signed.to_borsh_bytes(), wait_until)
            .await;

        match result {
            Ok(sent) => {
                self.nonce_manager.update_nonce_from_blockchain(nonce).await?;
                Ok(sent)
            }
            Err(err) => {
                self.nonce_manager.release_nonce(nonce).await;
                Err(RelayError::from(err))
            }
        }
    }
}
