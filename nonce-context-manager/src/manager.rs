use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use near_rpc_client::{Finality, NearRpcClient};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::NonceManagerError;

/// Nonce freshness window: a cached `nextNonce` derived from a
/// `view_access_key` call older than this is refetched.
pub const NONCE_FRESHNESS: Duration = Duration::from_secs(20);
/// Block-info freshness window: a cached block height/hash older than this
/// is refetched.
pub const BLOCK_FRESHNESS: Duration = Duration::from_secs(10);
/// Debounce window for the idle UI-hover/focus prefetch.
pub const IDLE_PREFETCH_DEBOUNCE: Duration = Duration::from_millis(150);

/// `{accountId, publicKey, chainNonce, txBlockHeight, txBlockHash,
/// fetchedAt}` per spec §3.
#[derive(Debug, Clone)]
pub struct AccessKeyCache {
    pub account_id: String,
    pub public_key: String,
    pub chain_nonce: u64,
    pub tx_block_height: u64,
    pub tx_block_hash: String,
    pub fetched_at: Instant,
}

/// The tx context a signing request needs: the nonce to assign and the
/// block hash/height to embed in the transaction.
#[derive(Debug, Clone)]
pub struct TxContext {
    pub next_nonce: u64,
    pub tx_block_height: u64,
    pub tx_block_hash: String,
}

struct State {
    access_key: Option<AccessKeyCache>,
    next_nonce: u64,
    last_reserved: Option<u64>,
    reserved: BTreeSet<u64>,
    nonce_fetched_at: Option<Instant>,
    block_fetched_at: Option<Instant>,
}

impl State {
    fn new() -> Self {
        Self {
            access_key: None,
            next_nonce: 0,
            last_reserved: None,
            reserved: BTreeSet::new(),
            nonce_fetched_at: None,
            block_fetched_at: None,
        }
    }

    fn nonce_fresh(&self) -> bool {
        self.nonce_fetched_at
            .is_some_and(|t| t.elapsed() < NONCE_FRESHNESS)
    }

    fn block_fresh(&self) -> bool {
        self.block_fetched_at
            .is_some_and(|t| t.elapsed() < BLOCK_FRESHNESS)
    }

    /// `nextNonce = max(chainNonce+1, lastReserved+1, cachedNext)`.
    fn recompute_next_nonce(&mut self, chain_nonce: u64) {
        let from_chain = chain_nonce + 1;
        let from_reserved = self.last_reserved.map(|n| n + 1).unwrap_or(0);
        self.next_nonce = self.next_nonce.max(from_chain).max(from_reserved);
    }
}

/// Per-user singleton holding the nonce/tx-context cache and the reserved
/// nonce set. One instance is created on login and destroyed on logout
/// (spec §9 "Global state").
pub struct NonceContextManager {
    rpc: NearRpcClient,
    account_id: String,
    public_key: String,
    state: Mutex<State>,
    drift_counter: AtomicU64,
    prefetch_generation: AtomicU64,
}

impl NonceContextManager {
    pub fn new(rpc: NearRpcClient, account_id: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            rpc,
            account_id: account_id.into(),
            public_key: public_key.into(),
            state: Mutex::new(State::new()),
            drift_counter: AtomicU64::new(0),
            prefetch_generation: AtomicU64::new(0),
        }
    }

    /// Count of chain-reconciliations that observed the chain nonce behind
    /// the cached value. Exposed so `relay-orchestrator`'s `/readyz` can
    /// surface repeated drift to operators (spec §9 Open Question).
    pub fn drift_counter(&self) -> u64 {
        self.drift_counter.load(Ordering::Relaxed)
    }

    /// Returns the cached `(nextNonce, blockHeight, blockHash)` if both the
    /// nonce and block windows are fresh; otherwise fetches both in
    /// parallel. Holding the state mutex across the await coalesces
    /// concurrent callers onto a single in-flight fetch.
    pub async fn get_nonce_block_hash_and_height(
        &self,
        force: bool,
    ) -> Result<TxContext, NonceManagerError> {
        let mut state = self.state.lock().await;

        if !force && state.nonce_fresh() && state.block_fresh() {
            if let Some(cached) = &state.access_key {
                return Ok(TxContext {
                    next_nonce: state.next_nonce,
                    tx_block_height: cached.tx_block_height,
                    tx_block_hash: cached.tx_block_hash.clone(),
                });
            }
        }

        let (access_key, block) = tokio::join!(
            self.rpc
                .view_access_key(&self.account_id, &self.public_key, Finality::Final),
            self.rpc.view_block(Finality::Final),
        );

        let access_key = access_key.map_err(|e| match e {
            near_rpc_client::RpcError::AccountMissing(m) => NonceManagerError::AccountMissing(m),
            other => NonceManagerError::Rpc(other),
        })?;
        let block = block?;

        let now = Instant::now();
        state.recompute_next_nonce(access_key.nonce);
        state.access_key = Some(AccessKeyCache {
            account_id: self.account_id.clone(),
            public_key: self.public_key.clone(),
            chain_nonce: access_key.nonce,
            tx_block_height: block.header.height,
            tx_block_hash: block.header.hash.clone(),
            fetched_at: now,
        });
        state.nonce_fetched_at = Some(now);
        state.block_fetched_at = Some(now);

        Ok(TxContext {
            next_nonce: state.next_nonce,
            tx_block_height: block.header.height,
            tx_block_hash: block.header.hash,
        })
    }

    /// Atomically allocates `n` successive nonce values starting at
    /// `max(nextNonce, lastReserved+1)`. Ensures a context has been fetched
    /// at least once first.
    pub async fn reserve_nonces(&self, n: usize) -> Result<Vec<u64>, NonceManagerError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        // Ensure we have a base to reserve from.
        self.get_nonce_block_hash_and_height(false).await?;

        let mut state = self.state.lock().await;
        let start = state
            .next_nonce
            .max(state.last_reserved.map(|n| n + 1).unwrap_or(0));

        let mut allocated = Vec::with_capacity(n);
        for offset in 0..n as u64 {
            let candidate = start + offset;
            if state.reserved.contains(&candidate) {
                return Err(NonceManagerError::NonceAlreadyReserved(candidate));
            }
            allocated.push(candidate);
        }

        for nonce in &allocated {
            state.reserved.insert(*nonce);
        }
        state.last_reserved = Some(start + n as u64 - 1);

        Ok(allocated)
    }

    /// Releases a single in-flight reservation (terminal failure/cancel
    /// path for one transaction in a batch).
    pub async fn release_nonce(&self, nonce: u64) {
        let mut state = self.state.lock().await;
        state.reserved.remove(&nonce);
    }

    /// Releases every outstanding reservation (terminal failure/cancel path
    /// for an entire request).
    pub async fn release_all_nonces(&self) {
        let mut state = self.state.lock().await;
        state.reserved.clear();
    }

    /// Reconciles the cache after a successful broadcast with the nonce
    /// that was actually used. Rereads the access key; tolerates the chain
    /// reporting a nonce behind `actual_nonce` (logs + counts drift, per
    /// spec §9, rather than failing).
    pub async fn update_nonce_from_blockchain(&self, actual_nonce: u64) -> Result<(), NonceManagerError> {
        let access_key = self
            .rpc
            .view_access_key(&self.account_id, &self.public_key, Finality::Final)
            .await
            .map_err(|e| match e {
                near_rpc_client::RpcError::AccountMissing(m) => NonceManagerError::AccountMissing(m),
                other => NonceManagerError::Rpc(other),
            })?;

        let mut state = self.state.lock().await;

        if access_key.nonce < actual_nonce {
            self.drift_counter.fetch_add(1, Ordering::Relaxed);
            warn!(
                chain_nonce = access_key.nonce,
                actual_nonce, "chain nonce is behind the nonce we just broadcast with"
            );
        }

        state.recompute_next_nonce(access_key.nonce);
        state.reserved.retain(|&n| n > access_key.nonce);

        if let Some(cached) = state.access_key.as_mut() {
            cached.chain_nonce = access_key.nonce;
            cached.fetched_at = Instant::now();
        }
        state.nonce_fetched_at = Some(Instant::now());

        Ok(())
    }

    /// Debounced (~150ms) idle prefetch for UI hover/focus: if called again
    /// before the delay elapses, the earlier call's fetch is skipped. Errors
    /// are swallowed — this is best-effort and must never block the UI
    /// path (spec §4.D).
    pub fn schedule_idle_prefetch(self: &Arc<Self>) {
        let generation = self.prefetch_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(IDLE_PREFETCH_DEBOUNCE).await;
            if this.prefetch_generation.load(Ordering::SeqCst) != generation {
                return; // superseded by a later call
            }
            if let Err(err) = this.get_nonce_block_hash_and_height(false).await {
                warn!(%err, "idle nonce prefetch failed, ignoring");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn manager_with_mock(server: &MockServer, chain_nonce: u64) -> NonceContextManager {
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "dontcare",
                "result": {
                    "nonce": chain_nonce,
                    "permission": "FullAccess",
                    "block_height": 100,
                    "block_hash": "abc",
                    "header": { "height": 100, "hash": "abc", "timestamp": 0 },
                },
            })))
            .mount(server)
            .await;

        let rpc = NearRpcClient::new(&server.uri()).unwrap();
        NonceContextManager::new(rpc, "alice.testnet", "ed25519:abc")
    }

    #[tokio::test]
    async fn reserve_nonces_yields_disjoint_increasing_ranges() {
        let server = MockServer::start().await;
        let manager = manager_with_mock(&server, 41).await;

        let first = manager.reserve_nonces(3).await.unwrap();
        assert_eq!(first, vec![42, 43, 44]);

        let second = manager.reserve_nonces(2).await.unwrap();
        assert_eq!(second, vec![45, 46]);
    }

    #[tokio::test]
    async fn release_nonce_frees_it_for_reuse_bookkeeping() {
        let server = MockServer::start().await;
        let manager = manager_with_mock(&server, 41).await;

        let reserved = manager.reserve_nonces(1).await.unwrap();
        assert_eq!(reserved, vec![42]);
        manager.release_nonce(42).await;

        let state = manager.state.lock().await;
        assert!(!state.reserved.contains(&42));
    }

    #[tokio::test]
    async fn update_nonce_from_blockchain_prunes_reservations_and_bumps_next() {
        let server = MockServer::start().await;
        let manager = manager_with_mock(&server, 41).await;

        manager.reserve_nonces(3).await.unwrap(); // 42,43,44

        // Chain now reports nonce 42 (first tx landed).
        Mock::given(method("POST")).and(path("/")).respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "dontcare",
                "result": { "nonce": 42, "permission": "FullAccess" },
            })),
        ).mount(&server).await;

        manager.update_nonce_from_blockchain(42).await.unwrap();

        let state = manager.state.lock().await;
        assert!(!state.reserved.contains(&42));
        assert!(state.reserved.contains(&43));
        assert!(state.reserved.contains(&44));
        assert!(state.next_nonce >= 43);
    }

    #[tokio::test]
    async fn drift_is_counted_when_chain_reports_behind() {
        let server = MockServer::start().await;
        let manager = manager_with_mock(&server, 41).await;

        Mock::given(method("POST")).and(path("/")).respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "dontcare",
                "result": { "nonce": 40, "permission": "FullAccess" },
            })),
        ).mount(&server).await;

        manager.update_nonce_from_blockchain(45).await.unwrap();
        assert_eq!(manager.drift_counter(), 1);
    }
}
