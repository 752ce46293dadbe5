use std::sync::Arc;
use std::time::Duration;

use near_rpc_client::{Finality, NearRpcClient};
use nonce_context_manager::NonceContextManager;
use tracing::{info_span, warn, Instrument};

use crate::brokers::{CredentialBroker, UiBroker, VrfBroker, WorkerHandoff};
use crate::error::SecureConfirmError;
use crate::types::{
    RequestClass, SecureConfirmRequest, SerializedCredential, TxContext, VrfChallenge,
    WorkerHandoffEnvelope,
};

/// Popup/cross-process broker timeout (spec §4.G "Timeouts ... default to
/// 25 s").
pub const BROKER_TIMEOUT: Duration = Duration::from_secs(25);
/// `JITRefreshVRF` retry budget (spec §4.G step 5).
pub const JIT_REFRESH_ATTEMPTS: u32 = 3;
pub const JIT_REFRESH_BACKOFF: Duration = Duration::from_millis(150);

/// Everything the worker handoff needs besides the confirmation machinery
/// itself: where to get a PRF output for the chosen credential. In the
/// real wallet this is folded into the credential's PRF extension output;
/// kept as a separate extraction point here because this crate treats the
/// credential as opaque JSON (spec §4.B is a different crate).
pub trait PrfExtractor: Send + Sync {
    fn extract_prf_output_b64u(&self, credential: &SerializedCredential) -> Option<String>;
}

/// Orchestrates one request through the eight states of §4.G. Holds no
/// session state itself beyond its collaborators; a fresh flow is driven
/// per request.
pub struct SecureConfirmFlow<V, U, C, W, P> {
    pub nonce_manager: Arc<NonceContextManager>,
    /// Used instead of the nonce manager for `Registration`/`LinkDevice`
    /// requests, which predate the account having an access key on chain
    /// (spec §4.G step 2: "or, for pre-login flows, fetch a block
    /// directly").
    pub rpc: NearRpcClient,
    pub vrf: V,
    pub ui: U,
    pub credential: C,
    pub worker: W,
    pub prf: P,
    pub rp_id: String,
}

/// A minimal `{blockHeight, blockHash}` snapshot, the common subset the
/// nonce-manager-backed and direct-RPC-backed `FetchContext` paths both
/// produce.
struct ContextSnapshot {
    block_height: u64,
    block_hash: String,
}

impl<V, U, C, W, P> SecureConfirmFlow<V, U, C, W, P>
where
    V: VrfBroker,
    U: UiBroker,
    C: CredentialBroker,
    W: WorkerHandoff,
    P: PrfExtractor,
{
    pub async fn run(&self, request: SecureConfirmRequest) -> Result<serde_json::Value, SecureConfirmError> {
        let request_id = request.request_id().to_string();
        let span = info_span!("secure_confirm_flow", request_id = %request_id);
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(&self, request: SecureConfirmRequest) -> Result<serde_json::Value, SecureConfirmError> {
        // 1. Classify
        let class = request.classify();
        if class == RequestClass::Unsupported {
            return Err(SecureConfirmError::Unsupported);
        }

        // 2. FetchContext
        let reserved = match class {
            RequestClass::Signing => {
                let n = request.tx_count().max(1);
                self.nonce_manager.reserve_nonces(n).await?
            }
            _ => Vec::new(),
        };

        let outcome = self.run_after_context(&request, class, &reserved).await;

        // 8. Terminate
        match &outcome {
            Ok(_) => {}
            Err(_) => {
                if !reserved.is_empty() {
                    self.nonce_manager.release_all_nonces().await;
                }
            }
        }
        self.ui.close(request.request_id()).await;
        outcome
    }

    async fn fetch_context(&self, class: RequestClass, force: bool) -> Result<ContextSnapshot, SecureConfirmError> {
        match class {
            RequestClass::Registration => {
                let block = self.rpc.view_block(Finality::Final).await?;
                Ok(ContextSnapshot {
                    block_height: block.header.height,
                    block_hash: block.header.hash,
                })
            }
            _ => {
                let ctx = self.nonce_manager.get_nonce_block_hash_and_height(force).await?;
                Ok(ContextSnapshot {
                    block_height: ctx.tx_block_height,
                    block_hash: ctx.tx_block_hash,
                })
            }
        }
    }

    async fn run_after_context(
        &self,
        request: &SecureConfirmRequest,
        class: RequestClass,
        reserved: &[u64],
    ) -> Result<serde_json::Value, SecureConfirmError> {
        let ctx = self.fetch_context(class, false).await?;

        // 3. InitialVrfChallenge
        let mut vrf_challenge = match class {
            RequestClass::Registration => {
                self.vrf
                    .generate_vrf_keypair_bootstrap(
                        request.near_account_id(),
                        &self.rp_id,
                        ctx.block_height,
                        &ctx.block_hash,
                    )
                    .await?
            }
            _ => {
                self.vrf
                    .generate_vrf_challenge(
                        request.near_account_id(),
                        &self.rp_id,
                        ctx.block_height,
                        &ctx.block_hash,
                        None,
                    )
                    .await?
            }
        };

        // 4. RenderUI
        let config = request.confirmation_config();
        let decision = tokio::time::timeout(
            BROKER_TIMEOUT,
            self.ui.render(request.request_id(), class, None, vrf_challenge.intent_digest.as_deref(), &config),
        )
        .await
        .map_err(|_| SecureConfirmError::UiTimeout)??;
        if !decision {
            return Err(SecureConfirmError::UiRejected);
        }

        // 5. JITRefreshVRF
        let fresh_ctx = self.jit_refresh(request, class, &mut vrf_challenge).await?;

        // 6. CollectCredential
        let credential = self.collect_credential(request, class, &vrf_challenge).await?;

        // 7. HandoffToWorker
        let prf_output_b64u = self
            .prf
            .extract_prf_output_b64u(&credential)
            .unwrap_or_default();

        let envelope = WorkerHandoffEnvelope {
            request_id: request.request_id().to_string(),
            intent_digest: vrf_challenge.intent_digest.clone(),
            credential,
            prf_output_b64u,
            vrf_challenge,
            tx_context: TxContext {
                reserved_nonces: reserved.to_vec(),
                block_height: fresh_ctx.block_height,
                block_hash: fresh_ctx.block_hash,
            },
        };

        self.worker.handoff(envelope).await
    }

    async fn jit_refresh(
        &self,
        request: &SecureConfirmRequest,
        class: RequestClass,
        vrf_challenge: &mut VrfChallenge,
    ) -> Result<ContextSnapshot, SecureConfirmError> {
        let mut last_err = None;
        for attempt in 0..JIT_REFRESH_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(JIT_REFRESH_BACKOFF * attempt).await;
            }
            let ctx = match self.fetch_context(class, true).await {
                Ok(ctx) => ctx,
                Err(err) => {
                    last_err = Some(err);
                    continue;
                }
            };
            let refreshed = match class {
                RequestClass::Registration => {
                    self.vrf
                        .generate_vrf_keypair_bootstrap(
                            request.near_account_id(),
                            &self.rp_id,
                            ctx.block_height,
                            &ctx.block_hash,
                        )
                        .await
                }
                _ => {
                    self.vrf
                        .generate_vrf_challenge(
                            request.near_account_id(),
                            &self.rp_id,
                            ctx.block_height,
                            &ctx.block_hash,
                            vrf_challenge.intent_digest.as_deref(),
                        )
                        .await
                }
            };
            match refreshed {
                Ok(challenge) => {
                    *vrf_challenge = challenge;
                    self.ui.update_challenge(request.request_id(), vrf_challenge).await;
                    return Ok(ctx);
                }
                Err(err) => {
                    warn!(attempt, "jit vrf refresh attempt failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or(SecureConfirmError::VrfChallengeFailed("exhausted retries".into())))
    }

    async fn collect_credential(
        &self,
        request: &SecureConfirmRequest,
        class: RequestClass,
        vrf_challenge: &VrfChallenge,
    ) -> Result<SerializedCredential, SecureConfirmError> {
        match class {
            RequestClass::Registration => {
                let first = self
                    .credential
                    .create(request.near_account_id(), request.device_number(), vrf_challenge)
                    .await;
                match first {
                    Ok(cred) => Ok(cred),
                    Err(SecureConfirmError::CredentialExcluded) => {
                        self.credential
                            .create(
                                request.near_account_id(),
                                request.device_number() + 1,
                                vrf_challenge,
                            )
                            .await
                    }
                    Err(other) => Err(other),
                }
            }
            _ => {
                self.credential
                    .get(request.near_account_id(), request.device_number(), vrf_challenge)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConfirmBehavior, ConfirmationConfig, TransactionInput, UiMode};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StubVrf;
    #[async_trait]
    impl VrfBroker for StubVrf {
        async fn generate_vrf_challenge(
            &self,
            user_id: &str,
            rp_id: &str,
            block_height: u64,
            block_hash: &str,
            intent_digest: Option<&str>,
        ) -> Result<VrfChallenge, SecureConfirmError> {
            Ok(VrfChallenge {
                vrf_input: "input".into(),
                vrf_output: "output".into(),
                vrf_proof: "proof".into(),
                vrf_public_key: "pk".into(),
                user_id: user_id.into(),
                rp_id: rp_id.into(),
                block_height: block_height.to_string(),
                block_hash: block_hash.into(),
                intent_digest: intent_digest.map(str::to_string),
                session_policy_digest_32: None,
            })
        }

        async fn generate_vrf_keypair_bootstrap(
            &self,
            user_id: &str,
            rp_id: &str,
            block_height: u64,
            block_hash: &str,
        ) -> Result<VrfChallenge, SecureConfirmError> {
            self.generate_vrf_challenge(user_id, rp_id, block_height, block_hash, None)
                .await
        }
    }

    struct StubUi {
        decision: bool,
    }
    #[async_trait]
    impl UiBroker for StubUi {
        async fn render(
            &self,
            _request_id: &str,
            _class: RequestClass,
            _summary: Option<&crate::types::TransactionSummary>,
            _intent_digest: Option<&str>,
            _config: &ConfirmationConfig,
        ) -> Result<bool, SecureConfirmError> {
            Ok(self.decision)
        }

        async fn update_challenge(&self, _request_id: &str, _challenge: &VrfChallenge) {}

        async fn close(&self, _request_id: &str) {}
    }

    struct StubCredential {
        excluded_once: AtomicU32,
    }
    #[async_trait]
    impl CredentialBroker for StubCredential {
        async fn create(
            &self,
            _near_account_id: &str,
            device_number: u32,
            _vrf_challenge: &VrfChallenge,
        ) -> Result<SerializedCredential, SecureConfirmError> {
            if device_number == 1 && self.excluded_once.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(SecureConfirmError::CredentialExcluded);
            }
            Ok(SerializedCredential(json!({"rawId": "cred", "deviceNumber": device_number})))
        }

        async fn get(
            &self,
            _near_account_id: &str,
            _device_number: u32,
            _vrf_challenge: &VrfChallenge,
        ) -> Result<SerializedCredential, SecureConfirmError> {
            Ok(SerializedCredential(json!({"rawId": "cred"})))
        }
    }

    struct StubWorker;
    #[async_trait]
    impl WorkerHandoff for StubWorker {
        async fn handoff(
            &self,
            envelope: WorkerHandoffEnvelope,
        ) -> Result<serde_json::Value, SecureConfirmError> {
            Ok(json!({"requestId": envelope.request_id, "nonces": envelope.tx_context.reserved_nonces}))
        }
    }

    struct StubPrf;
    impl PrfExtractor for StubPrf {
        fn extract_prf_output_b64u(&self, _credential: &SerializedCredential) -> Option<String> {
            Some("prf-output".into())
        }
    }

    async fn mock_rpc() -> (MockServer, NearRpcClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "dontcare",
                "result": {
                    "nonce": 10,
                    "permission": "FullAccess",
                    "header": { "height": 100, "hash": "abc", "timestamp": 0 },
                },
            })))
            .mount(&server)
            .await;
        let rpc = NearRpcClient::new(&server.uri()).unwrap();
        (server, rpc)
    }

    fn sign_request(decision: bool) -> (SecureConfirmRequest, bool) {
        (
            SecureConfirmRequest::SignTransaction {
                request_id: "req-1".into(),
                near_account_id: "alice.testnet".into(),
                device_number: 0,
                transactions: vec![TransactionInput {
                    receiver_id: "bob.testnet".into(),
                    actions: vec![json!({"type": "Transfer", "deposit": "1"})],
                }],
                confirmation_config: ConfirmationConfig {
                    ui_mode: UiMode::Modal,
                    behavior: ConfirmBehavior::RequireClick,
                    auto_proceed_delay_ms: 0,
                },
            },
            decision,
        )
    }

    #[tokio::test]
    async fn happy_path_reserves_and_hands_off() {
        let (_server, rpc) = mock_rpc().await;
        let nonce_manager = Arc::new(NonceContextManager::new(rpc.clone(), "alice.testnet", "ed25519:abc"));

        let flow = SecureConfirmFlow {
            nonce_manager,
            rpc,
            vrf: StubVrf,
            ui: StubUi { decision: true },
            credential: StubCredential { excluded_once: AtomicU32::new(1) },
            worker: StubWorker,
            prf: StubPrf,
            rp_id: "example.near".into(),
        };

        let (request, _) = sign_request(true);
        let result = flow.run(request).await.unwrap();
        assert_eq!(result["nonces"], json!([11]));
    }

    #[tokio::test]
    async fn ui_rejection_releases_reserved_nonces() {
        let (_server, rpc) = mock_rpc().await;
        let nonce_manager = Arc::new(NonceContextManager::new(rpc.clone(), "alice.testnet", "ed25519:abc"));
        let nonce_manager_check = Arc::clone(&nonce_manager);

        let flow = SecureConfirmFlow {
            nonce_manager,
            rpc,
            vrf: StubVrf,
            ui: StubUi { decision: false },
            credential: StubCredential { excluded_once: AtomicU32::new(1) },
            worker: StubWorker,
            prf: StubPrf,
            rp_id: "example.near".into(),
        };

        let (request, _) = sign_request(false);
        let err = flow.run(request).await.unwrap_err();
        assert!(matches!(err, SecureConfirmError::UiRejected));

        // last_reserved is a monotonic high-water mark: a released nonce is
        // no longer outstanding but is never reissued, so the next
        // reservation starts past it rather than reusing 11.
        let reserved_again = nonce_manager_check.reserve_nonces(1).await.unwrap();
        assert_eq!(reserved_again, vec![12]);
    }

    #[tokio::test]
    async fn registration_excluded_credential_retries_with_next_device() {
        let (_server, rpc) = mock_rpc().await;
        let nonce_manager = Arc::new(NonceContextManager::new(rpc.clone(), "alice.testnet", "ed25519:abc"));

        let flow = SecureConfirmFlow {
            nonce_manager,
            rpc,
            vrf: StubVrf,
            ui: StubUi { decision: true },
            credential: StubCredential { excluded_once: AtomicU32::new(0) },
            worker: StubWorker,
            prf: StubPrf,
            rp_id: "example.near".into(),
        };

        let request = SecureConfirmRequest::RegisterAccount {
            request_id: "req-2".into(),
            near_account_id: "alice.testnet".into(),
            device_number: 1,
            confirmation_config: ConfirmationConfig::default(),
        };
        let result = flow.run(request).await.unwrap();
        assert_eq!(result["requestId"], json!("req-2"));
    }
}
