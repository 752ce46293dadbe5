use async_trait::async_trait;

use crate::error::OfflineExportError;
use crate::persistence::{KeyMaterialRecord, LocalAccountStore};

/// The signer worker's decrypted-or-recovered keypair, grounded on
/// `wallet_signer_worker::handlers::handle_recover_keypair_from_passkey`'s
/// `RecoverKeypairResult` (spec §4.E `DecryptPrivateKeyWithPrf`/the
/// recovery variant of `DeriveNearKeypairFromCosePrf`): the worker derives
/// the NEAR keypair straight from the Ed25519 PRF output, so the recovered
/// private key is available without a second decrypt round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredKeypair {
    pub public_key: String,
    pub private_key_near_format: String,
    pub encrypted_sk: String,
    pub chacha20_nonce_b64u: String,
    pub wrap_key_salt: String,
}

/// An opaque WebAuthn authentication credential, already PRF-included and
/// base64url-stable (spec §4.B); this crate never inspects its shape.
#[derive(Debug, Clone)]
pub struct SerializedCredential(pub serde_json::Value);

/// The signer worker's `DecryptPrivateKeyWithPrf` / recovery-variant
/// endpoints, reached across the wasm32 boundary in the real wallet.
/// Injected here the way `secure-confirm-flow::brokers::WorkerHandoff` is,
/// so this crate stays a plain native library.
#[async_trait]
pub trait SignerBroker: Send + Sync {
    async fn decrypt_private_key_with_prf(
        &self,
        record: &KeyMaterialRecord,
        prf_output_b64u: &str,
    ) -> Result<String, OfflineExportError>;

    async fn recover_keypair_from_passkey(
        &self,
        credential: &SerializedCredential,
    ) -> Result<RecoveredKeypair, OfflineExportError>;
}

/// The WebAuthn authenticator ceremony, run with a random VRF-independent
/// challenge for the recovery path (spec §4.I scenario 5: "runs an
/// authentication with a random VRF challenge").
#[async_trait]
pub trait AuthenticatorBroker: Send + Sync {
    async fn get_assertion_with_random_challenge(
        &self,
        near_account_id: &str,
        device_number: u32,
    ) -> Result<SerializedCredential, OfflineExportError>;
}

/// Orchestrates `DECRYPT_PRIVATE_KEY_WITH_PRF` through the standard confirm
/// flow with a local-only UI (spec §4.I), falling back to passkey-assisted
/// recovery when local key material is missing or fails to decrypt.
pub struct OfflineExportFlow<S, A, L> {
    pub signer: S,
    pub authenticator: A,
    pub store: L,
}

impl<S, A, L> OfflineExportFlow<S, A, L>
where
    S: SignerBroker,
    A: AuthenticatorBroker,
    L: LocalAccountStore,
{
    /// Returns the private key to display in the viewer drawer/modal.
    /// Attempts a local decrypt first; on `MissingKeyMaterial` or an AEAD
    /// decrypt mismatch, falls through to passkey-assisted recovery and
    /// rewrites the local record only if the recovered public key matches
    /// the existing one for this `(account, device)` (spec §4.I, scenario
    /// 5's exact invariant).
    pub async fn export_private_key(
        &self,
        near_account_id: &str,
        device_number: u32,
        prf_output_b64u: &str,
    ) -> Result<String, OfflineExportError> {
        let record = self
            .store
            .key_material(near_account_id, device_number)
            .await;

        match record {
            Some(record) => {
                match self
                    .signer
                    .decrypt_private_key_with_prf(&record, prf_output_b64u)
                    .await
                {
                    Ok(private_key) => Ok(private_key),
                    Err(OfflineExportError::DecryptionFailed(_)) => {
                        self.recover_and_rewrite(near_account_id, device_number, &record).await
                    }
                    Err(other) => Err(other),
                }
            }
            None => {
                // No stored record at all: recovery has no existing public
                // key to cross-check against, so the recovered keypair is
                // trusted and persisted outright.
                self.recover_and_persist(near_account_id, device_number).await
            }
        }
    }

    async fn recover_and_rewrite(
        &self,
        near_account_id: &str,
        device_number: u32,
        existing: &KeyMaterialRecord,
    ) -> Result<String, OfflineExportError> {
        let recovered = self.run_recovery(near_account_id, device_number).await?;

        if recovered.public_key != existing.public_key {
            return Err(OfflineExportError::PublicKeyMismatch);
        }

        let rewritten = KeyMaterialRecord {
            public_key: recovered.public_key.clone(),
            encrypted_sk: recovered.encrypted_sk.clone(),
            chacha20_nonce_b64u: recovered.chacha20_nonce_b64u.clone(),
            wrap_key_salt: recovered.wrap_key_salt.clone(),
            ..existing.clone()
        };
        self.store
            .rewrite_key_material(rewritten)
            .await
            .map_err(|e| OfflineExportError::PersistenceFailed(e.to_string()))?;

        Ok(recovered.private_key_near_format)
    }

    async fn recover_and_persist(
        &self,
        near_account_id: &str,
        device_number: u32,
    ) -> Result<String, OfflineExportError> {
        let recovered = self.run_recovery(near_account_id, device_number).await?;
        let record = KeyMaterialRecord {
            kind: "near-key".into(),
            near_account_id: near_account_id.to_string(),
            device_number,
            public_key: recovered.public_key.clone(),
            encrypted_sk: recovered.encrypted_sk.clone(),
            chacha20_nonce_b64u: recovered.chacha20_nonce_b64u.clone(),
            wrap_key_salt: recovered.wrap_key_salt.clone(),
            timestamp: 0,
        };
        self.store
            .rewrite_key_material(record)
            .await
            .map_err(|e| OfflineExportError::PersistenceFailed(e.to_string()))?;
        Ok(recovered.private_key_near_format)
    }

    async fn run_recovery(
        &self,
        near_account_id: &str,
        device_number: u32,
    ) -> Result<RecoveredKeypair, OfflineExportError> {
        let credential = self
            .authenticator
            .get_assertion_with_random_challenge(near_account_id, device_number)
            .await?;
        self.signer.recover_keypair_from_passkey(&credential).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    fn record(public_key: &str) -> KeyMaterialRecord {
        KeyMaterialRecord {
            kind: "near-key".into(),
            near_account_id: "alice.testnet".into(),
            device_number: 0,
            public_key: public_key.into(),
            encrypted_sk: "ciphertext".into(),
            chacha20_nonce_b64u: "nonce".into(),
            wrap_key_salt: "salt".into(),
            timestamp: 1,
        }
    }

    struct StubStore {
        records: Mutex<HashMap<(String, u32), KeyMaterialRecord>>,
    }

    #[async_trait]
    impl LocalAccountStore for StubStore {
        async fn last_used_account(&self) -> Option<String> {
            None
        }
        async fn list_accounts(&self) -> Vec<String> {
            vec![]
        }
        async fn key_material(&self, near_account_id: &str, device_number: u32) -> Option<KeyMaterialRecord> {
            self.records
                .lock()
                .await
                .get(&(near_account_id.to_string(), device_number))
                .cloned()
        }
        async fn rewrite_key_material(&self, record: KeyMaterialRecord) -> Result<(), OfflineExportError> {
            self.records
                .lock()
                .await
                .insert((record.near_account_id.clone(), record.device_number), record);
            Ok(())
        }
    }

    struct AeadMismatchSigner {
        recovered_public_key: String,
    }

    #[async_trait]
    impl SignerBroker for AeadMismatchSigner {
        async fn decrypt_private_key_with_prf(
            &self,
            _record: &KeyMaterialRecord,
            _prf_output_b64u: &str,
        ) -> Result<String, OfflineExportError> {
            Err(OfflineExportError::DecryptionFailed("aead tag mismatch".into()))
        }

        async fn recover_keypair_from_passkey(
            &self,
            _credential: &SerializedCredential,
        ) -> Result<RecoveredKeypair, OfflineExportError> {
            Ok(RecoveredKeypair {
                public_key: self.recovered_public_key.clone(),
                private_key_near_format: "ed25519:RECOVERED".into(),
                encrypted_sk: "new-ciphertext".into(),
                chacha20_nonce_b64u: "new-nonce".into(),
                wrap_key_salt: "new-salt".into(),
            })
        }
    }

    struct StubAuthenticator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AuthenticatorBroker for StubAuthenticator {
        async fn get_assertion_with_random_challenge(
            &self,
            _near_account_id: &str,
            _device_number: u32,
        ) -> Result<SerializedCredential, OfflineExportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SerializedCredential(serde_json::json!({"rawId": "cred"})))
        }
    }

    #[tokio::test]
    async fn aead_mismatch_recovers_and_rewrites_on_matching_public_key() {
        let mut records = HashMap::new();
        records.insert(
            ("alice.testnet".to_string(), 0),
            record("ed25519:SAME"),
        );
        let store = StubStore { records: Mutex::new(records) };
        let flow = OfflineExportFlow {
            signer: AeadMismatchSigner { recovered_public_key: "ed25519:SAME".into() },
            authenticator: StubAuthenticator { calls: AtomicUsize::new(0) },
            store,
        };

        let private_key = flow
            .export_private_key("alice.testnet", 0, "prf-first")
            .await
            .unwrap();
        assert_eq!(private_key, "ed25519:RECOVERED");

        let rewritten = flow.store.key_material("alice.testnet", 0).await.unwrap();
        assert_eq!(rewritten.encrypted_sk, "new-ciphertext");
        assert_eq!(flow.authenticator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn aead_mismatch_with_different_recovered_public_key_is_rejected() {
        let mut records = HashMap::new();
        records.insert(("alice.testnet".to_string(), 0), record("ed25519:ORIGINAL"));
        let store = StubStore { records: Mutex::new(records) };
        let flow = OfflineExportFlow {
            signer: AeadMismatchSigner { recovered_public_key: "ed25519:DIFFERENT".into() },
            authenticator: StubAuthenticator { calls: AtomicUsize::new(0) },
            store,
        };

        let err = flow
            .export_private_key("alice.testnet", 0, "prf-first")
            .await
            .unwrap_err();
        assert!(matches!(err, OfflineExportError::PublicKeyMismatch));

        // Must not rewrite the record on a mismatch.
        let untouched = flow.store.key_material("alice.testnet", 0).await.unwrap();
        assert_eq!(untouched.public_key, "ed25519:ORIGINAL");
    }

    #[tokio::test]
    async fn missing_key_material_errors_without_touching_authenticator() {
        let store = StubStore { records: Mutex::new(HashMap::new()) };
        struct UnreachableSigner;
        #[async_trait]
        impl SignerBroker for UnreachableSigner {
            async fn decrypt_private_key_with_prf(
                &self,
                _record: &KeyMaterialRecord,
                _prf_output_b64u: &str,
            ) -> Result<String, OfflineExportError> {
                unreachable!("no record should be present to decrypt")
            }
            async fn recover_keypair_from_passkey(
                &self,
                _credential: &SerializedCredential,
            ) -> Result<RecoveredKeypair, OfflineExportError> {
                Ok(RecoveredKeypair {
                    public_key: "ed25519:FRESH".into(),
                    private_key_near_format: "ed25519:FRESH_SK".into(),
                    encrypted_sk: "ciphertext".into(),
                    chacha20_nonce_b64u: "nonce".into(),
                    wrap_key_salt: "salt".into(),
                })
            }
        }

        let flow = OfflineExportFlow {
            signer: UnreachableSigner,
            authenticator: StubAuthenticator { calls: AtomicUsize::new(0) },
            store,
        };
        let private_key = flow
            .export_private_key("alice.testnet", 0, "prf-first")
            .await
            .unwrap();
        assert_eq!(private_key, "ed25519:FRESH_SK");
        assert_eq!(flow.authenticator.calls.load(Ordering::SeqCst), 1);
    }
}
