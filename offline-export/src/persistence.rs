use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OfflineExportError;

/// Mirrors spec §3 `KeyMaterialRecord`: one per `(account, deviceNumber)`,
/// encrypted with a key derived from the passkey PRF output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMaterialRecord {
    pub kind: String,
    pub near_account_id: String,
    pub device_number: u32,
    pub public_key: String,
    pub encrypted_sk: String,
    pub chacha20_nonce_b64u: String,
    pub wrap_key_salt: String,
    pub timestamp: u64,
}

/// The wallet-origin `users`/`nearKeys` persistence namespaces (spec §6.3),
/// as seen by the offline export route. Kept as an injected trait, the way
/// `secure-confirm-flow::brokers` injects its collaborators, so this crate
/// never needs an IndexedDB binding to be tested.
#[async_trait]
pub trait LocalAccountStore: Send + Sync {
    /// The account the route should preselect (spec §4.I "Reads last-used
    /// account from a local persistence store").
    async fn last_used_account(&self) -> Option<String>;

    /// Every locally known account id, for the "multiple local users"
    /// selection case.
    async fn list_accounts(&self) -> Vec<String>;

    async fn key_material(
        &self,
        near_account_id: &str,
        device_number: u32,
    ) -> Option<KeyMaterialRecord>;

    /// Last-write-wins per `(account, deviceNumber)` (spec §6.3 "All
    /// mutations are idempotent; last write wins per primary key").
    async fn rewrite_key_material(&self, record: KeyMaterialRecord) -> Result<(), OfflineExportError>;
}

/// Resolves which account the export route should operate on: the
/// last-used account if known, otherwise the sole local account, otherwise
/// an explicit caller selection among the listed accounts.
pub async fn resolve_account<S: LocalAccountStore + ?Sized>(
    store: &S,
    explicit_selection: Option<&str>,
) -> Result<String, OfflineExportError> {
    if let Some(selection) = explicit_selection {
        return Ok(selection.to_string());
    }
    if let Some(last_used) = store.last_used_account().await {
        return Ok(last_used);
    }
    let mut accounts = store.list_accounts().await;
    match accounts.len() {
        0 => Err(OfflineExportError::NoLocalAccounts),
        1 => Ok(accounts.remove(0)),
        _ => Err(OfflineExportError::NoLocalAccounts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    struct StubStore {
        last_used: Option<String>,
        accounts: Vec<String>,
        records: Mutex<HashMap<(String, u32), KeyMaterialRecord>>,
    }

    #[async_trait]
    impl LocalAccountStore for StubStore {
        async fn last_used_account(&self) -> Option<String> {
            self.last_used.clone()
        }

        async fn list_accounts(&self) -> Vec<String> {
            self.accounts.clone()
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

    #[tokio::test]
    async fn prefers_last_used_account() {
        let store = StubStore {
            last_used: Some("alice.testnet".into()),
            accounts: vec!["alice.testnet".into(), "bob.testnet".into()],
            records: Mutex::new(HashMap::new()),
        };
        assert_eq!(resolve_account(&store, None).await.unwrap(), "alice.testnet");
    }

    #[tokio::test]
    async fn falls_back_to_sole_local_account() {
        let store = StubStore {
            last_used: None,
            accounts: vec!["alice.testnet".into()],
            records: Mutex::new(HashMap::new()),
        };
        assert_eq!(resolve_account(&store, None).await.unwrap(), "alice.testnet");
    }

    #[tokio::test]
    async fn ambiguous_without_last_used_requires_explicit_selection() {
        let store = StubStore {
            last_used: None,
            accounts: vec!["alice.testnet".into(), "bob.testnet".into()],
            records: Mutex::new(HashMap::new()),
        };
        assert!(matches!(
            resolve_account(&store, None).await.unwrap_err(),
            OfflineExportError::NoLocalAccounts
        ));
        assert_eq!(
            resolve_account(&store, Some("bob.testnet")).await.unwrap(),
            "bob.testnet"
        );
    }
}
