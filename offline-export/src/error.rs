/// Error taxonomy for the offline export route (spec §7): `AssetMissingOffline`
/// is the SW fetch-miss case; the rest cover the passkey-assisted recovery
/// path (spec §4.I, scenario 5).
#[derive(Debug, thiserror::Error)]
pub enum OfflineExportError {
    #[error("offline asset not pre-cached: {0}")]
    AssetMissingOffline(String),
    #[error("no local key material for this account/device")]
    MissingKeyMaterial,
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("recovered public key does not match the stored public key for this device")]
    PublicKeyMismatch,
    #[error("no local accounts are persisted on this device")]
    NoLocalAccounts,
    #[error("authenticator ceremony failed: {0}")]
    AuthenticatorFailed(String),
    #[error("failed to persist recovered key material: {0}")]
    PersistenceFailed(String),
}
