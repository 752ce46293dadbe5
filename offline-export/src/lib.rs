//! Offline Export Engine (spec §4.I).
//!
//! The real offline export route is a service-worker–cached HTML/JS bundle
//! served from the wallet origin (out of this workspace's language per
//! spec.md's Out-of-scope note on build/asset glue). This crate models the
//! *policy* that bundle runs on as a pure, testable Rust library:
//! - `manifest`: `precache.manifest.json` diffing and cache-key versioning.
//! - `cache`: the cache-only fetch resolution policy (hit / `/sdk/`
//!   fallback / 504 miss), against an injected `CacheStore`.
//! - `persistence`: the `users`/`nearKeys` local account/key-material
//!   lookup the route reads before decrypting.
//! - `recovery`: `DECRYPT_PRIVATE_KEY_WITH_PRF` via the standard confirm
//!   flow, falling through to passkey-assisted recovery on an AEAD
//!   decrypt mismatch or missing local key material.

mod cache;
mod error;
mod manifest;
mod persistence;
mod recovery;

pub use cache::{resolve_fetch, CacheStore, FetchOutcome, OFFLINE_EXPORT_PREFIX};
pub use error::OfflineExportError;
pub use manifest::{diff_manifests, ManifestDiff, ManifestEntry, PrecacheManifest};
pub use persistence::{resolve_account, KeyMaterialRecord, LocalAccountStore};
pub use recovery::{
    AuthenticatorBroker, OfflineExportFlow, RecoveredKeypair, SerializedCredential, SignerBroker,
};
