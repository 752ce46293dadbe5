use serde::{Deserialize, Serialize};

/// Per-call signer mode. The specification's defaulting rule (§9): a
/// per-call `options.signerMode` overrides the session default, which
/// overrides the process default. This worker only ever signs locally —
/// the decrypted key never leaves this execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignerMode {
    #[serde(rename = "local-signer")]
    LocalSigner,
}

impl Default for SignerMode {
    fn default() -> Self {
        Self::LocalSigner
    }
}
