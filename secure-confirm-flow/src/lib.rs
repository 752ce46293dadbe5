//! Secure confirmation state machine (spec §4.G).
//!
//! Drives a single request through `Classify → FetchContext →
//! InitialVrfChallenge → RenderUI → JITRefreshVRF → CollectCredential →
//! HandoffToWorker → Terminate`. The teacher keeps this orchestration in
//! TypeScript; it is rebuilt here as a typed state machine in the idiom of
//! the rest of this workspace — an explicit `match` over state,
//! `tokio::time::timeout` for broker waits, `tracing` spans per
//! transition — with the VRF worker, UI, authenticator, and signer worker
//! each reached through an injected trait (`brokers`) rather than linked
//! in directly, since those live across a wasm32/JS boundary this crate
//! does not cross.

mod brokers;
mod error;
mod state_machine;
mod types;

pub use brokers::{CredentialBroker, UiBroker, VrfBroker, WorkerHandoff};
pub use error::SecureConfirmError;
pub use state_machine::{
    PrfExtractor, SecureConfirmFlow, BROKER_TIMEOUT, JIT_REFRESH_ATTEMPTS, JIT_REFRESH_BACKOFF,
};
pub use types::{
    ConfirmBehavior, ConfirmationConfig, RequestClass, SecureConfirmRequest, SerializedCredential,
    TransactionInput, TransactionSummary, TxContext, UiMode, VrfChallenge, WorkerHandoffEnvelope,
};
