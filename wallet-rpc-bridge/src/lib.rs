//! Cross-Origin Wallet RPC Bridge (spec §4.J).
//!
//! Typed parent↔wallet-iframe envelope: capability discovery (`READY` with
//! `protocolVersion`), exactly-once `PM_RESULT` matching against an
//! in-flight `PROGRESS` stream, `PM_CANCEL` semantics, sanitization of
//! function/handle fields before a payload reaches a worker, and origin
//! allowlisting in both directions.
//!
//! Grounded in the teacher's
//! `wasm_signer_worker::types::worker_messages::parse_worker_request_envelope`
//! idiom — manual field extraction instead of decoding the whole envelope
//! through one magic macro — generalized from a worker-internal envelope to
//! the full parent↔wallet-iframe envelope (spec §6.1).

mod envelope;
mod error;
mod origin;
mod parent_messages;
mod pending;
mod sanitize;
mod wallet_messages;

pub use envelope::{parse_envelope, parse_typed_payload, RawEnvelope, PROTOCOL_VERSION};
pub use error::BridgeError;
pub use origin::OriginAllowlist;
pub use parent_messages::{
    parse_parent_request, AccountOnlyPayload, EmailRecoveryPayload, ExecuteActionPayload,
    ExportKeypairUiPayload, LinkDeviceScannedQrPayload, Nep413Params, ParentRequest,
    RegisterPayload, RelayerConfig, SendTransactionPayload, SetConfigPayload,
    SignAndSendTxsPayload, SignDelegateActionPayload, SignNep413Payload, SignOptions,
    SignTxsWithActionsPayload, StartDevice2LinkingPayload, WaitUntil,
};
pub use pending::PendingRequestArena;
pub use sanitize::{sanitize_for_worker, RESERVED_HANDOFF_KEYS};
pub use wallet_messages::{ErrorPayload, WalletMessage};
