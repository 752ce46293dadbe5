//! Passkey Credential Adapter (§4.B).
//!
//! Wraps the result of a WebAuthn `navigator.credentials.create()` /
//! `.get()` call (performed by the embedding JS/TS host — actual
//! authenticator interaction is out of scope, see spec.md Non-goals) and
//! provides:
//! - typed registration/authentication credential structs with PRF
//!   extension outputs,
//! - `serialize_registration` / `serialize_authentication`: stable,
//!   byte-for-byte on-wire serializers, with PRF-stripped and
//!   PRF-included variants,
//! - a `PrfInputs` request type describing the two PRF evaluation inputs
//!   (`first` for the ChaCha20 KEK source, `second` for the Ed25519 seed
//!   source).

mod credential;
mod error;
mod prf;
mod serialize;

pub use credential::{
    AuthenticatorAttachment, RegistrationResponse, WebAuthnAuthenticationCredential,
    WebAuthnAuthenticationResponse, WebAuthnRegistrationCredential,
};
pub use error::PasskeyAdapterError;
pub use prf::{ClientExtensionResults, PrfInputs, PrfOutputs, PrfResults};
pub use serialize::{serialize_authentication, serialize_registration, PrfVisibility};
