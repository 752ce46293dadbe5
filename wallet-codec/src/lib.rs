//! Binary/base64url codec and small primitives shared by every crate in the
//! wallet signing engine: base64url transport encoding, fixed-width
//! little-endian integer helpers, constant-time secret comparison, and the
//! JSON secret-redaction helper used by worker/server error paths.

mod biguint;
mod constant_time;
mod encoding;
pub mod redact;

pub use biguint::{decode_biguint_b64u, encode_biguint_b64u};
pub use constant_time::constant_time_eq;
pub use encoding::{
    base64_standard_decode, base64_standard_encode, base64_url_decode, base64_url_encode,
    CodecError,
};
