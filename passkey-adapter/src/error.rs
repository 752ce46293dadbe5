use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasskeyAdapterError {
    /// The authenticator's `clientExtensionResults.prf.results` was absent
    /// or the `first` evaluation output was missing. Per spec.md §4.B the
    /// PRF extension is required: without it there is no KEK source.
    MissingPRF,
    InvalidEncoding(String),
}

impl fmt::Display for PasskeyAdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasskeyAdapterError::MissingPRF => {
                write!(f, "WebAuthn PRF extension output missing (MissingPRF)")
            }
            PasskeyAdapterError::InvalidEncoding(msg) => write!(f, "invalid encoding: {msg}"),
        }
    }
}

impl std::error::Error for PasskeyAdapterError {}

impl From<wallet_codec::CodecError> for PasskeyAdapterError {
    fn from(err: wallet_codec::CodecError) -> Self {
        PasskeyAdapterError::InvalidEncoding(err.to_string())
    }
}
