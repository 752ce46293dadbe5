use crate::error::PasskeyAdapterError;
use serde::{Deserialize, Serialize};

/// The two PRF evaluation inputs requested when creating/getting a
/// credential. `first` is always requested; `second` is optional and only
/// needed for flows that derive an Ed25519 signing seed (registration,
/// recovery) rather than just a ChaCha20 KEK (plain sign/decrypt).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrfInputs {
    pub first: Vec<u8>,
    pub second: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrfOutputs {
    pub first: Option<String>,
    pub second: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrfResults {
    pub results: PrfOutputs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientExtensionResults {
    pub prf: PrfResults,
}

impl ClientExtensionResults {
    /// Extract the required `first` PRF output, or `MissingPRF`.
    pub fn require_first(&self) -> Result<&str, PasskeyAdapterError> {
        self.prf
            .results
            .first
            .as_deref()
            .ok_or(PasskeyAdapterError::MissingPRF)
    }

    /// Extract the optional `second` PRF output (Ed25519 seed source).
    pub fn second(&self) -> Option<&str> {
        self.prf.results.second.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_first_succeeds_when_present() {
        let ext = ClientExtensionResults {
            prf: PrfResults {
                results: PrfOutputs {
                    first: Some("abc".to_string()),
                    second: None,
                },
            },
        };
        assert_eq!(ext.require_first().unwrap(), "abc");
        assert_eq!(ext.second(), None);
    }

    #[test]
    fn require_first_fails_when_absent() {
        let ext = ClientExtensionResults {
            prf: PrfResults {
                results: PrfOutputs {
                    first: None,
                    second: None,
                },
            },
        };
        assert_eq!(ext.require_first(), Err(PasskeyAdapterError::MissingPRF));
    }
}
