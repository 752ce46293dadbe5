use crate::credential::{WebAuthnAuthenticationCredential, WebAuthnRegistrationCredential};
use crate::error::PasskeyAdapterError;
use crate::prf::{ClientExtensionResults, PrfOutputs, PrfResults};

/// Whether a serialized credential includes its PRF extension outputs.
/// Credentials forwarded to the NEAR contract (via the relay orchestrator)
/// use `Stripped`; credentials handed to the signer/VRF workers use
/// `Included`, since the worker needs the PRF bytes to derive key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrfVisibility {
    Included,
    Stripped,
}

fn stripped_extensions() -> ClientExtensionResults {
    ClientExtensionResults {
        prf: PrfResults {
            results: PrfOutputs {
                first: None,
                second: None,
            },
        },
    }
}

/// Serialize a registration credential to its stable on-wire JSON form.
pub fn serialize_registration(
    credential: &WebAuthnRegistrationCredential,
    visibility: PrfVisibility,
) -> Result<String, PasskeyAdapterError> {
    let value = match visibility {
        PrfVisibility::Included => credential.clone(),
        PrfVisibility::Stripped => WebAuthnRegistrationCredential {
            client_extension_results: stripped_extensions(),
            ..credential.clone()
        },
    };
    serde_json::to_string(&value).map_err(|e| PasskeyAdapterError::InvalidEncoding(e.to_string()))
}

/// Serialize an authentication credential to its stable on-wire JSON form.
pub fn serialize_authentication(
    credential: &WebAuthnAuthenticationCredential,
    visibility: PrfVisibility,
) -> Result<String, PasskeyAdapterError> {
    let value = match visibility {
        PrfVisibility::Included => credential.clone(),
        PrfVisibility::Stripped => WebAuthnAuthenticationCredential {
            client_extension_results: stripped_extensions(),
            ..credential.clone()
        },
    };
    serde_json::to_string(&value).map_err(|e| PasskeyAdapterError::InvalidEncoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{RegistrationResponse, WebAuthnAuthenticationResponse};

    fn sample_registration() -> WebAuthnRegistrationCredential {
        WebAuthnRegistrationCredential {
            id: "cred-id".to_string(),
            raw_id: "cred-raw-id".to_string(),
            response: RegistrationResponse {
                client_data_json: "client-data".to_string(),
                attestation_object: "attestation".to_string(),
                transports: Some(vec!["internal".to_string(), "hybrid".to_string()]),
            },
            authenticator_attachment: None,
            credential_type: "public-key".to_string(),
            client_extension_results: ClientExtensionResults {
                prf: PrfResults {
                    results: PrfOutputs {
                        first: Some("prf-first".to_string()),
                        second: Some("prf-second".to_string()),
                    },
                },
            },
        }
    }

    #[test]
    fn registration_round_trip_preserves_all_fields() {
        let original = sample_registration();
        let serialized = serialize_registration(&original, PrfVisibility::Included).unwrap();
        let restored: WebAuthnRegistrationCredential = serde_json::from_str(&serialized).unwrap();

        assert_eq!(restored.id, original.id);
        assert_eq!(restored.raw_id, original.raw_id);
        assert_eq!(
            restored.response.client_data_json,
            original.response.client_data_json
        );
        assert_eq!(
            restored.response.attestation_object,
            original.response.attestation_object
        );
        assert_eq!(restored.response.transports, original.response.transports);
        assert_eq!(
            restored.client_extension_results.prf.results.first,
            original.client_extension_results.prf.results.first
        );
        assert_eq!(
            restored.client_extension_results.prf.results.second,
            original.client_extension_results.prf.results.second
        );
    }

    #[test]
    fn stripped_variant_removes_prf_outputs() {
        let original = sample_registration();
        let serialized = serialize_registration(&original, PrfVisibility::Stripped).unwrap();
        assert!(!serialized.contains("prf-first"));
        assert!(!serialized.contains("prf-second"));
    }

    #[test]
    fn authentication_round_trip_preserves_fields() {
        let credential = WebAuthnAuthenticationCredential {
            id: "auth-id".to_string(),
            raw_id: "auth-raw-id".to_string(),
            response: WebAuthnAuthenticationResponse {
                client_data_json: "client-data".to_string(),
                authenticator_data: "auth-data".to_string(),
                signature: "sig".to_string(),
                user_handle: Some("handle".to_string()),
            },
            authenticator_attachment: None,
            credential_type: "public-key".to_string(),
            client_extension_results: ClientExtensionResults {
                prf: PrfResults {
                    results: PrfOutputs {
                        first: Some("prf-first".to_string()),
                        second: None,
                    },
                },
            },
        };
        let serialized = serialize_authentication(&credential, PrfVisibility::Included).unwrap();
        let restored: WebAuthnAuthenticationCredential =
            serde_json::from_str(&serialized).unwrap();
        assert_eq!(restored.response.signature, credential.response.signature);
        assert_eq!(
            restored.response.user_handle,
            credential.response.user_handle
        );
    }
}
