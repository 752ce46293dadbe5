use crate::prf::ClientExtensionResults;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthenticatorAttachment {
    Platform,
    CrossPlatform,
}

/// WebAuthn attestation response. `client_data_json` and
/// `attestation_object` stay base64url strings end to end: the NEAR
/// contract that ultimately consumes these (via the relay orchestrator)
/// decodes them itself, so they must never be decoded to bytes here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub client_data_json: String,
    pub attestation_object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebAuthnRegistrationCredential {
    pub id: String,
    pub raw_id: String,
    pub response: RegistrationResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<AuthenticatorAttachment>,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub client_extension_results: ClientExtensionResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebAuthnAuthenticationResponse {
    pub client_data_json: String,
    pub authenticator_data: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebAuthnAuthenticationCredential {
    pub id: String,
    pub raw_id: String,
    pub response: WebAuthnAuthenticationResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<AuthenticatorAttachment>,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub client_extension_results: ClientExtensionResults,
}
