//! Environment-driven configuration, in the shape of the facilitator's
//! `Config::load()`: a `clap` struct for the couple of CLI-overridable
//! knobs, everything else read straight from the process environment with
//! typed defaults.

use std::net::IpAddr;

use clap::Parser;
use ed25519_dalek::SigningKey;

use crate::error::RelayError;

const PLACEHOLDER_SESSION_SECRETS: &[&str] = &["demo-secret", "changeme", ""];

#[derive(Parser, Debug)]
#[command(name = "relay-orchestrator")]
#[command(about = "Queued NEAR account creation, atomic registration, and Shamir 3-pass relay")]
struct CliArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, env = "PORT", default_value_t = 3040)]
    port: u16,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,

    pub relayer_account_id: String,
    pub relayer_signing_key: SigningKeyConfig,
    pub webauthn_contract_id: String,
    pub near_rpc_url: String,
    pub network_id: String,
    pub account_initial_balance: u128,
    pub create_account_and_register_gas: u64,

    pub shamir_p_b64u: String,
    pub shamir_e_s_b64u: String,
    pub shamir_d_s_b64u: String,

    pub expected_origin: Option<String>,
    pub expected_wallet_origin: Option<String>,
    pub enable_rotation: bool,

    pub session_secret: String,
}

/// Wraps the parsed signing key so `Config` stays `Clone` + `Debug` without
/// leaking the key material in a derived `Debug` impl.
#[derive(Clone)]
pub struct SigningKeyConfig(pub SigningKey);

impl std::fmt::Debug for SigningKeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKeyConfig(..)")
    }
}

fn env_var(key: &str) -> Result<String, RelayError> {
    std::env::var(key).map_err(|_| RelayError::Config(format!("missing required env var {key}")))
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn load() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        let cli = CliArgs::parse();

        let relayer_account_id = env_var("RELAYER_ACCOUNT_ID")?;
        let relayer_private_key = env_var("RELAYER_PRIVATE_KEY")?;
        let relayer_signing_key = parse_ed25519_private_key(&relayer_private_key)?;

        let webauthn_contract_id = env_var("WEBAUTHN_CONTRACT_ID")?;
        let near_rpc_url = env_var("NEAR_RPC_URL")?;
        let network_id = env_var_or("NETWORK_ID", "testnet");

        let account_initial_balance = env_var_or("ACCOUNT_INITIAL_BALANCE", "40000000000000000000000")
            .parse()
            .map_err(|e| RelayError::Config(format!("invalid ACCOUNT_INITIAL_BALANCE: {e}")))?;
        let create_account_and_register_gas = env_var_or("CREATE_ACCOUNT_AND_REGISTER_GAS", "85000000000000")
            .parse()
            .map_err(|e| RelayError::Config(format!("invalid CREATE_ACCOUNT_AND_REGISTER_GAS: {e}")))?;

        let shamir_p_b64u = env_var_or("SHAMIR_P_B64U", crate::shamir::DEFAULT_SHAMIR_P_B64U);
        let shamir_e_s_b64u = env_var("SHAMIR_E_S_B64U")?;
        let shamir_d_s_b64u = env_var("SHAMIR_D_S_B64U")?;

        let expected_origin = std::env::var("EXPECTED_ORIGIN").ok();
        let expected_wallet_origin = std::env::var("EXPECTED_WALLET_ORIGIN").ok();
        let enable_rotation = env_var_or("ENABLE_ROTATION", "false")
            .parse()
            .unwrap_or(false);

        let session_secret = env_var_or("SESSION_JWT_SECRET", "demo-secret");
        if network_id == "mainnet" && PLACEHOLDER_SESSION_SECRETS.contains(&session_secret.as_str()) {
            return Err(RelayError::Config(
                "refusing to boot on mainnet with a placeholder SESSION_JWT_SECRET".into(),
            ));
        }

        Ok(Config {
            host: cli.host,
            port: cli.port,
            relayer_account_id,
            relayer_signing_key,
            webauthn_contract_id,
            near_rpc_url,
            network_id,
            account_initial_balance,
            create_account_and_register_gas,
            shamir_p_b64u,
            shamir_e_s_b64u,
            shamir_d_s_b64u,
            expected_origin,
            expected_wallet_origin,
            enable_rotation,
            session_secret,
        })
    }
}

fn parse_ed25519_private_key(raw: &str) -> Result<SigningKeyConfig, RelayError> {
    let encoded = raw.strip_prefix("ed25519:").ok_or_else(|| {
        RelayError::Config("RELAYER_PRIVATE_KEY must begin with \"ed25519:\"".into())
    })?;
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| RelayError::Config(format!("invalid base58 relayer private key: {e}")))?;
    // near-cli exports the 64-byte libsodium secret key (seed || public key);
    // only the first 32 bytes are the ed25519-dalek seed.
    let seed: [u8; 32] = bytes
        .get(..32)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| RelayError::Config("relayer private key must be at least 32 bytes".into()))?;
    Ok(SigningKeyConfig(SigningKey::from_bytes(&seed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_private_key_without_prefix() {
        let err = parse_ed25519_private_key("abcd").unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }
}
