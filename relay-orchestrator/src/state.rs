use std::sync::Arc;

use near_rpc_client::NearRpcClient;
use num_bigint::BigUint;

use crate::config::Config;
use crate::jwt::{Hs256SessionTokens, SignToken, VerifyToken};
use crate::queue::RelayQueue;
use crate::shamir::Shamir3Pass;

pub struct ShamirServerKeys {
    pub shamir: Shamir3Pass,
    pub e_s: BigUint,
    pub d_s: BigUint,
}

pub struct AppState {
    pub config: Config,
    pub rpc: NearRpcClient,
    pub queue: RelayQueue,
    pub shamir_keys: ShamirServerKeys,
    pub tokens: Hs256SessionTokens,
}

impl AppState {
    pub fn sign_token(&self) -> &dyn SignToken {
        &self.tokens
    }

    pub fn verify_token(&self) -> &dyn VerifyToken {
        &self.tokens
    }
}

pub type SharedState = Arc<AppState>;
