//! Relay HTTP entrypoint.
//!
//! This binary launches an Axum-based server exposing gasless account
//! creation, atomic WebAuthn registration, session issuance, and the
//! server side of the Shamir 3-pass VRF-key lock.
//!
//! Endpoints:
//! - `POST /create_account`
//! - `POST /create_account_and_register_user`
//! - `POST /verify-authentication-response`
//! - `POST /apply-server-lock` / `POST /remove-server-lock`
//! - `GET /healthz`, `GET /readyz`
//!
//! Environment: `.env` values loaded at startup; see `config.rs` for the
//! full variable list.

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use near_rpc_client::NearRpcClient;
use nonce_context_manager::NonceContextManager;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::RelayError;
use crate::handlers;
use crate::jwt::Hs256SessionTokens;
use crate::queue::RelayQueue;
use crate::shamir::Shamir3Pass;
use crate::state::{AppState, ShamirServerKeys};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::load()?;
    let state = Arc::new(build_state(config)?);

    let cors = if let Some(origin) = state.config.expected_origin.clone() {
        CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>().map_err(|e| {
                Box::<dyn std::error::Error>::from(format!("invalid EXPECTED_ORIGIN: {e}"))
            })?)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(cors::Any)
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(cors::Any)
    };

    let app = Router::new()
        .route("/create_account", post(handlers::create_account))
        .route(
            "/create_account_and_register_user",
            post(handlers::create_account_and_register_user),
        )
        .route(
            "/verify-authentication-response",
            post(handlers::verify_authentication_response),
        )
        .route("/apply-server-lock", post(handlers::apply_server_lock))
        .route("/remove-server-lock", post(handlers::remove_server_lock))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state.clone());

    let addr = std::net::SocketAddr::new(state.config.host, state.config.port);
    tracing::info!(%addr, "starting relay orchestrator");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

fn build_state(config: Config) -> Result<AppState, RelayError> {
    let rpc = NearRpcClient::new(&config.near_rpc_url).map_err(RelayError::from)?;

    let relayer_public_key = format!(
        "ed25519:{}",
        bs58::encode(config.relayer_signing_key.0.verifying_key().as_bytes()).into_string()
    );
    let nonce_manager = Arc::new(NonceContextManager::new(
        rpc.clone(),
        config.relayer_account_id.clone(),
        relayer_public_key,
    ));

    let queue = RelayQueue::new(
        rpc.clone(),
        nonce_manager,
        config.relayer_signing_key.0.clone(),
        config.relayer_account_id.clone(),
    );

    let shamir = Shamir3Pass::new(&config.shamir_p_b64u)?;
    let e_s = wallet_codec::decode_biguint_b64u(&config.shamir_e_s_b64u)
        .map_err(|e| RelayError::Config(format!("invalid SHAMIR_E_S_B64U: {e}")))?;
    let d_s = wallet_codec::decode_biguint_b64u(&config.shamir_d_s_b64u)
        .map_err(|e| RelayError::Config(format!("invalid SHAMIR_D_S_B64U: {e}")))?;
    let shamir_keys = ShamirServerKeys { shamir, e_s, d_s };

    let tokens = Hs256SessionTokens::new(
        config.session_secret.clone().into_bytes(),
        "relay-orchestrator",
        config.expected_wallet_origin.clone().unwrap_or_default(),
    );

    if config.enable_rotation {
        tracing::info!("Shamir key rotation cron enabled but not scheduled in this process (operator-driven)");
    }

    Ok(AppState {
        config,
        rpc,
        queue,
        shamir_keys,
        tokens,
    })
}
