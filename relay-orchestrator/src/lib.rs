//! Relay orchestrator: server-side queued account creation, atomic
//! WebAuthn registration, session issuance, and the server half of the
//! Shamir 3-pass VRF-key lock. One relayer key signs every transaction this
//! process submits, so [`queue::RelayQueue`] serializes submissions instead
//! of racing them over a shared nonce.

pub mod config;
pub mod error;
pub mod handlers;
pub mod jwt;
pub mod near_tx;
pub mod queue;
pub mod run;
pub mod shamir;
pub mod state;
