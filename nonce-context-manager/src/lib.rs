//! Nonce & Transaction Context Manager (spec §4.D).
//!
//! Per-user singleton caching `{accessKeyInfo, nextNonce, txBlockHeight,
//! txBlockHash}` plus a set of outstanding reservations. Freshness windows:
//! nonce 20s, block info 10s. The fetch path is coalesced by holding the
//! single `tokio::sync::Mutex` across the RPC await, so concurrent callers
//! queue behind one in-flight fetch instead of firing their own.
//!
//! Grounded in the pool-of-outstanding-allocations shape of
//! `onsocial-relayer`'s `key_pool::scaling` module (there: a pool of signer
//! keys scaled up/down under a single admin lock; here: a pool of nonce
//! values reserved/released under a single state lock), adapted from a
//! key-pool to a nonce-range pool.

mod error;
mod manager;

pub use error::NonceManagerError;
pub use manager::{AccessKeyCache, NonceContextManager, TxContext};
