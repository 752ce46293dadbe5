//! Typed NEAR JSON-RPC client.
//!
//! Mirrors `silvestrpredko-near-client::rpc::client::RpcClient`'s envelope
//! shape (`{jsonrpc, id, method, params}` request / `{result}` or `{error}`
//! tagged response) over `reqwest`, generalized to the method surface the
//! wallet signing engine needs: `query`, `view_access_key`,
//! `view_access_key_list`, `view_account`, `view_block`, `call_function`,
//! `send_transaction`.

mod client;
mod error;
mod types;

pub use client::{NearRpcClient, SendTransactionWaitUntil};
pub use error::RpcError;
pub use types::{
    AccessKeyListView, AccessKeyView, BlockView, CallResult, Finality, SentTransaction,
};
