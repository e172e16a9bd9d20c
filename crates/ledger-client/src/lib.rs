//! # ledger-client
//!
//! The node-facing side of the relay: the [`LedgerClient`] trait the pipeline
//! talks to, and [`JsonRpcClient`], an implementation over Ethereum JSON-RPC.

pub mod client;
pub mod error;
pub mod json_rpc;
pub mod types;

pub use client::LedgerClient;
pub use error::ClientError;
pub use json_rpc::{JsonRpcClient, RpcConfig};
pub use types::{BlockTag, CallRequest};
