use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientError;
use crate::types::{BlockTag, CallRequest};

/// The node operations the relay depends on.
///
/// Implementations own their connection; the relay holds a client handle per
/// pipeline instance and never shares one through global state. No method
/// retries; a timeout, if any, belongs to the implementation.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Number of transactions sent from `address` as of `block`.
    async fn get_transaction_count(
        &self,
        address: Address,
        block: BlockTag,
    ) -> Result<u64, ClientError>;

    /// Current gas price in wei.
    async fn get_gas_price(&self) -> Result<u128, ClientError>;

    /// Gas the node expects `call` to use.
    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, ClientError>;

    /// Broadcasts an already-signed, `0x`-hex raw transaction and returns its
    /// hash.
    async fn send_signed_transaction(&self, raw_tx: &str) -> Result<String, ClientError>;

    /// Looks up a transaction by hash. `Ok(None)` means the node answered and
    /// does not know the transaction.
    async fn get_transaction(&self, tx_hash: &str) -> Result<Option<Value>, ClientError>;

    /// EIP-155 chain id of the connected network.
    async fn chain_id(&self) -> Result<u64, ClientError>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for Arc<T> {
    async fn get_transaction_count(
        &self,
        address: Address,
        block: BlockTag,
    ) -> Result<u64, ClientError> {
        (**self).get_transaction_count(address, block).await
    }

    async fn get_gas_price(&self) -> Result<u128, ClientError> {
        (**self).get_gas_price().await
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, ClientError> {
        (**self).estimate_gas(call).await
    }

    async fn send_signed_transaction(&self, raw_tx: &str) -> Result<String, ClientError> {
        (**self).send_signed_transaction(raw_tx).await
    }

    async fn get_transaction(&self, tx_hash: &str) -> Result<Option<Value>, ClientError> {
        (**self).get_transaction(tx_hash).await
    }

    async fn chain_id(&self) -> Result<u64, ClientError> {
        (**self).chain_id().await
    }
}
