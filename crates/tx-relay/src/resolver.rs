//! Fills in the attributes of a legacy transaction, asking the ledger for
//! whatever the caller left out.
//!
//! | field     | when absent                                         |
//! |-----------|-----------------------------------------------------|
//! | nonce     | `get_transaction_count(from, config.nonce_tag)`     |
//! | gas price | `get_gas_price()`, never a constant                 |
//! | gas limit | `config.fallback_gas_limit` (estimate beforehand)   |
//! | chain id  | `config.chain_id`, else `chain_id()`                |

use alloy_primitives::{Address, Bytes, U256};
use chain_eth::TxAttributes;
use ledger_client::{CallRequest, LedgerClient};

use crate::config::RelayConfig;
use crate::error::RelayError;

/// Inputs to [`resolve_attributes`]. `None` means "look it up".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRequest {
    pub nonce: Option<u64>,
    pub from: Address,
    pub to: Address,
    /// Value in wei. Convert decimal amounts with `chain_eth::units` first.
    pub value: U256,
    pub data: Bytes,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
}

impl AttributeRequest {
    pub fn new(from: Address, to: Address, data: Bytes) -> Self {
        Self {
            nonce: None,
            from,
            to,
            value: U256::ZERO,
            data,
            gas_limit: None,
            gas_price: None,
        }
    }

    fn call_request(&self) -> CallRequest {
        CallRequest {
            from: self.from,
            to: self.to,
            value: self.value,
            input: self.data.clone(),
        }
    }
}

/// Asks the node how much gas the call needs.
///
/// A separate round trip from attribute resolution; feed the result into
/// [`AttributeRequest::gas_limit`]. A revert during estimation surfaces as a
/// rejection so the doomed transaction is never signed.
#[tracing::instrument(skip_all, fields(from = %request.from, to = %request.to))]
pub async fn estimate_gas_limit<C>(client: &C, request: &AttributeRequest) -> Result<u64, RelayError>
where
    C: LedgerClient + ?Sized,
{
    let gas = client.estimate_gas(&request.call_request()).await?;
    tracing::debug!(gas, "estimated gas");
    Ok(gas)
}

/// Resolves every attribute of the transaction, or fails without returning a
/// partially filled set.
#[tracing::instrument(skip_all, fields(from = %request.from, to = %request.to))]
pub async fn resolve_attributes<C>(
    client: &C,
    request: AttributeRequest,
    config: &RelayConfig,
) -> Result<TxAttributes, RelayError>
where
    C: LedgerClient + ?Sized,
{
    if request.data.is_empty() {
        return Err(RelayError::MissingAttribute("data"));
    }

    let nonce = match request.nonce {
        Some(nonce) => nonce,
        None => client
            .get_transaction_count(request.from, config.nonce_tag)
            .await
            .map_err(|source| RelayError::Resolution {
                field: "nonce",
                source,
            })?,
    };

    let gas_limit = request.gas_limit.unwrap_or(config.fallback_gas_limit);

    let gas_price = match request.gas_price {
        Some(price) => price,
        None => client
            .get_gas_price()
            .await
            .map_err(|source| RelayError::Resolution {
                field: "gasPrice",
                source,
            })?,
    };

    let chain_id = match config.chain_id {
        Some(id) => id,
        None => client
            .chain_id()
            .await
            .map_err(|source| RelayError::Resolution {
                field: "chainId",
                source,
            })?,
    };

    tracing::debug!(nonce, gas_limit, gas_price, chain_id, "resolved attributes");

    Ok(TxAttributes {
        nonce,
        gas_price,
        gas_limit,
        to: request.to,
        value: request.value,
        data: request.data,
        chain_id: Some(chain_id),
    })
}
