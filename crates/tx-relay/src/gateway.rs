use ledger_client::LedgerClient;
use serde_json::Value;

use crate::error::RelayError;

/// Broadcasts an already-signed `0x` raw transaction and returns the hash the
/// node reports. No retries.
#[tracing::instrument(skip_all)]
pub async fn submit<C>(client: &C, raw_tx: &str) -> Result<String, RelayError>
where
    C: LedgerClient + ?Sized,
{
    match client.send_signed_transaction(raw_tx).await {
        Ok(tx_hash) => {
            tracing::info!(%tx_hash, "transaction submitted");
            Ok(tx_hash)
        }
        Err(err) => {
            tracing::warn!(error = %err, "broadcast failed");
            Err(err.into())
        }
    }
}

/// Looks up a transaction by hash.
///
/// A node that answers `null` yields [`RelayError::TransactionNotFound`];
/// a failed lookup yields [`RelayError::Client`].
#[tracing::instrument(skip(client))]
pub async fn fetch_transaction<C>(client: &C, tx_hash: &str) -> Result<Value, RelayError>
where
    C: LedgerClient + ?Sized,
{
    client
        .get_transaction(tx_hash)
        .await?
        .ok_or_else(|| RelayError::TransactionNotFound(tx_hash.to_string()))
}
