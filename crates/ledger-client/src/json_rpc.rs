use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::LedgerClient;
use crate::error::ClientError;
use crate::types::{BlockTag, CallRequest};

/// Connection settings for [`JsonRpcClient`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcConfig {
    /// HTTP endpoint of the node.
    pub url: String,
    /// Per-request timeout. A node that never answers fails the call after
    /// this long instead of blocking it forever.
    pub timeout_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// [`LedgerClient`] over Ethereum JSON-RPC on HTTP.
pub struct JsonRpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        tracing::debug!(method, id, "json-rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("{method} request failed: {e}")))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("{method} returned invalid JSON: {e}"))
        })?;

        extract_result(method, status.is_success(), body)
    }
}

/// Pulls `result` out of a JSON-RPC response body.
///
/// An `error` object wins over the HTTP status, since nodes disagree on which
/// status code accompanies a JSON-RPC error.
fn extract_result(method: &str, http_ok: bool, mut body: Value) -> Result<Value, ClientError> {
    if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| err.to_string());
        return Err(ClientError::Rpc { code, message });
    }
    if !http_ok {
        return Err(ClientError::Transport(format!(
            "{method} failed with HTTP error: {body}"
        )));
    }
    body.get_mut("result")
        .map(Value::take)
        .ok_or_else(|| ClientError::InvalidResponse(format!("{method} missing result field")))
}

fn quantity_str<'a>(method: &str, value: &'a Value) -> Result<&'a str, ClientError> {
    let s = value.as_str().ok_or_else(|| {
        ClientError::InvalidResponse(format!("{method} returned non-string: {value}"))
    })?;
    Ok(s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s))
}

fn parse_hex_u64(method: &str, value: &Value) -> Result<u64, ClientError> {
    let digits = quantity_str(method, value)?;
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| ClientError::InvalidResponse(format!("{method} invalid quantity {value}: {e}")))
}

fn parse_hex_u128(method: &str, value: &Value) -> Result<u128, ClientError> {
    let digits = quantity_str(method, value)?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| ClientError::InvalidResponse(format!("{method} invalid quantity {value}: {e}")))
}

#[async_trait]
impl LedgerClient for JsonRpcClient {
    async fn get_transaction_count(
        &self,
        address: Address,
        block: BlockTag,
    ) -> Result<u64, ClientError> {
        let method = "eth_getTransactionCount";
        let result = self
            .call(method, json!([format!("{address:#x}"), block.as_str()]))
            .await?;
        parse_hex_u64(method, &result)
    }

    async fn get_gas_price(&self) -> Result<u128, ClientError> {
        let method = "eth_gasPrice";
        let result = self.call(method, json!([])).await?;
        parse_hex_u128(method, &result)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, ClientError> {
        let method = "eth_estimateGas";
        let result = self.call(method, json!([call])).await?;
        parse_hex_u64(method, &result)
    }

    async fn send_signed_transaction(&self, raw_tx: &str) -> Result<String, ClientError> {
        let method = "eth_sendRawTransaction";
        let result = self.call(method, json!([raw_tx])).await?;
        result.as_str().map(ToOwned::to_owned).ok_or_else(|| {
            ClientError::InvalidResponse(format!("{method} returned non-string: {result}"))
        })
    }

    async fn get_transaction(&self, tx_hash: &str) -> Result<Option<Value>, ClientError> {
        let result = self
            .call("eth_getTransactionByHash", json!([tx_hash]))
            .await?;
        Ok((!result.is_null()).then_some(result))
    }

    async fn chain_id(&self) -> Result<u64, ClientError> {
        let method = "eth_chainId";
        let result = self.call(method, json!([])).await?;
        parse_hex_u64(method, &result)
    }
}
