use ledger_client::BlockTag;
use serde::Deserialize;

use crate::error::RelayError;

/// Gas limit used when the caller gave none and estimation is disabled.
pub const DEFAULT_GAS_LIMIT: u64 = 750_000;

/// Pipeline settings. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayConfig {
    /// EIP-155 chain id. `None` asks the client on every call.
    pub chain_id: Option<u64>,
    /// Block the nonce lookup reads from.
    pub nonce_tag: BlockTag,
    /// Whether `build_and_send` asks the node for a gas estimate when the
    /// caller gave no gas limit.
    pub estimate_gas: bool,
    pub fallback_gas_limit: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chain_id: None,
            nonce_tag: BlockTag::Pending,
            estimate_gas: true,
            fallback_gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

impl RelayConfig {
    pub fn from_json_str(json: &str) -> Result<Self, RelayError> {
        serde_json::from_str(json).map_err(|e| RelayError::InvalidConfig(e.to_string()))
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}
