use alloy_primitives::{Address, Bytes, U256};
use serde::Serialize;

/// Block whose state a nonce lookup reads.
///
/// `Pending` counts transactions still in the node's pool, so back-to-back
/// sends from one account get consecutive nonces. `Latest` only counts mined
/// transactions and will reuse a nonce while an earlier send is pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    Latest,
    #[default]
    Pending,
}

impl BlockTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockTag::Latest => "latest",
            BlockTag::Pending => "pending",
        }
    }
}

/// A call used for gas estimation (`eth_estimateGas` parameters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    #[serde(rename = "data")]
    pub input: Bytes,
}
