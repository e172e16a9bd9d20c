use alloy_primitives::Address;
use chain_eth::EthError;
use ledger_client::ClientError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// The interface, method, arguments or encoding did not line up.
    #[error(transparent)]
    Eth(#[from] EthError),

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("sender {sender} does not match the signing key's address {derived}")]
    SenderMismatch { sender: Address, derived: Address },

    /// The ledger client failed or the node rejected the request. Displays
    /// as the client error itself, so a broadcast rejection reads exactly as
    /// the node reported it.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A client lookup needed to fill in a transaction attribute failed.
    #[error("failed to resolve {field}: {source}")]
    Resolution {
        field: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("missing transaction attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("invalid relay config: {0}")]
    InvalidConfig(String),
}

/// Coarse failure category carried in a failure [`crate::Envelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// Unknown member, wrong arity, unsupported type or bad argument value.
    AbiMismatch,
    /// The node could not be reached or answered garbage. Retrying the whole
    /// call may help.
    Transport,
    /// The node refused the request (nonce too low, insufficient funds,
    /// execution reverted).
    Rejected,
    /// The lookup worked but there is no such transaction.
    NotFound,
    /// Malformed key, or a key that does not belong to the sender.
    InvalidKey,
    /// A transaction attribute could not be resolved.
    Resolution,
}

impl RelayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RelayError::Eth(EthError::InvalidPrivateKey(_) | EthError::SigningError(_)) => {
                FailureKind::InvalidKey
            }
            RelayError::Eth(_) => FailureKind::AbiMismatch,
            RelayError::InvalidKey(_) | RelayError::SenderMismatch { .. } => {
                FailureKind::InvalidKey
            }
            RelayError::Client(e) if e.is_rejection() => FailureKind::Rejected,
            RelayError::Client(_) => FailureKind::Transport,
            RelayError::Resolution { .. }
            | RelayError::MissingAttribute(_)
            | RelayError::InvalidConfig(_) => FailureKind::Resolution,
            RelayError::TransactionNotFound(_) => FailureKind::NotFound,
        }
    }
}

impl From<crypto_utils::CryptoError> for RelayError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        RelayError::InvalidKey(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_rejection_displays_node_message() {
        let err = RelayError::from(ClientError::Rpc {
            code: -32000,
            message: "nonce too low".into(),
        });
        assert_eq!(err.to_string(), "nonce too low");
        assert_eq!(err.kind(), FailureKind::Rejected);
    }

    #[test]
    fn transport_and_not_found_are_distinct() {
        let transport = RelayError::from(ClientError::Transport("connection refused".into()));
        let missing = RelayError::TransactionNotFound("0xabc".into());
        assert_eq!(transport.kind(), FailureKind::Transport);
        assert_eq!(missing.kind(), FailureKind::NotFound);
        assert_eq!(missing.to_string(), "transaction not found: 0xabc");
    }

    #[test]
    fn abi_errors_are_mismatches() {
        let err = RelayError::from(EthError::UnknownFunction("frob".into()));
        assert_eq!(err.kind(), FailureKind::AbiMismatch);
        let err = RelayError::from(EthError::ArgumentCountMismatch {
            expected: 1,
            actual: 2,
        });
        assert_eq!(err.kind(), FailureKind::AbiMismatch);
    }

    #[test]
    fn key_errors_are_invalid_key() {
        let err = RelayError::from(crypto_utils::CryptoError::InvalidHex("zz".into()));
        assert_eq!(err.kind(), FailureKind::InvalidKey);
        let err = RelayError::from(EthError::InvalidPrivateKey("zero".into()));
        assert_eq!(err.kind(), FailureKind::InvalidKey);
    }

    #[test]
    fn resolution_failure_names_the_field() {
        let err = RelayError::Resolution {
            field: "nonce",
            source: ClientError::Transport("timed out".into()),
        };
        assert_eq!(err.to_string(), "failed to resolve nonce: transport error: timed out");
        assert_eq!(err.kind(), FailureKind::Resolution);
    }

    #[test]
    fn failure_kind_serializes_camel_case() {
        assert_eq!(
            serde_json::to_value(FailureKind::NotFound).unwrap(),
            serde_json::json!("notFound")
        );
        assert_eq!(
            serde_json::to_value(FailureKind::AbiMismatch).unwrap(),
            serde_json::json!("abiMismatch")
        );
    }
}
