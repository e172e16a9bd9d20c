use thiserror::Error;

/// Failures reported by a ledger client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The node could not be reached or did not answer in time.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object, e.g. a broadcast
    /// rejected with "nonce too low". Displays as the node's message.
    #[error("{message}")]
    Rpc { code: i64, message: String },

    /// The node answered with something that is not a valid response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Whether the node itself rejected the request (as opposed to the
    /// request never getting a well-formed answer).
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Rpc { .. })
    }
}
