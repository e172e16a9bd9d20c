use thiserror::Error;

/// Ethereum encoding and signing errors.
#[derive(Debug, Error)]
pub enum EthError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unsupported abi type: {0}")]
    UnsupportedType(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("argument count mismatch: expected {expected}, got {actual}")]
    ArgumentCountMismatch { expected: usize, actual: usize },

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("ambiguous function: {name} has {candidates} candidates")]
    AmbiguousFunction { name: String, candidates: usize },

    #[error("no constructor takes {0} arguments")]
    NoMatchingConstructor(usize),

    #[error("ambiguous constructor: {0} candidates take the same number of arguments")]
    AmbiguousConstructor(usize),

    #[error("invalid contract interface: {0}")]
    InvalidInterface(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("signing error: {0}")]
    SigningError(String),
}

impl From<crypto_utils::CryptoError> for EthError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        EthError::InvalidPrivateKey(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = EthError::InvalidAddress("bad checksum".into());
        assert_eq!(err.to_string(), "invalid address: bad checksum");
    }

    #[test]
    fn display_unsupported_type() {
        let err = EthError::UnsupportedType("uint7".into());
        assert_eq!(err.to_string(), "unsupported abi type: uint7");
    }

    #[test]
    fn display_argument_count_mismatch() {
        let err = EthError::ArgumentCountMismatch {
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "argument count mismatch: expected 2, got 1"
        );
    }

    #[test]
    fn display_ambiguous_function() {
        let err = EthError::AmbiguousFunction {
            name: "mint".into(),
            candidates: 2,
        };
        assert_eq!(err.to_string(), "ambiguous function: mint has 2 candidates");
    }

    #[test]
    fn display_no_matching_constructor() {
        let err = EthError::NoMatchingConstructor(3);
        assert_eq!(err.to_string(), "no constructor takes 3 arguments");
    }

    #[test]
    fn display_signing_error() {
        let err = EthError::SigningError("invalid signature".into());
        assert_eq!(err.to_string(), "signing error: invalid signature");
    }

    #[test]
    fn crypto_error_converts_to_invalid_private_key() {
        let err: EthError = crypto_utils::CryptoError::InvalidHex("odd".into()).into();
        assert!(matches!(err, EthError::InvalidPrivateKey(_)));
        assert_eq!(err.to_string(), "invalid private key: invalid hex: odd");
    }

    #[test]
    fn debug_format_works() {
        let err = EthError::NoMatchingConstructor(1);
        let debug = format!("{:?}", err);
        assert!(debug.contains("NoMatchingConstructor"));
    }
}
