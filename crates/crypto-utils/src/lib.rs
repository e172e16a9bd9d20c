//! # crypto-utils
//!
//! Private key handling for the transaction relay: hex parsing, zeroize-on-drop
//! storage and redacted formatting so key material never reaches a log line.

pub mod error;
pub mod private_key;
pub mod zeroizing;

pub use error::CryptoError;
pub use private_key::PrivateKey;
