//! Ethereum primitives for raw transaction submission.
//!
//! This crate provides:
//! - Contract ABI encoding for function calls and constructors (Keccak-256
//!   selectors, head/tail argument encoding)
//! - JSON contract interface parsing and argument-type lookup
//! - Address parsing with EIP-55 checksums
//! - Legacy transaction encoding and EIP-155 signing
//! - Exact decimal/smallest-unit amount conversion

pub mod abi;
pub mod address;
pub mod error;
pub mod interface;
pub mod transaction;
pub mod units;

pub use abi::{AbiType, AbiValue};
pub use error::EthError;
pub use interface::ContractInterface;
pub use transaction::{SignedTransaction, TxAttributes};
