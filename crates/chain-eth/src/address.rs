use alloy_primitives::Address;
use k256::ecdsa::VerifyingKey;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Parses a `0x`-prefixed address string.
///
/// All-lowercase and all-uppercase addresses are accepted as-is. Mixed-case
/// input is treated as EIP-55 and rejected when the checksum does not match,
/// since a wrong checksum usually means a mistyped address.
pub fn parse_address(address: &str) -> Result<Address, EthError> {
    let hex_part = strip_hex_prefix(address)?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    if !validate_address(address)? {
        return Err(EthError::InvalidAddress(format!(
            "checksum mismatch for {address}"
        )));
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(hex_part, &mut bytes)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;
    Ok(Address::from(bytes))
}

/// Derives the address controlled by a secp256k1 verifying key.
///
/// The address is the last 20 bytes of the Keccak-256 hash of the 64-byte
/// uncompressed public key (without the 0x04 prefix).
pub fn verifying_key_to_address(key: &VerifyingKey) -> Address {
    let uncompressed = key.to_encoded_point(false);
    let hash = Keccak256::digest(&uncompressed.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Derives an EIP-55 checksummed address from an uncompressed secp256k1
/// public key (65 bytes, starting with 0x04).
pub fn pubkey_to_eth_address(uncompressed_pubkey: &[u8; 65]) -> Result<String, EthError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);
    let addr_hex = hex::encode(&hash[12..]);
    checksum_address(&format!("0x{addr_hex}"))
}

/// Validates an Ethereum address string.
///
/// Checks the format (0x + 40 hex characters). If the address contains mixed
/// case, returns whether the EIP-55 checksum matches.
pub fn validate_address(address: &str) -> Result<bool, EthError> {
    let hex_part = strip_hex_prefix(address)?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());

    if is_all_lower || is_all_upper {
        return Ok(true);
    }

    let checksummed = checksum_address(&format!("0x{}", hex_part.to_lowercase()))?;
    Ok(checksummed[2..] == *hex_part)
}

/// Applies EIP-55 mixed-case checksum encoding to an address.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    let hex_part = strip_hex_prefix(address)?.to_lowercase();

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    // EIP-55: uppercase a letter when the matching hash nibble is >= 8.
    let hash = Keccak256::digest(hex_part.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");

    for (i, c) in hex_part.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    Ok(checksummed)
}

fn strip_hex_prefix(address: &str) -> Result<&str, EthError> {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))
}
