use std::fmt;
use std::str::FromStr;

use k256::ecdsa::SigningKey;
use secrecy::{ExposeSecret, SecretString};

use crate::error::CryptoError;
use crate::zeroizing::SecretBytes;

/// Length of a secp256k1 private key in bytes.
pub const PRIVATE_KEY_LEN: usize = 32;

/// A validated secp256k1 private key.
///
/// The scalar is checked on construction (non-zero, below the curve order), so
/// a `PrivateKey` that exists can always produce a [`SigningKey`]. The bytes
/// are wiped on drop and never printed.
#[derive(Clone)]
pub struct PrivateKey(SecretBytes<PRIVATE_KEY_LEN>);

impl PrivateKey {
    /// Builds a key from raw big-endian scalar bytes.
    pub fn from_bytes(bytes: [u8; PRIVATE_KEY_LEN]) -> Result<Self, CryptoError> {
        let secret = SecretBytes::new(bytes);
        SigningKey::from_bytes(secret.expose().into())
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self(secret))
    }

    /// Parses a hex private key, with or without a `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        let trimmed = input.trim();
        let hex_str = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex_str.len() != PRIVATE_KEY_LEN * 2 {
            return Err(CryptoError::InvalidKeyLength {
                expected: PRIVATE_KEY_LEN,
                actual: hex_str.len() / 2,
            });
        }

        let mut bytes = [0u8; PRIVATE_KEY_LEN];
        hex::decode_to_slice(hex_str, &mut bytes)
            .map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    /// Parses a hex private key held in a [`SecretString`].
    pub fn from_secret(secret: &SecretString) -> Result<Self, CryptoError> {
        Self::from_hex(secret.expose_secret())
    }

    /// Returns a signing key for a single signing operation. The returned key
    /// zeroizes itself on drop.
    pub fn signing_key(&self) -> Result<SigningKey, CryptoError> {
        SigningKey::from_bytes(self.0.expose().into())
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))
    }
}

impl FromStr for PrivateKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}
