use std::fmt::LowerHex;

use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::{Encodable, RlpEncodable};
use crypto_utils::PrivateKey;
use k256::ecdsa::signature::hazmat::RandomizedPrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use rand_core::OsRng;
use serde::{Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::address::verifying_key_to_address;
use crate::error::EthError;

/// Fully resolved attributes of a legacy (pre-typed-envelope) transaction.
///
/// Every field is present; the signer uses them exactly as given. Serializes
/// with quantities as `0x` hex, the way JSON-RPC expects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxAttributes {
    #[serde(serialize_with = "hex_quantity")]
    pub nonce: u64,
    #[serde(serialize_with = "hex_quantity")]
    pub gas_price: u128,
    #[serde(serialize_with = "hex_quantity")]
    pub gas_limit: u64,
    pub to: Address,
    /// Transfer value in wei.
    pub value: U256,
    /// Calldata.
    pub data: Bytes,
    /// EIP-155 replay protection. `None` signs the original 6-field form,
    /// which any chain will accept.
    pub chain_id: Option<u64>,
}

/// A signed legacy transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// RLP-encoded `[nonce, gasPrice, gasLimit, to, value, data, v, r, s]`.
    pub raw_tx: Vec<u8>,
    /// Keccak-256 of `raw_tx` as a 0x-prefixed hex string.
    pub tx_hash: String,
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl SignedTransaction {
    /// The raw transaction as `0x`-prefixed hex, the submission format.
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw_tx))
    }
}

/// RLP payload that gets hashed and signed.
///
/// With a chain id this is the EIP-155 form
/// `[nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]`; without one
/// it is the 6-field form.
pub fn signing_payload(tx: &TxAttributes) -> Vec<u8> {
    let mut buf = Vec::new();
    match tx.chain_id {
        Some(chain_id) => Eip155UnsignedFields {
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            to: RlpAddress::from(&tx.to),
            value: RlpU256(tx.value.to_be_bytes::<32>()),
            data: RlpBytes(tx.data.to_vec()),
            chain_id,
            empty_r: 0,
            empty_s: 0,
        }
        .encode(&mut buf),
        None => UnsignedTxFields {
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            to: RlpAddress::from(&tx.to),
            value: RlpU256(tx.value.to_be_bytes::<32>()),
            data: RlpBytes(tx.data.to_vec()),
        }
        .encode(&mut buf),
    }
    buf
}

/// Keccak-256 of [`signing_payload`].
pub fn signing_hash(tx: &TxAttributes) -> [u8; 32] {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Keccak256::digest(signing_payload(tx)));
    hash
}

/// Signs a legacy transaction with a secp256k1 private key.
///
/// 1. RLP-encode the unsigned fields (EIP-155 form when a chain id is set).
/// 2. Keccak-256 hash the payload.
/// 3. Sign the hash. The ECDSA nonce is RFC 6979 mixed with 32 fresh bytes
///    from the OS RNG, so it is never reused and two signatures of the same
///    transaction differ. Reusing an ECDSA nonce across two messages leaks
///    the private key.
/// 4. Append v, r, s and RLP-encode the signed list.
pub fn sign_transaction(
    tx: &TxAttributes,
    private_key: &PrivateKey,
) -> Result<SignedTransaction, EthError> {
    let msg_hash = signing_hash(tx);

    // Dropped (and zeroized) at the end of this function.
    let signing_key = private_key.signing_key()?;

    let signature: Signature = signing_key
        .sign_prehash_with_rng(&mut OsRng, &msg_hash)
        .map_err(|e| EthError::SigningError(e.to_string()))?;
    let signature = signature.normalize_s().unwrap_or(signature);
    let recovery_id =
        RecoveryId::trial_recovery_from_prehash(signing_key.verifying_key(), &msg_hash, &signature)
            .map_err(|e| EthError::SigningError(e.to_string()))?;

    let parity = u64::from(recovery_id.is_y_odd());
    let v = match tx.chain_id {
        Some(chain_id) => chain_id
            .checked_mul(2)
            .and_then(|n| n.checked_add(35 + parity))
            .ok_or_else(|| EthError::SigningError(format!("chain id {chain_id} too large")))?,
        None => 27 + parity,
    };

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature.r().to_bytes());
    s.copy_from_slice(&signature.s().to_bytes());

    let signed_fields = SignedTxFields {
        nonce: tx.nonce,
        gas_price: tx.gas_price,
        gas_limit: tx.gas_limit,
        to: RlpAddress::from(&tx.to),
        value: RlpU256(tx.value.to_be_bytes::<32>()),
        data: RlpBytes(tx.data.to_vec()),
        v,
        r: RlpU256(r),
        s: RlpU256(s),
    };

    let mut raw_tx = Vec::with_capacity(signed_fields.length());
    signed_fields.encode(&mut raw_tx);

    let tx_hash = format!("0x{}", hex::encode(Keccak256::digest(&raw_tx)));

    Ok(SignedTransaction {
        raw_tx,
        tx_hash,
        v,
        r,
        s,
    })
}

/// Recovers the address that signed `signed`, given the attributes it was
/// built from.
pub fn recover_sender(tx: &TxAttributes, signed: &SignedTransaction) -> Result<Address, EthError> {
    let parity = match tx.chain_id {
        Some(chain_id) => chain_id
            .checked_mul(2)
            .and_then(|n| n.checked_add(35))
            .and_then(|base| signed.v.checked_sub(base)),
        None => signed.v.checked_sub(27),
    }
    .filter(|p| *p <= 1)
    .ok_or_else(|| EthError::SigningError(format!("unexpected v value {}", signed.v)))?;

    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(&signed.r);
    rs[32..].copy_from_slice(&signed.s);
    let signature =
        Signature::from_slice(&rs).map_err(|e| EthError::SigningError(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(parity as u8)
        .ok_or_else(|| EthError::SigningError("invalid recovery id".into()))?;

    let key = VerifyingKey::recover_from_prehash(&signing_hash(tx), &signature, recovery_id)
        .map_err(|e| EthError::SigningError(e.to_string()))?;
    Ok(verifying_key_to_address(&key))
}

fn hex_quantity<T: LowerHex, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{value:x}"))
}

// ---------------------------------------------------------------------------
// RLP-encodable structures
// ---------------------------------------------------------------------------

/// Pre-EIP-155 signing payload.
#[derive(RlpEncodable)]
struct UnsignedTxFields {
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
}

/// EIP-155 signing payload: chain id followed by two empty values.
#[derive(RlpEncodable)]
struct Eip155UnsignedFields {
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    chain_id: u64,
    empty_r: u8,
    empty_s: u8,
}

#[derive(RlpEncodable)]
struct SignedTxFields {
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    v: u64,
    r: RlpU256,
    s: RlpU256,
}

/// 20-byte address encoded as an RLP string.
#[derive(Debug, Clone)]
struct RlpAddress([u8; 20]);

impl From<&Address> for RlpAddress {
    fn from(address: &Address) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(address.as_slice());
        Self(bytes)
    }
}

impl Encodable for RlpAddress {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// 256-bit integer encoded as minimal big-endian bytes (leading zeros
/// stripped), the standard RLP integer form.
#[derive(Debug, Clone)]
struct RlpU256([u8; 32]);

impl RlpU256 {
    fn trimmed(&self) -> &[u8] {
        let start = self.0.iter().position(|&b| b != 0).unwrap_or(32);
        &self.0[start..]
    }
}

impl Encodable for RlpU256 {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.trimmed().encode(out);
    }

    fn length(&self) -> usize {
        self.trimmed().length()
    }
}

/// Arbitrary-length byte string encoded as an RLP string (not a list).
#[derive(Debug, Clone)]
struct RlpBytes(Vec<u8>);

impl Encodable for RlpBytes {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}
