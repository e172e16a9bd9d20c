//! Contract ABI encoding for EVM function and constructor calls.
//!
//! Covers the elementary types (`uint<M>`, `int<M>`, `address`, `bool`,
//! `bytes<M>`), the dynamic types (`bytes`, `string`, `T[]`) and fixed-size
//! arrays `T[k]`, nested arbitrarily. Tuples are not supported.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, I256, U256};
use serde_json::Value;
use sha3::{Digest, Keccak256};

use crate::address::parse_address;
use crate::error::EthError;

/// Size of one ABI word in bytes.
pub const WORD: usize = 32;

/// A parsed ABI type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    /// `uint<M>`, `M` in bits.
    Uint(usize),
    /// `int<M>`, `M` in bits.
    Int(usize),
    Address,
    Bool,
    /// `bytes<M>`, `M` in bytes (1..=32).
    FixedBytes(usize),
    Bytes,
    String,
    /// `T[]`
    Array(Box<AbiType>),
    /// `T[k]`
    FixedArray(Box<AbiType>, usize),
}

impl AbiType {
    /// Parses a Solidity type tag such as `uint256`, `address[]` or `bytes32[4]`.
    ///
    /// `uint` and `int` are accepted as aliases of `uint256` and `int256`.
    /// Anything else, including tuples, is an [`EthError::UnsupportedType`].
    pub fn parse(tag: &str) -> Result<Self, EthError> {
        let unsupported = || EthError::UnsupportedType(tag.to_string());

        if let Some(prefix) = tag.strip_suffix(']') {
            let open = prefix.rfind('[').ok_or_else(unsupported)?;
            let inner = AbiType::parse(&prefix[..open])?;
            let size = &prefix[open + 1..];
            if size.is_empty() {
                return Ok(AbiType::Array(Box::new(inner)));
            }
            let len = parse_decimal(size).ok_or_else(unsupported)?;
            return Ok(AbiType::FixedArray(Box::new(inner), len));
        }

        match tag {
            "address" => return Ok(AbiType::Address),
            "bool" => return Ok(AbiType::Bool),
            "string" => return Ok(AbiType::String),
            "bytes" => return Ok(AbiType::Bytes),
            "uint" => return Ok(AbiType::Uint(256)),
            "int" => return Ok(AbiType::Int(256)),
            _ => {}
        }

        if let Some(bits) = tag.strip_prefix("uint") {
            return parse_int_width(bits).map(AbiType::Uint).ok_or_else(unsupported);
        }
        if let Some(bits) = tag.strip_prefix("int") {
            return parse_int_width(bits).map(AbiType::Int).ok_or_else(unsupported);
        }
        if let Some(len) = tag.strip_prefix("bytes") {
            return match parse_decimal(len) {
                Some(n) if n <= 32 => Ok(AbiType::FixedBytes(n)),
                _ => Err(unsupported()),
            };
        }

        Err(unsupported())
    }

    /// Parses a list of type tags, failing on the first unsupported one.
    pub fn parse_all<S: AsRef<str>>(tags: &[S]) -> Result<Vec<Self>, EthError> {
        tags.iter().map(|t| AbiType::parse(t.as_ref())).collect()
    }

    /// Whether the type is encoded out-of-line (offset in the head, data in
    /// the tail).
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            _ => false,
        }
    }

    /// Number of bytes the type occupies in the head of an enclosing tuple.
    fn head_len(&self) -> Result<usize, EthError> {
        match self {
            AbiType::FixedArray(inner, len) if !self.is_dynamic() => inner
                .head_len()?
                .checked_mul(*len)
                .ok_or_else(|| EthError::UnsupportedType(format!("{self} is too large to encode"))),
            _ => Ok(WORD),
        }
    }
}

impl fmt::Display for AbiType {
    /// Writes the canonical form used in function signatures.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Address => f.write_str("address"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::FixedBytes(len) => write!(f, "bytes{len}"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::String => f.write_str("string"),
            AbiType::Array(inner) => write!(f, "{inner}[]"),
            AbiType::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
        }
    }
}

impl FromStr for AbiType {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AbiType::parse(s)
    }
}

fn parse_int_width(bits: &str) -> Option<usize> {
    parse_decimal(bits).filter(|bits| *bits <= 256 && bits % 8 == 0)
}

/// A positive decimal made of ASCII digits only, without a sign or leading
/// zeros, so every accepted tag already is its canonical spelling.
fn parse_decimal(digits: &str) -> Option<usize> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// A typed ABI argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    Int(I256),
    Address(Address),
    Bool(bool),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    /// Elements of either `T[]` or `T[k]`.
    Array(Vec<AbiValue>),
}

impl AbiValue {
    /// Converts a JSON argument into a value of type `ty`.
    ///
    /// Integers may be JSON numbers or decimal / `0x` hex strings (use strings
    /// for anything beyond 64 bits). Addresses, `bytes` and `bytes<M>` are
    /// `0x` hex strings; arrays are JSON arrays. No lossy coercion is done:
    /// floats, out-of-range integers and wrongly-sized byte strings fail.
    pub fn from_json(ty: &AbiType, value: &Value) -> Result<Self, EthError> {
        let mismatch = || EthError::InvalidArgument(format!("expected {ty}, got {value}"));

        match ty {
            AbiType::Uint(bits) => {
                let n = match value {
                    Value::Number(n) => n.as_u64().map(U256::from).ok_or_else(mismatch)?,
                    Value::String(s) => parse_uint_str(s).ok_or_else(mismatch)?,
                    _ => return Err(mismatch()),
                };
                check_uint_width(n, *bits)?;
                Ok(AbiValue::Uint(n))
            }
            AbiType::Int(bits) => {
                let (negative, magnitude) = match value {
                    Value::Number(n) => {
                        let v = n.as_i64().ok_or_else(mismatch)?;
                        (v < 0, U256::from(v.unsigned_abs()))
                    }
                    Value::String(s) => match s.trim().strip_prefix('-') {
                        Some(rest) => (true, parse_uint_str(rest).ok_or_else(mismatch)?),
                        None => (false, parse_uint_str(s).ok_or_else(mismatch)?),
                    },
                    _ => return Err(mismatch()),
                };
                Ok(AbiValue::Int(signed_from_parts(negative, magnitude, *bits)?))
            }
            AbiType::Address => match value {
                Value::String(s) => Ok(AbiValue::Address(parse_address(s)?)),
                _ => Err(mismatch()),
            },
            AbiType::Bool => value.as_bool().map(AbiValue::Bool).ok_or_else(mismatch),
            AbiType::FixedBytes(len) => {
                let bytes = value.as_str().and_then(decode_hex).ok_or_else(mismatch)?;
                if bytes.len() != *len {
                    return Err(EthError::InvalidArgument(format!(
                        "{ty} needs exactly {len} bytes, got {}",
                        bytes.len()
                    )));
                }
                Ok(AbiValue::FixedBytes(bytes))
            }
            AbiType::Bytes => value
                .as_str()
                .and_then(decode_hex)
                .map(AbiValue::Bytes)
                .ok_or_else(mismatch),
            AbiType::String => value
                .as_str()
                .map(|s| AbiValue::String(s.to_string()))
                .ok_or_else(mismatch),
            AbiType::Array(inner) => {
                let items = value.as_array().ok_or_else(mismatch)?;
                items
                    .iter()
                    .map(|item| AbiValue::from_json(inner, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(AbiValue::Array)
            }
            AbiType::FixedArray(inner, len) => {
                let items = value.as_array().ok_or_else(mismatch)?;
                if items.len() != *len {
                    return Err(EthError::InvalidArgument(format!(
                        "{ty} needs exactly {len} elements, got {}",
                        items.len()
                    )));
                }
                items
                    .iter()
                    .map(|item| AbiValue::from_json(inner, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(AbiValue::Array)
            }
        }
    }
}

/// Converts a list of JSON arguments against the matching type list.
pub fn values_from_json(types: &[AbiType], args: &[Value]) -> Result<Vec<AbiValue>, EthError> {
    if types.len() != args.len() {
        return Err(EthError::ArgumentCountMismatch {
            expected: types.len(),
            actual: args.len(),
        });
    }
    types
        .iter()
        .zip(args)
        .map(|(ty, arg)| AbiValue::from_json(ty, arg))
        .collect()
}

/// Builds the canonical signature `name(type1,type2,...)`.
pub fn function_signature(name: &str, types: &[AbiType]) -> String {
    let params: Vec<String> = types.iter().map(ToString::to_string).collect();
    format!("{name}({})", params.join(","))
}

/// Computes the 4-byte selector: the first four bytes of the Keccak-256 hash
/// of the canonical signature.
///
/// This is the original Keccak padding used by the EVM, not NIST SHA3-256;
/// the two produce different digests for the same input.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Encodes a function call: `selector || encode(params)`.
pub fn encode_function_call(
    name: &str,
    types: &[AbiType],
    values: &[AbiValue],
) -> Result<Vec<u8>, EthError> {
    let selector = selector(&function_signature(name, types));
    let params = encode_params(types, values)?;

    let mut data = Vec::with_capacity(4 + params.len());
    data.extend_from_slice(&selector);
    data.extend_from_slice(&params);
    Ok(data)
}

/// Head/tail encodes `values` as a tuple of `types`.
///
/// Static values are written inline; dynamic values get an offset word in the
/// head and their encoding appended to the tail in argument order. With no
/// arguments the result is empty.
pub fn encode_params(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, EthError> {
    if types.len() != values.len() {
        return Err(EthError::ArgumentCountMismatch {
            expected: types.len(),
            actual: values.len(),
        });
    }
    let items: Vec<(&AbiType, &AbiValue)> = types.iter().zip(values).collect();
    encode_tuple(&items)
}

fn encode_tuple(items: &[(&AbiType, &AbiValue)]) -> Result<Vec<u8>, EthError> {
    // Values are checked against their types before any head size is
    // trusted; a declared length is only as large as the data backing it.
    let encoded = items
        .iter()
        .map(|(ty, value)| encode_value(ty, value))
        .collect::<Result<Vec<_>, _>>()?;
    let head_len = items.iter().try_fold(0usize, |acc, (ty, _)| {
        acc.checked_add(ty.head_len()?)
            .ok_or_else(|| EthError::UnsupportedType("argument list is too large to encode".into()))
    })?;

    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for ((ty, _), encoded) in items.iter().zip(encoded) {
        if ty.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend_from_slice(&encoded);
        } else {
            head.extend_from_slice(&encoded);
        }
    }

    head.extend_from_slice(&tail);
    Ok(head)
}

fn encode_value(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, EthError> {
    match (ty, value) {
        (AbiType::Uint(bits), AbiValue::Uint(n)) => {
            check_uint_width(*n, *bits)?;
            Ok(n.to_be_bytes::<32>().to_vec())
        }
        (AbiType::Int(bits), AbiValue::Int(n)) => {
            let raw = n.into_raw();
            let negative = raw.bit(255);
            let magnitude = if negative {
                (!raw).wrapping_add(U256::from(1u8))
            } else {
                raw
            };
            signed_from_parts(negative, magnitude, *bits)?;
            Ok(raw.to_be_bytes::<32>().to_vec())
        }
        (AbiType::Address, AbiValue::Address(addr)) => {
            // Left-pad: 12 zero bytes + 20 address bytes.
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(addr.as_slice());
            Ok(word.to_vec())
        }
        (AbiType::Bool, AbiValue::Bool(b)) => {
            let mut word = [0u8; WORD];
            word[31] = u8::from(*b);
            Ok(word.to_vec())
        }
        (AbiType::FixedBytes(len), AbiValue::FixedBytes(bytes)) => {
            if bytes.len() != *len {
                return Err(EthError::InvalidArgument(format!(
                    "{ty} needs exactly {len} bytes, got {}",
                    bytes.len()
                )));
            }
            // Right-pad: data + trailing zero bytes.
            let mut word = [0u8; WORD];
            word[..bytes.len()].copy_from_slice(bytes);
            Ok(word.to_vec())
        }
        (AbiType::Bytes, AbiValue::Bytes(bytes)) => Ok(encode_dynamic_bytes(bytes)),
        (AbiType::String, AbiValue::String(s)) => Ok(encode_dynamic_bytes(s.as_bytes())),
        (AbiType::Array(inner), AbiValue::Array(items)) => {
            let pairs: Vec<(&AbiType, &AbiValue)> =
                items.iter().map(|item| (inner.as_ref(), item)).collect();
            let mut out = usize_word(items.len()).to_vec();
            out.extend_from_slice(&encode_tuple(&pairs)?);
            Ok(out)
        }
        (AbiType::FixedArray(inner, len), AbiValue::Array(items)) => {
            if items.len() != *len {
                return Err(EthError::InvalidArgument(format!(
                    "{ty} needs exactly {len} elements, got {}",
                    items.len()
                )));
            }
            let pairs: Vec<(&AbiType, &AbiValue)> =
                items.iter().map(|item| (inner.as_ref(), item)).collect();
            encode_tuple(&pairs)
        }
        _ => Err(EthError::InvalidArgument(format!(
            "value {value:?} does not match type {ty}"
        ))),
    }
}

/// Length word followed by the data right-padded to a multiple of 32 bytes.
fn encode_dynamic_bytes(data: &[u8]) -> Vec<u8> {
    let padded_len = data.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded_len);
    out.extend_from_slice(&usize_word(data.len()));
    out.extend_from_slice(data);
    out.resize(WORD + padded_len, 0);
    out
}

fn usize_word(n: usize) -> [u8; WORD] {
    U256::from(n).to_be_bytes::<32>()
}

fn check_uint_width(n: U256, bits: usize) -> Result<(), EthError> {
    if n.bit_len() > bits {
        return Err(EthError::InvalidArgument(format!(
            "{n} does not fit in uint{bits}"
        )));
    }
    Ok(())
}

/// Builds a two's-complement `int<bits>` from a sign and magnitude, checking
/// the range `-2^(bits-1) ..= 2^(bits-1) - 1`.
fn signed_from_parts(negative: bool, magnitude: U256, bits: usize) -> Result<I256, EthError> {
    let limit = U256::from(1u8) << (bits - 1);
    let in_range = if negative {
        magnitude <= limit
    } else {
        magnitude < limit
    };
    if !in_range {
        let sign = if negative { "-" } else { "" };
        return Err(EthError::InvalidArgument(format!(
            "{sign}{magnitude} does not fit in int{bits}"
        )));
    }

    let raw = if negative {
        (!magnitude).wrapping_add(U256::from(1u8))
    } else {
        magnitude
    };
    Ok(I256::from_raw(raw))
}

/// Parses a decimal or `0x`-prefixed hex unsigned integer.
fn parse_uint_str(s: &str) -> Option<U256> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex_digits) if !hex_digits.is_empty() => U256::from_str_radix(hex_digits, 16).ok(),
        Some(_) => None,
        None if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
            U256::from_str_radix(s, 10).ok()
        }
        None => None,
    }
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    hex::decode(digits).ok()
}
