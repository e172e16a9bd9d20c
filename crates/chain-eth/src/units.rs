//! Conversion between human-readable decimal amounts and smallest-unit
//! integers, done entirely in 256-bit integer arithmetic.

use alloy_primitives::U256;

use crate::error::EthError;

/// Decimals of the native currency (1 ether = 10^18 wei).
pub const ETHER_DECIMALS: u8 = 18;

/// Decimals of a gwei (1 gwei = 10^9 wei).
pub const GWEI_DECIMALS: u8 = 9;

/// Parses a decimal string such as `"1.5"` into smallest units.
///
/// Fails on more fractional digits than `decimals`, on signs, exponents and
/// on overflow, so no amount is ever silently rounded.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, EthError> {
    let amount = amount.trim();
    let invalid = |reason: &str| EthError::InvalidAmount(format!("{amount:?}: {reason}"));

    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("empty amount"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid("only digits and a single '.' are allowed"));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(invalid("too many fractional digits"));
    }

    let mut digits = String::with_capacity(whole.len() + usize::from(decimals));
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(usize::from(decimals) - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| invalid("amount overflows 256 bits"))
}

/// Formats a smallest-unit amount as a decimal string, trimming trailing
/// fractional zeros (`1500000000000000000` with 18 decimals → `"1.5"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Parses an ether amount into wei.
pub fn parse_ether(amount: &str) -> Result<U256, EthError> {
    parse_units(amount, ETHER_DECIMALS)
}

/// Parses a gwei amount into wei.
pub fn parse_gwei(amount: &str) -> Result<U256, EthError> {
    parse_units(amount, GWEI_DECIMALS)
}
