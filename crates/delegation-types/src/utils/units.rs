//! Decimal amount conversion into integer base units.
//!
//! Amounts arrive as human-readable decimal strings ("1.5", "100") and are
//! scaled by `10^decimals` with `parse_units`. Fractional digits beyond
//! `decimals` are truncated toward zero without error.

use alloy_primitives::{utils::parse_units, U256};
use thiserror::Error;

/// Number of decimals of the native currency.
pub const ETHER_DECIMALS: u8 = 18;

/// Errors that can occur while parsing a decimal amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitError {
	#[error("Amount is empty")]
	Empty,
	#[error("Amount must not be negative: {0}")]
	Negative(String),
	#[error("Invalid decimal amount: {0}")]
	InvalidFormat(String),
	#[error("Amount does not fit in 256 bits: {0}")]
	Overflow(String),
}

/// Converts an ether amount such as "1.5" into wei.
pub fn ether_to_wei(amount: &str) -> Result<U256, UnitError> {
	token_amount_to_base_units(amount, ETHER_DECIMALS)
}

/// Converts a decimal token amount into base units for a token with
/// `decimals` decimals.
///
/// "0.0000000000000000001" with 18 decimals yields zero; the extra digit is
/// dropped silently.
pub fn token_amount_to_base_units(amount: &str, decimals: u8) -> Result<U256, UnitError> {
	let amount = amount.trim();
	if amount.is_empty() {
		return Err(UnitError::Empty);
	}
	if amount.starts_with('-') {
		return Err(UnitError::Negative(amount.to_string()));
	}

	// Plain digits with at most one dot; exponents and signs are rejected.
	let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
	let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
	if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
		return Err(UnitError::InvalidFormat(amount.to_string()));
	}

	let parsed = parse_units(amount, decimals)
		.map_err(|e| UnitError::Overflow(format!("{}: {}", amount, e)))?;
	U256::try_from(parsed).map_err(|_| UnitError::Negative(amount.to_string()))
}
