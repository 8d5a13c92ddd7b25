//! Parsing of hex addresses and call data received as strings.

use super::formatting::without_0x_prefix;
use alloy_primitives::{Address, Bytes};

/// Returns true if `s` is 40 hex digits, optionally prefixed with "0x".
///
/// Checksums are not enforced; mixed case is accepted as-is.
pub fn is_hex_address(s: &str) -> bool {
	let digits = without_0x_prefix(s);
	digits.len() == 40 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parses a hex address, returning `None` when [`is_hex_address`] rejects it.
pub fn parse_hex_address(s: &str) -> Option<Address> {
	if !is_hex_address(s) {
		return None;
	}
	let mut out = [0u8; 20];
	hex::decode_to_slice(without_0x_prefix(s), &mut out).ok()?;
	Some(Address::from(out))
}

/// Decodes hex call data. Both "" and "0x" decode to empty bytes.
pub fn decode_hex_data(s: &str) -> Result<Bytes, hex::FromHexError> {
	let digits = without_0x_prefix(s.trim());
	if digits.is_empty() {
		return Ok(Bytes::new());
	}
	hex::decode(digits).map(Bytes::from)
}
