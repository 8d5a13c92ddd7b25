//! String formatting utilities for hex values shown in logs and responses.

/// Shortens an address or hash for log output.
///
/// Keeps the first 10 characters (`0x` plus 8 hex digits) and appends "..".
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 10 {
		id.to_string()
	} else {
		format!("{}..", &id[..10])
	}
}

/// Adds a "0x" prefix to a hex string unless one is already present.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Strips a leading "0x" or "0X" from a hex string.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("0x12345678"), "0x12345678");
		assert_eq!(
			truncate_id("0x1f0F9d7e19991e7E296630DC0073610f23CF066a"),
			"0x1f0F9d7e.."
		);
	}

	#[test]
	fn test_prefix_handling() {
		let bare = "93d77be58a977350b924c0694242b075eb26aede";
		let prefixed = "0x93d77be58a977350b924c0694242b075eb26aede";

		assert_eq!(with_0x_prefix(bare), prefixed);
		assert_eq!(with_0x_prefix(prefixed), prefixed);
		assert_eq!(without_0x_prefix(prefixed), bare);
		assert_eq!(without_0x_prefix(bare), bare);
		assert_eq!(without_0x_prefix("0Xab"), "ab");
	}
}
