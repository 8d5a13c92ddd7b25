//! Common types module for the EIP-7702 delegation service.
//!
//! This module defines the data model shared by every crate in the workspace:
//! signed delegation records, call intents, the sponsored transaction type,
//! secret handling for private keys and the HTTP API payloads.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Signed EIP-7702 delegation records.
pub mod authorization;
/// Contract call intents.
pub mod call;
/// Secure string type for private keys.
pub mod secret_string;
/// Sponsored set-code transaction type.
pub mod transaction;
/// Utility functions for hex, address, time and unit conversions.
pub mod utils;

// Re-export all types for convenient access
pub use alloy_primitives::{Address, Bytes, B256, U256};
pub use api::*;
pub use authorization::Authorization;
pub use call::Call;
pub use secret_string::SecretString;
pub use transaction::{SponsoredTransaction, TxHash};
pub use utils::{
	current_timestamp, decode_hex_data, ether_to_wei, is_hex_address, parse_hex_address,
	token_amount_to_base_units, truncate_id, with_0x_prefix, without_0x_prefix, UnitError,
	ETHER_DECIMALS,
};
