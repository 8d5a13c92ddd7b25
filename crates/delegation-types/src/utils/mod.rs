//! Utility functions shared across the delegation crates.

pub mod conversion;
pub mod formatting;
pub mod helpers;
pub mod units;

pub use conversion::{decode_hex_data, is_hex_address, parse_hex_address};
pub use formatting::{truncate_id, with_0x_prefix, without_0x_prefix};
pub use helpers::current_timestamp;
pub use units::{ether_to_wei, token_amount_to_base_units, UnitError, ETHER_DECIMALS};
