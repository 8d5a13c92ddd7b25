//! Contract call intents.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A single contract invocation intent.
///
/// Calls are built per request and consumed immediately by the encoder or the
/// sponsored-transaction builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
	/// Call target.
	pub to: Address,
	/// ABI-encoded call data.
	#[serde(default)]
	pub data: Bytes,
	/// Native value attached to the call.
	#[serde(default)]
	pub value: U256,
	/// Optional gas override, honored only when the call is sent alone.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas_limit: Option<u64>,
}

impl Call {
	/// Creates a call with zero value and no gas override.
	pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
		Self {
			to,
			data: data.into(),
			value: U256::ZERO,
			gas_limit: None,
		}
	}

	/// Sets the native value attached to the call.
	pub fn with_value(mut self, value: U256) -> Self {
		self.value = value;
		self
	}

	/// Sets an explicit gas limit for the call.
	pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
		self.gas_limit = Some(gas_limit);
		self
	}

	/// Returns the explicit gas limit, treating zero as "not set".
	pub fn explicit_gas_limit(&self) -> Option<u64> {
		self.gas_limit.filter(|gas| *gas > 0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_zero_gas_limit_is_not_an_override() {
		let call = Call::new(Address::repeat_byte(0xaa), Bytes::new()).with_gas_limit(0);
		assert_eq!(call.explicit_gas_limit(), None);

		let call = call.with_gas_limit(21_000);
		assert_eq!(call.explicit_gas_limit(), Some(21_000));
	}
}
