//! Fee and gas-limit policy for sponsored transactions.
//!
//! Limits are static heuristics; nothing is simulated.

use alloy_primitives::U256;
use delegation_types::Call;

/// Sponsorship limits and gas parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsorPolicy {
	/// Cap on the summed value of all calls in one transaction, in wei.
	pub max_total_value: U256,
	/// Priority fee used when the chain cannot suggest one, in wei.
	pub fallback_priority_fee: u128,
	/// Fee cap as a multiple of the priority fee.
	pub fee_cap_multiplier: u128,
	/// Gas limit of a single call without an explicit limit.
	pub default_gas_limit: u64,
	/// Fixed part of the multicall gas limit.
	pub multicall_base_gas: u64,
	/// Per-call part of the multicall gas limit.
	pub multicall_per_call_gas: u64,
}

impl Default for SponsorPolicy {
	fn default() -> Self {
		Self {
			// 10 ether
			max_total_value: U256::from(10_000_000_000_000_000_000u128),
			fallback_priority_fee: 2_000_000_000,
			fee_cap_multiplier: 3,
			default_gas_limit: 1_000_000,
			multicall_base_gas: 100_000,
			multicall_per_call_gas: 50_000,
		}
	}
}

impl SponsorPolicy {
	/// Fee cap for a given priority fee.
	pub fn max_fee_per_gas(&self, priority_fee: u128) -> u128 {
		priority_fee.saturating_mul(self.fee_cap_multiplier)
	}

	/// Gas limit for a transaction carrying `calls`.
	///
	/// A lone call uses its explicit limit when it has one. Several calls
	/// get `base + per_call * n` regardless of their own limits.
	pub fn gas_limit(&self, calls: &[Call]) -> u64 {
		match calls {
			[call] => call.explicit_gas_limit().unwrap_or(self.default_gas_limit),
			_ => self.multicall_gas(calls.len()),
		}
	}

	fn multicall_gas(&self, count: usize) -> u64 {
		let count = u64::try_from(count).unwrap_or(u64::MAX);
		self.multicall_base_gas
			.saturating_add(self.multicall_per_call_gas.saturating_mul(count))
	}
}
