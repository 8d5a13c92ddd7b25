//! Sponsored-transaction assembly.
//!
//! The sponsor pays gas for a set-code transaction sent to the signer's own
//! address. With the authorization applied, the signer's account runs the
//! delegate contract's code for the duration of the transaction.

use crate::{calldata::encode_multicall, DelegationError};
use alloy_consensus::{SignableTransaction, TxEip7702};
use alloy_primitives::{Bytes, U256};
use delegation_account::AccountInterface;
use delegation_types::{Authorization, Call, SponsoredTransaction};

pub mod gas;

pub use gas::SponsorPolicy;

/// Checks that `calls` is non-empty, has no zero targets and stays within
/// `max_total_value`.
pub fn validate_calls(calls: &[Call], max_total_value: U256) -> Result<(), DelegationError> {
	if calls.is_empty() {
		return Err(DelegationError::NoCalls);
	}

	let mut total = Some(U256::ZERO);
	for (index, call) in calls.iter().enumerate() {
		if call.to.is_zero() {
			return Err(DelegationError::ZeroCallTarget { index });
		}
		total = total.and_then(|sum| sum.checked_add(call.value));
	}

	match total {
		Some(total) if total <= max_total_value => Ok(()),
		total => Err(DelegationError::ValueCapExceeded {
			total: total.map(|t| t.to_string()).unwrap_or_else(|| "overflow".to_string()),
			cap: max_total_value,
		}),
	}
}

/// Transaction input for `calls`: the raw data of a lone call, otherwise
/// the multicall encoding of all of them.
pub fn encode_payload(calls: &[Call]) -> Bytes {
	match calls {
		[call] => call.data.clone(),
		_ => encode_multicall(calls),
	}
}

/// Chain values read for one sponsored transaction.
#[derive(Debug, Clone, Copy)]
pub struct SponsorContext {
	pub chain_id: u64,
	pub sponsor_nonce: u64,
	pub priority_fee: u128,
}

/// Assembles and signs the set-code transaction for already validated
/// inputs.
pub async fn build_sponsored_transaction(
	context: SponsorContext,
	authorization: &Authorization,
	calls: &[Call],
	policy: &SponsorPolicy,
	sponsor: &dyn AccountInterface,
) -> Result<SponsoredTransaction, DelegationError> {
	let tx = TxEip7702 {
		chain_id: context.chain_id,
		nonce: context.sponsor_nonce,
		gas_limit: policy.gas_limit(calls),
		max_fee_per_gas: policy.max_fee_per_gas(context.priority_fee),
		max_priority_fee_per_gas: context.priority_fee,
		to: authorization.signer,
		value: U256::ZERO,
		access_list: Default::default(),
		authorization_list: vec![authorization.to_signed_authorization()],
		input: encode_payload(calls),
	};

	let signature = sponsor.sign_hash(&tx.signature_hash()).await?;
	Ok(tx.into_signed(signature))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::calldata::encode_send_eth;
	use delegation_account::LocalAccount;
	use delegation_types::{Address, B256};

	fn eth(n: u64) -> U256 {
		U256::from(n) * U256::from(1_000_000_000_000_000_000u128)
	}

	#[test]
	fn test_validate_calls() {
		let cap = SponsorPolicy::default().max_total_value;
		let target = Address::repeat_byte(0xaa);

		assert!(matches!(validate_calls(&[], cap), Err(DelegationError::NoCalls)));

		let zero_target = [
			Call::new(target, Bytes::new()),
			Call::new(Address::ZERO, Bytes::new()),
		];
		assert!(matches!(
			validate_calls(&zero_target, cap),
			Err(DelegationError::ZeroCallTarget { index: 1 })
		));

		let at_cap = [Call::new(target, Bytes::new()).with_value(eth(10))];
		assert!(validate_calls(&at_cap, cap).is_ok());
	}

	#[test]
	fn test_value_cap_is_independent_of_call_count() {
		let cap = SponsorPolicy::default().max_total_value;
		let target = Address::repeat_byte(0xaa);

		let single = [Call::new(target, Bytes::new()).with_value(eth(10) + U256::from(1u64))];
		assert!(matches!(
			validate_calls(&single, cap),
			Err(DelegationError::ValueCapExceeded { .. })
		));

		let many: Vec<Call> = (0..11)
			.map(|_| Call::new(target, Bytes::new()).with_value(eth(1)))
			.collect();
		assert!(matches!(
			validate_calls(&many, cap),
			Err(DelegationError::ValueCapExceeded { .. })
		));

		let overflow = [
			Call::new(target, Bytes::new()).with_value(U256::MAX),
			Call::new(target, Bytes::new()).with_value(U256::MAX),
		];
		assert!(matches!(
			validate_calls(&overflow, cap),
			Err(DelegationError::ValueCapExceeded { .. })
		));
	}

	#[test]
	fn test_payload_selection() {
		let one = [Call::new(Address::repeat_byte(1), Bytes::from(vec![1, 2, 3]))];
		assert_eq!(encode_payload(&one), Bytes::from(vec![1, 2, 3]));

		let two = [one[0].clone(), one[0].clone()];
		assert_eq!(encode_payload(&two), encode_multicall(&two));
	}

	#[tokio::test]
	async fn test_build_sets_outer_fields() {
		let sponsor = LocalAccount::random();
		let signer = Address::repeat_byte(0xee);
		let auth = Authorization {
			chain_id: 17000,
			address: Address::repeat_byte(0x1f),
			nonce: 5,
			v: 1,
			r: B256::repeat_byte(3),
			s: B256::repeat_byte(4),
			signer,
			created_at: 0,
		};
		let calls = [Call::new(signer, encode_send_eth(Address::repeat_byte(7), eth(1)))
			.with_value(eth(1))];
		let context = SponsorContext {
			chain_id: 17000,
			sponsor_nonce: 12,
			priority_fee: 1_000_000_000,
		};

		let signed =
			build_sponsored_transaction(context, &auth, &calls, &SponsorPolicy::default(), &sponsor)
				.await
				.unwrap();
		let tx = signed.tx();

		assert_eq!(tx.chain_id, 17000);
		assert_eq!(tx.nonce, 12);
		assert_eq!(tx.to, signer);
		assert_eq!(tx.value, U256::ZERO);
		assert_eq!(tx.max_priority_fee_per_gas, 1_000_000_000);
		assert_eq!(tx.max_fee_per_gas, 3_000_000_000);
		assert_eq!(tx.input, calls[0].data);
		assert_eq!(tx.authorization_list, vec![auth.to_signed_authorization()]);
		assert_eq!(
			signed
				.signature()
				.recover_address_from_prehash(&tx.signature_hash())
				.unwrap(),
			sponsor.address()
		);
	}
}
