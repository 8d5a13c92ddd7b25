//! Signed EIP-7702 delegation record.
//!
//! An [`Authorization`] binds one signer (EOA) to one delegate contract on one
//! chain at one account nonce. It is produced once by the authorization signer
//! and only read afterwards.

use alloy_eips::eip7702::{Authorization as AuthorizationTuple, SignedAuthorization};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A signed delegation of an EOA's code to a delegate contract.
///
/// The signature `(v, r, s)` covers
/// `keccak256(0x05 || rlp([chain_id, address, nonce]))` and was produced by the
/// key of `signer`. `created_at` is local wall-clock time and never goes
/// on-chain; it only drives the freshness window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
	/// Chain the delegation is valid on.
	pub chain_id: u64,
	/// Delegate contract the signer's code will point to.
	pub address: Address,
	/// Signer's account nonce at signing time.
	pub nonce: u64,
	/// Recovery id, normalized to 0 or 1.
	pub v: u8,
	/// Signature `r` component.
	pub r: B256,
	/// Signature `s` component.
	pub s: B256,
	/// EOA granting the delegation.
	pub signer: Address,
	/// Unix timestamp (seconds) of signing.
	pub created_at: u64,
}

impl Authorization {
	/// Returns true for a record that was never filled in, such as one
	/// deserialized from a request that omitted the authorization entirely.
	pub fn is_empty(&self) -> bool {
		self.signer.is_zero() && self.address.is_zero() && self.r.is_zero() && self.s.is_zero()
	}

	/// Converts the record into the tuple carried in a set-code transaction's
	/// authorization list: `(chain_id, address, nonce, y_parity, r, s)`.
	pub fn to_signed_authorization(&self) -> SignedAuthorization {
		let inner = AuthorizationTuple {
			chain_id: U256::from(self.chain_id),
			address: self.address,
			nonce: self.nonce,
		};
		SignedAuthorization::new_unchecked(
			inner,
			self.v,
			U256::from_be_bytes(self.r.0),
			U256::from_be_bytes(self.s.0),
		)
	}
}
