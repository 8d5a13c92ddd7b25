//! Authorization signing.
//!
//! The signed message is `keccak256(0x05 || rlp([chain_id, address, nonce]))`.

use alloy_primitives::{keccak256, Address, B256};
use alloy_rlp::{Encodable, RlpEncodable};
use delegation_account::{normalized_recovery_id, AccountError, AccountInterface};
use delegation_types::{current_timestamp, Authorization};

/// Domain byte prepended to the RLP payload of an authorization.
pub const AUTHORIZATION_MAGIC: u8 = 0x05;

#[derive(RlpEncodable)]
struct AuthorizationMessage {
	chain_id: u64,
	address: Address,
	nonce: u64,
}

/// Computes the digest a signer signs to delegate to `address`.
pub fn authorization_hash(chain_id: u64, address: Address, nonce: u64) -> B256 {
	let message = AuthorizationMessage {
		chain_id,
		address,
		nonce,
	};
	let mut buf = Vec::with_capacity(1 + message.length());
	buf.push(AUTHORIZATION_MAGIC);
	message.encode(&mut buf);
	keccak256(buf)
}

/// Signs a delegation of `signer`'s code to `address` at `nonce`.
///
/// Performs no checks; callers verify the delegate and read the nonce.
pub async fn sign_authorization(
	chain_id: u64,
	address: Address,
	nonce: u64,
	signer: &dyn AccountInterface,
) -> Result<Authorization, AccountError> {
	let hash = authorization_hash(chain_id, address, nonce);
	let signature = signer.sign_hash(&hash).await?;

	Ok(Authorization {
		chain_id,
		address,
		nonce,
		v: normalized_recovery_id(&signature),
		r: B256::from(signature.r()),
		s: B256::from(signature.s()),
		signer: signer.address(),
		created_at: current_timestamp(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_eips::eip7702::Authorization as AuthorizationTuple;
	use alloy_primitives::{address, Signature, U256};
	use delegation_account::LocalAccount;

	const DELEGATE: Address = address!("1f0F9d7e19991e7E296630DC0073610f23CF066a");

	#[test]
	fn test_hash_matches_eip7702_definition() {
		for (chain_id, nonce) in [(1u64, 0u64), (17000, 5), (u64::MAX, u64::MAX)] {
			let expected = AuthorizationTuple {
				chain_id: U256::from(chain_id),
				address: DELEGATE,
				nonce,
			}
			.signature_hash();
			assert_eq!(authorization_hash(chain_id, DELEGATE, nonce), expected);
		}
	}

	#[test]
	fn test_hash_binds_every_field() {
		let base = authorization_hash(17000, DELEGATE, 5);
		assert_ne!(base, authorization_hash(17001, DELEGATE, 5));
		assert_ne!(base, authorization_hash(17000, Address::ZERO, 5));
		assert_ne!(base, authorization_hash(17000, DELEGATE, 6));
	}

	#[tokio::test]
	async fn test_signature_recovers_to_signer() {
		let account = LocalAccount::random();
		let auth = sign_authorization(17000, DELEGATE, 5, &account).await.unwrap();

		assert_eq!(auth.signer, account.address());
		assert!(auth.v <= 1);

		let signature = Signature::new(
			U256::from_be_bytes(auth.r.0),
			U256::from_be_bytes(auth.s.0),
			auth.v == 1,
		);
		let hash = authorization_hash(auth.chain_id, auth.address, auth.nonce);
		assert_eq!(
			signature.recover_address_from_prehash(&hash).unwrap(),
			account.address()
		);
	}
}
