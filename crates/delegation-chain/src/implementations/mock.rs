//! In-memory chain client with scripted answers.
//!
//! Used by engine and API tests. Nonces default to zero for unknown
//! addresses; broadcast transactions are recorded instead of sent.

use crate::{ChainClient, ChainError};
use async_trait::async_trait;
use delegation_types::{Address, SponsoredTransaction, TxHash};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug)]
struct MockState {
	chain_id: u64,
	nonces: HashMap<Address, u64>,
	/// `None` makes tip requests fail.
	tip: Option<u128>,
	fail_nonce_reads: bool,
	fail_broadcasts: bool,
	broadcasts: Vec<SponsoredTransaction>,
}

/// Scripted [`ChainClient`] for tests.
#[derive(Debug)]
pub struct MockChainClient {
	state: RwLock<MockState>,
}

impl MockChainClient {
	/// Creates a client on `chain_id` with a 1 gwei tip suggestion.
	pub fn new(chain_id: u64) -> Self {
		Self {
			state: RwLock::new(MockState {
				chain_id,
				nonces: HashMap::new(),
				tip: Some(1_000_000_000),
				fail_nonce_reads: false,
				fail_broadcasts: false,
				broadcasts: Vec::new(),
			}),
		}
	}

	/// Sets the nonce reported for `address`.
	pub fn with_nonce(mut self, address: Address, nonce: u64) -> Self {
		self.state.get_mut().nonces.insert(address, nonce);
		self
	}

	/// Sets the tip suggestion; `None` makes the request fail.
	pub fn with_tip(mut self, tip: Option<u128>) -> Self {
		self.state.get_mut().tip = tip;
		self
	}

	/// Makes every nonce read fail.
	pub fn with_failing_nonce_reads(mut self) -> Self {
		self.state.get_mut().fail_nonce_reads = true;
		self
	}

	/// Makes every broadcast fail.
	pub fn with_failing_broadcasts(mut self) -> Self {
		self.state.get_mut().fail_broadcasts = true;
		self
	}

	/// Changes the nonce of `address` on a shared client.
	pub async fn set_nonce(&self, address: Address, nonce: u64) {
		self.state.write().await.nonces.insert(address, nonce);
	}

	/// Returns every transaction passed to [`ChainClient::broadcast`].
	pub async fn broadcasts(&self) -> Vec<SponsoredTransaction> {
		self.state.read().await.broadcasts.clone()
	}
}

#[async_trait]
impl ChainClient for MockChainClient {
	async fn nonce_at(&self, address: Address) -> Result<u64, ChainError> {
		let state = self.state.read().await;
		if state.fail_nonce_reads {
			return Err(ChainError::Rpc("nonce unavailable".to_string()));
		}
		Ok(state.nonces.get(&address).copied().unwrap_or(0))
	}

	async fn suggest_fee_tip(&self) -> Result<u128, ChainError> {
		self.state
			.read()
			.await
			.tip
			.ok_or_else(|| ChainError::Rpc("priority fee unavailable".to_string()))
	}

	async fn chain_id(&self) -> Result<u64, ChainError> {
		Ok(self.state.read().await.chain_id)
	}

	async fn broadcast(&self, tx: &SponsoredTransaction) -> Result<TxHash, ChainError> {
		let mut state = self.state.write().await;
		if state.fail_broadcasts {
			return Err(ChainError::Broadcast("transaction rejected".to_string()));
		}
		state.broadcasts.push(tx.clone());
		Ok(*tx.hash())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_consensus::{SignableTransaction, TxEip7702};
	use alloy_signer::SignerSync;
	use alloy_signer_local::PrivateKeySigner;

	fn signed_tx() -> SponsoredTransaction {
		let signer = PrivateKeySigner::random();
		let tx = TxEip7702 {
			chain_id: 17000,
			to: Address::repeat_byte(0x11),
			..Default::default()
		};
		let signature = signer.sign_hash_sync(&tx.signature_hash()).unwrap();
		tx.into_signed(signature)
	}

	#[tokio::test]
	async fn test_scripted_reads() {
		let alice = Address::repeat_byte(0xa1);
		let client = MockChainClient::new(17000).with_nonce(alice, 5);

		assert_eq!(client.chain_id().await.unwrap(), 17000);
		assert_eq!(client.nonce_at(alice).await.unwrap(), 5);
		assert_eq!(client.nonce_at(Address::ZERO).await.unwrap(), 0);
		assert_eq!(client.suggest_fee_tip().await.unwrap(), 1_000_000_000);

		client.set_nonce(alice, 6).await;
		assert_eq!(client.nonce_at(alice).await.unwrap(), 6);
	}

	#[tokio::test]
	async fn test_scripted_failures() {
		let client = MockChainClient::new(1)
			.with_tip(None)
			.with_failing_nonce_reads()
			.with_failing_broadcasts();

		assert!(matches!(client.suggest_fee_tip().await, Err(ChainError::Rpc(_))));
		assert!(matches!(client.nonce_at(Address::ZERO).await, Err(ChainError::Rpc(_))));
		assert!(matches!(
			client.broadcast(&signed_tx()).await,
			Err(ChainError::Broadcast(_))
		));
		assert!(client.broadcasts().await.is_empty());
	}

	#[tokio::test]
	async fn test_broadcast_is_recorded() {
		let client = MockChainClient::new(17000);
		let tx = signed_tx();

		let hash = client.broadcast(&tx).await.unwrap();
		assert_eq!(hash, *tx.hash());
		assert_eq!(client.broadcasts().await.len(), 1);
	}
}
