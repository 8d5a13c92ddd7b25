//! JSON-RPC chain client built on the Alloy provider.

use crate::{ChainClient, ChainError};
use alloy_consensus::TxEnvelope;
use alloy_eips::{eip2718::Encodable2718, BlockId};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use delegation_types::{truncate_id, Address, SponsoredTransaction, TxHash};

/// Chain client talking to a single node over HTTP.
///
/// Transactions arrive already signed by the sponsor, so the provider carries
/// no wallet and is only used for reads and raw submission.
#[derive(Clone)]
pub struct AlloyChainClient {
	provider: DynProvider,
}

impl AlloyChainClient {
	/// Creates a client for the node at `rpc_url`.
	pub fn new(rpc_url: &str) -> Result<Self, ChainError> {
		let url = rpc_url
			.parse()
			.map_err(|e| ChainError::InvalidUrl(format!("{}: {}", rpc_url, e)))?;

		let provider = ProviderBuilder::new().connect_http(url).erased();

		Ok(Self { provider })
	}
}

#[async_trait]
impl ChainClient for AlloyChainClient {
	async fn nonce_at(&self, address: Address) -> Result<u64, ChainError> {
		self.provider
			.get_transaction_count(address)
			.block_id(BlockId::latest())
			.await
			.map_err(|e| ChainError::Rpc(format!("Failed to get nonce for {}: {}", address, e)))
	}

	async fn suggest_fee_tip(&self) -> Result<u128, ChainError> {
		self.provider
			.get_max_priority_fee_per_gas()
			.await
			.map_err(|e| ChainError::Rpc(format!("Failed to get priority fee: {}", e)))
	}

	async fn chain_id(&self) -> Result<u64, ChainError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| ChainError::Rpc(format!("Failed to get chain id: {}", e)))
	}

	async fn broadcast(&self, tx: &SponsoredTransaction) -> Result<TxHash, ChainError> {
		let encoded = TxEnvelope::from(tx.clone()).encoded_2718();

		let pending = self
			.provider
			.send_raw_transaction(&encoded)
			.await
			.map_err(|e| ChainError::Broadcast(e.to_string()))?;

		let tx_hash = *pending.tx_hash();
		tracing::info!(
			tx_hash = %tx_hash,
			to = %truncate_id(&tx.tx().to.to_string()),
			"Submitted sponsored transaction"
		);

		Ok(tx_hash)
	}
}
