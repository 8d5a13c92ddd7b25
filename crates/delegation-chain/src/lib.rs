//! Chain access module for the delegation service.
//!
//! The engine reads exactly three facts from the chain (an account nonce, a
//! priority-fee suggestion and the chain id) and hands signed transactions
//! back for broadcast. This module defines that capability as a trait so the
//! engine can run against a JSON-RPC node or a scripted fake.

use async_trait::async_trait;
use delegation_types::{Address, SponsoredTransaction, TxHash};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
	pub mod mock;
}

pub use implementations::evm::alloy::AlloyChainClient;
pub use implementations::mock::MockChainClient;

/// Errors that can occur while talking to the chain.
#[derive(Debug, Error)]
pub enum ChainError {
	/// A read request to the node failed.
	#[error("RPC error: {0}")]
	Rpc(String),
	/// The configured endpoint is not a valid URL.
	#[error("Invalid RPC URL: {0}")]
	InvalidUrl(String),
	/// The node refused or failed to accept a transaction.
	#[error("Broadcast failed: {0}")]
	Broadcast(String),
}

/// Trait defining the chain operations the engine depends on.
///
/// Implementations are shared across concurrent requests and must not hold
/// per-request state.
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Returns the transaction count of `address` at the latest block.
	async fn nonce_at(&self, address: Address) -> Result<u64, ChainError>;

	/// Returns the node's suggested priority fee per gas, in wei.
	async fn suggest_fee_tip(&self) -> Result<u128, ChainError>;

	/// Returns the chain id reported by the node.
	async fn chain_id(&self) -> Result<u64, ChainError>;

	/// Submits a signed sponsored transaction and returns its hash.
	async fn broadcast(&self, tx: &SponsoredTransaction) -> Result<TxHash, ChainError>;
}
