//! Builder for constructing a [`DelegationService`].
//!
//! The chain client is required. The chain id is either set explicitly or
//! read from the client with [`DelegationServiceBuilder::build_with_chain_lookup`].

use crate::{
	authorization::validator::DEFAULT_MAX_AGE_SECONDS, AuthorizationValidator, DelegationError,
	DelegationService, SponsorPolicy, TrustedContracts,
};
use delegation_chain::ChainClient;
use delegation_types::Address;
use std::sync::Arc;

/// Composes a [`DelegationService`] from a chain client and policy settings.
#[derive(Default)]
pub struct DelegationServiceBuilder {
	chain: Option<Arc<dyn ChainClient>>,
	chain_id: Option<u64>,
	trusted: TrustedContracts,
	policy: SponsorPolicy,
	max_age_seconds: Option<u64>,
}

impl DelegationServiceBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_chain_client(mut self, chain: Arc<dyn ChainClient>) -> Self {
		self.chain = Some(chain);
		self
	}

	pub fn with_chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = Some(chain_id);
		self
	}

	/// Replaces the delegate allow-list.
	pub fn with_trusted_contracts(mut self, contracts: impl IntoIterator<Item = Address>) -> Self {
		self.trusted = contracts.into_iter().collect();
		self
	}

	pub fn with_policy(mut self, policy: SponsorPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn with_authorization_max_age(mut self, seconds: u64) -> Self {
		self.max_age_seconds = Some(seconds);
		self
	}

	/// Builds the service. Fails if no chain client or a zero chain id was
	/// given.
	pub fn build(self) -> Result<DelegationService, DelegationError> {
		let chain = self
			.chain
			.ok_or_else(|| DelegationError::NotInitialized("chain client not set".into()))?;
		let chain_id = match self.chain_id {
			Some(id) if id != 0 => id,
			_ => return Err(DelegationError::NotInitialized("chain id not set".into())),
		};

		if self.trusted.is_empty() {
			tracing::warn!("No trusted delegate contracts configured; all delegations will be rejected");
		}

		let max_age = self.max_age_seconds.unwrap_or(DEFAULT_MAX_AGE_SECONDS);
		Ok(DelegationService {
			chain,
			chain_id,
			trusted: self.trusted,
			policy: self.policy,
			validator: AuthorizationValidator::new(chain_id, max_age),
		})
	}

	/// Builds the service, asking the chain client for the chain id when
	/// none was set.
	pub async fn build_with_chain_lookup(mut self) -> Result<DelegationService, DelegationError> {
		if self.chain_id.is_none() {
			let chain = self
				.chain
				.as_ref()
				.ok_or_else(|| DelegationError::NotInitialized("chain client not set".into()))?;
			let chain_id = chain.chain_id().await?;
			tracing::info!(chain_id, "Resolved chain id from RPC");
			self.chain_id = Some(chain_id);
		}
		self.build()
	}
}
