//! Core engine for EIP-7702 delegation and sponsored execution.
//!
//! The engine signs authorizations that delegate an EOA's code to a trusted
//! contract, checks them before use, encodes call data for the delegate and
//! builds the sponsor-paid set-code transaction that carries both. Chain
//! state is read through an injected [`ChainClient`]; the engine itself keeps
//! no state between calls.

use alloy_primitives::U256;
use delegation_account::{AccountError, AccountInterface};
use delegation_chain::{ChainClient, ChainError};
use delegation_types::{
	current_timestamp, truncate_id, Address, Authorization, Call, SponsoredTransaction, TxHash,
	UnitError,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

pub mod authorization;
pub mod builder;
pub mod calldata;
pub mod sponsor;

pub use authorization::AuthorizationValidator;
pub use builder::DelegationServiceBuilder;
pub use calldata::{AbiParam, EncodingError};
pub use sponsor::SponsorPolicy;

/// Rejections of an otherwise well-formed request on security grounds.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrustError {
	#[error("unknown/untrusted contract: {0}")]
	UntrustedDelegate(Address),
	#[error("chain ID mismatch: expected {expected}, got {got}")]
	ChainIdMismatch { expected: u64, got: u64 },
	#[error("authorization too old: {age}s exceeds {max_age}s")]
	AuthorizationExpired { age: u64, max_age: u64 },
	#[error("nonce mismatch: expected {expected}, got {got}")]
	NonceMismatch { expected: u64, got: u64 },
}

/// Errors that can occur during delegation operations.
#[derive(Debug, Error)]
pub enum DelegationError {
	#[error("Service not initialized: {0}")]
	NotInitialized(String),
	#[error(transparent)]
	Account(#[from] AccountError),
	#[error("Contract address is zero")]
	ZeroDelegate,
	#[error("Authorization missing")]
	MissingAuthorization,
	#[error(transparent)]
	Trust(#[from] TrustError),
	#[error("No calls provided")]
	NoCalls,
	#[error("Call {index} has zero address")]
	ZeroCallTarget { index: usize },
	#[error("Total value too high: {total} exceeds cap {cap}")]
	ValueCapExceeded { total: String, cap: U256 },
	#[error(transparent)]
	Encoding(#[from] EncodingError),
	#[error("Invalid amount: {0}")]
	Amount(#[from] UnitError),
	#[error("Chain error: {0}")]
	Chain(#[from] ChainError),
}

/// Broad classes of [`DelegationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Malformed or missing caller input.
	Input,
	/// Security check failed; the caller may re-authorize.
	Trust,
	/// The chain node failed.
	Chain,
	/// Misconfiguration or signing failure.
	Internal,
}

impl DelegationError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			DelegationError::NotInitialized(_) => ErrorKind::Internal,
			DelegationError::Account(AccountError::SigningFailed(_)) => ErrorKind::Internal,
			DelegationError::Account(_) => ErrorKind::Input,
			DelegationError::ZeroDelegate
			| DelegationError::MissingAuthorization
			| DelegationError::NoCalls
			| DelegationError::ZeroCallTarget { .. }
			| DelegationError::Encoding(_)
			| DelegationError::Amount(_) => ErrorKind::Input,
			DelegationError::Trust(_) | DelegationError::ValueCapExceeded { .. } => {
				ErrorKind::Trust
			},
			DelegationError::Chain(_) => ErrorKind::Chain,
		}
	}

	/// Stable machine-readable code for API responses.
	pub fn code(&self) -> &'static str {
		match self {
			DelegationError::NotInitialized(_) => "NOT_INITIALIZED",
			DelegationError::Account(AccountError::MissingKey) => "MISSING_KEY",
			DelegationError::Account(AccountError::InvalidKey(_)) => "INVALID_KEY",
			DelegationError::Account(AccountError::SigningFailed(_)) => "SIGNING_FAILED",
			DelegationError::ZeroDelegate => "ZERO_DELEGATE",
			DelegationError::MissingAuthorization => "MISSING_AUTHORIZATION",
			DelegationError::Trust(TrustError::UntrustedDelegate(_)) => "UNTRUSTED_DELEGATE",
			DelegationError::Trust(TrustError::ChainIdMismatch { .. }) => "CHAIN_ID_MISMATCH",
			DelegationError::Trust(TrustError::AuthorizationExpired { .. }) => {
				"AUTHORIZATION_EXPIRED"
			},
			DelegationError::Trust(TrustError::NonceMismatch { .. }) => "NONCE_MISMATCH",
			DelegationError::NoCalls => "NO_CALLS",
			DelegationError::ZeroCallTarget { .. } => "ZERO_CALL_TARGET",
			DelegationError::ValueCapExceeded { .. } => "VALUE_CAP_EXCEEDED",
			DelegationError::Encoding(_) => "ENCODING_ERROR",
			DelegationError::Amount(_) => "INVALID_AMOUNT",
			DelegationError::Chain(ChainError::Broadcast(_)) => "BROADCAST_FAILED",
			DelegationError::Chain(_) => "CHAIN_ERROR",
		}
	}
}

/// Delegate contracts a signer may authorize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedContracts(HashSet<Address>);

impl TrustedContracts {
	pub fn new(contracts: impl IntoIterator<Item = Address>) -> Self {
		Self(contracts.into_iter().collect())
	}

	pub fn contains(&self, address: &Address) -> bool {
		self.0.contains(address)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Address> {
		self.0.iter()
	}
}

impl FromIterator<Address> for TrustedContracts {
	fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
		Self::new(iter)
	}
}

/// Delegation and sponsorship operations over one chain.
///
/// Cheap to share behind an `Arc`; concurrent calls are independent. Two
/// concurrent requests for the same account race on the nonce read and the
/// chain decides which one lands.
pub struct DelegationService {
	chain: Arc<dyn ChainClient>,
	chain_id: u64,
	trusted: TrustedContracts,
	policy: SponsorPolicy,
	validator: AuthorizationValidator,
}

impl DelegationService {
	/// Starts building a service.
	pub fn builder() -> DelegationServiceBuilder {
		DelegationServiceBuilder::new()
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	pub fn trusted_contracts(&self) -> &TrustedContracts {
		&self.trusted
	}

	pub fn policy(&self) -> &SponsorPolicy {
		&self.policy
	}

	/// Signs a delegation of `signer`'s code to `delegate` at the signer's
	/// current nonce.
	#[instrument(skip_all, fields(signer = %truncate_id(&signer.address().to_string()), delegate = %truncate_id(&delegate.to_string())))]
	pub async fn sign_delegation(
		&self,
		delegate: Address,
		signer: &dyn AccountInterface,
	) -> Result<Authorization, DelegationError> {
		if delegate.is_zero() {
			return Err(DelegationError::ZeroDelegate);
		}
		if !self.trusted.contains(&delegate) {
			return Err(TrustError::UntrustedDelegate(delegate).into());
		}

		let nonce = self.chain.nonce_at(signer.address()).await?;
		let auth =
			authorization::sign_authorization(self.chain_id, delegate, nonce, signer).await?;

		tracing::info!(nonce = auth.nonce, chain_id = auth.chain_id, "Signed authorization");
		Ok(auth)
	}

	/// Checks that `auth` is present, fresh, for this chain and still at the
	/// signer's current nonce.
	#[instrument(skip_all, fields(signer = %truncate_id(&auth.signer.to_string())))]
	pub async fn validate_authorization(&self, auth: &Authorization) -> Result<(), DelegationError> {
		self.validator.check_local(auth, current_timestamp())?;
		let current = self.chain.nonce_at(auth.signer).await?;
		self.validator.check_nonce(auth, current)
	}

	/// Validates `auth` and `calls`, then builds and signs the sponsored
	/// transaction. Nothing is broadcast.
	#[instrument(skip_all, fields(signer = %truncate_id(&auth.signer.to_string()), sponsor = %truncate_id(&sponsor.address().to_string()), calls = calls.len()))]
	pub async fn execute_sponsored(
		&self,
		auth: &Authorization,
		calls: &[Call],
		sponsor: &dyn AccountInterface,
	) -> Result<SponsoredTransaction, DelegationError> {
		if let Err(e) = self.validate_authorization(auth).await {
			tracing::warn!(error = %e, "Rejected authorization");
			return Err(e);
		}
		sponsor::validate_calls(calls, self.policy.max_total_value)?;

		let sponsor_nonce = self.chain.nonce_at(sponsor.address()).await?;
		let priority_fee = match self.chain.suggest_fee_tip().await {
			Ok(tip) => tip,
			Err(e) => {
				tracing::warn!(
					error = %e,
					fallback = self.policy.fallback_priority_fee,
					"Priority fee suggestion failed, using fallback"
				);
				self.policy.fallback_priority_fee
			},
		};

		let context = sponsor::SponsorContext {
			chain_id: self.chain_id,
			sponsor_nonce,
			priority_fee,
		};
		let tx =
			sponsor::build_sponsored_transaction(context, auth, calls, &self.policy, sponsor)
				.await?;

		tracing::debug!(
			gas_limit = tx.tx().gas_limit,
			max_fee_per_gas = tx.tx().max_fee_per_gas,
			"Gas parameters selected"
		);
		tracing::info!(tx_hash = %tx.hash(), nonce = sponsor_nonce, "Built sponsored transaction");
		Ok(tx)
	}

	/// Submits a signed transaction through the chain client. Failures are
	/// returned as-is, without retry.
	pub async fn broadcast(&self, tx: &SponsoredTransaction) -> Result<TxHash, DelegationError> {
		Ok(self.chain.broadcast(tx).await?)
	}
}
