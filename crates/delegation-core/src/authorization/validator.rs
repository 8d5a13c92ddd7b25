//! Pre-use checks on an authorization.
//!
//! Signatures are not re-verified here. The checks guard against stale,
//! cross-chain and already-consumed authorizations.

use crate::{DelegationError, TrustError};
use delegation_types::Authorization;

/// Default freshness window, in seconds.
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 300;

/// Checks an authorization against the service's chain and clock.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationValidator {
	chain_id: u64,
	max_age_seconds: u64,
}

impl AuthorizationValidator {
	pub fn new(chain_id: u64, max_age_seconds: u64) -> Self {
		Self {
			chain_id,
			max_age_seconds,
		}
	}

	pub fn max_age_seconds(&self) -> u64 {
		self.max_age_seconds
	}

	/// Runs the checks that need no chain access: presence, age at `now`,
	/// and chain id. A `created_at` in the future counts as age zero.
	pub fn check_local(&self, auth: &Authorization, now: u64) -> Result<(), DelegationError> {
		if auth.is_empty() {
			return Err(DelegationError::MissingAuthorization);
		}

		let age = now.saturating_sub(auth.created_at);
		if age > self.max_age_seconds {
			return Err(TrustError::AuthorizationExpired {
				age,
				max_age: self.max_age_seconds,
			}
			.into());
		}

		if auth.chain_id != self.chain_id {
			return Err(TrustError::ChainIdMismatch {
				expected: self.chain_id,
				got: auth.chain_id,
			}
			.into());
		}

		Ok(())
	}

	/// Compares the authorization nonce with the signer's current nonce.
	pub fn check_nonce(&self, auth: &Authorization, current: u64) -> Result<(), DelegationError> {
		if auth.nonce != current {
			return Err(TrustError::NonceMismatch {
				expected: current,
				got: auth.nonce,
			}
			.into());
		}
		Ok(())
	}
}
