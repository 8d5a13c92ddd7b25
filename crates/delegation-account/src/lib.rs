//! Account management module for the delegation service.
//!
//! Both parties of a sponsored transaction are accounts: the signer that
//! delegates its code and the sponsor that pays for gas. This module defines
//! the signing interface the engine works against, plus a local
//! private-key implementation used for keys supplied per request.

use async_trait::async_trait;
use delegation_types::{Address, B256};
use thiserror::Error;

pub use alloy_primitives::Signature;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

pub use implementations::local::LocalAccount;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// No key was supplied for an account that must sign.
	#[error("Missing private key")]
	MissingKey,
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
}

/// Trait defining the interface for account implementations.
///
/// Implementations sign raw 32-byte digests. Callers compute the digest
/// themselves (authorization hash, transaction signature hash) so the account
/// never needs to know what it is signing.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Address controlled by this account.
	fn address(&self) -> Address;

	/// Signs a prehashed digest with the account's key.
	async fn sign_hash(&self, hash: &B256) -> Result<Signature, AccountError>;
}

/// Returns the recovery id of `signature` as 0 or 1.
///
/// Signatures serialized in the legacy `27/28` form are shifted down.
pub fn normalized_recovery_id(signature: &Signature) -> u8 {
	let v = signature.as_bytes()[64];
	if v >= 27 {
		v - 27
	} else {
		v
	}
}
