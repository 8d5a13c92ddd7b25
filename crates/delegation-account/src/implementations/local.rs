//! Local private-key account.

use crate::{AccountError, AccountInterface, Signature};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use delegation_types::{Address, SecretString, B256};

/// An account backed by an in-memory secp256k1 key.
#[derive(Clone)]
pub struct LocalAccount {
	signer: PrivateKeySigner,
}

impl std::fmt::Debug for LocalAccount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LocalAccount")
			.field("address", &self.signer.address())
			.finish_non_exhaustive()
	}
}

impl LocalAccount {
	/// Parses a hex private key, with or without the `0x` prefix.
	pub fn from_secret(key: &SecretString) -> Result<Self, AccountError> {
		if key.is_empty() {
			return Err(AccountError::MissingKey);
		}
		let signer = key
			.with_exposed(|k| k.trim().parse::<PrivateKeySigner>())
			.map_err(|e| AccountError::InvalidKey(e.to_string()))?;
		Ok(Self { signer })
	}

	/// Creates an account with a freshly generated key.
	pub fn random() -> Self {
		Self {
			signer: PrivateKeySigner::random(),
		}
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	fn address(&self) -> Address {
		self.signer.address()
	}

	async fn sign_hash(&self, hash: &B256) -> Result<Signature, AccountError> {
		self.signer
			.sign_hash_sync(hash)
			.map_err(|e| AccountError::SigningFailed(e.to_string()))
	}
}
