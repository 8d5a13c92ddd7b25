//! Signing and validation of EIP-7702 authorizations.

pub mod signer;
pub mod validator;

pub use signer::{authorization_hash, sign_authorization, AUTHORIZATION_MAGIC};
pub use validator::AuthorizationValidator;
