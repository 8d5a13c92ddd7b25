//! Route handlers and the glue shared between them.

use axum::{extract::rejection::JsonRejection, Json};
use delegation_account::LocalAccount;
use delegation_core::{
	calldata::{encode_mint, encode_send_eth, encode_transfer},
	DelegationError, ErrorKind,
};
use delegation_types::{
	ether_to_wei, token_amount_to_base_units, APIError, Address, Bytes, SecretString, U256,
};

pub mod authorize;
pub mod build_call;
pub mod contracts;
pub mod sponsor;

/// Maps an engine error onto its HTTP status by kind.
pub fn api_error(err: DelegationError) -> APIError {
	let error_type = err.code().to_string();
	let message = err.to_string();
	match err.kind() {
		ErrorKind::Input => APIError::BadRequest {
			error_type,
			message,
			details: None,
		},
		ErrorKind::Trust => APIError::UnprocessableEntity {
			error_type,
			message,
			details: None,
		},
		ErrorKind::Chain => APIError::BadGateway {
			error_type,
			message,
		},
		ErrorKind::Internal => APIError::InternalServerError {
			error_type,
			message,
		},
	}
}

/// Unwraps a JSON body, turning extractor rejections into 400s.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, APIError> {
	payload.map(|Json(body)| body).map_err(|rejection| {
		APIError::bad_request("INVALID_JSON", format!("Invalid JSON: {}", rejection.body_text()))
	})
}

/// Loads the account for a private key supplied in a request. `role` names
/// the key in the error message.
pub fn load_account(key: &SecretString, role: &str) -> Result<LocalAccount, APIError> {
	LocalAccount::from_secret(key).map_err(|e| {
		let err = DelegationError::from(e);
		APIError::bad_request(err.code(), format!("Invalid {} private key: {}", role, err))
	})
}

/// Parses a required address field.
pub fn require_address(value: &str, field: &str) -> Result<Address, APIError> {
	if value.trim().is_empty() {
		return Err(APIError::bad_request(
			"MISSING_FIELDS",
			format!("missing required field: {}", field),
		));
	}
	delegation_types::parse_hex_address(value.trim()).ok_or_else(|| {
		APIError::bad_request("INVALID_ADDRESS", format!("invalid {}", field.replace('_', " ")))
	})
}

/// The fixed delegate functions exposed as one-shot routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	SendEth,
	Mint,
	Transfer,
}

impl Operation {
	/// Delegate function name reported in responses.
	pub fn name(&self) -> &'static str {
		match self {
			Operation::SendEth => "sendETH",
			Operation::Mint => "mint",
			Operation::Transfer => "transfer",
		}
	}

	/// Converts a decimal amount into base units: ether for `sendETH`,
	/// token units for the others.
	pub fn amount_in_base_units(&self, amount: &str, token_decimals: u8) -> Result<U256, APIError> {
		let converted = match self {
			Operation::SendEth => ether_to_wei(amount),
			Operation::Mint | Operation::Transfer => {
				token_amount_to_base_units(amount, token_decimals)
			},
		};
		converted.map_err(|e| api_error(e.into()))
	}

	/// Token contract the call targets, if any.
	pub fn token(&self, token_contract: Address) -> Option<Address> {
		match self {
			Operation::SendEth => None,
			Operation::Mint | Operation::Transfer => Some(token_contract),
		}
	}

	pub fn encode(&self, token_contract: Address, recipient: Address, amount: U256) -> Bytes {
		match self {
			Operation::SendEth => encode_send_eth(recipient, amount),
			Operation::Mint => encode_mint(token_contract, recipient, amount),
			Operation::Transfer => encode_transfer(token_contract, recipient, amount),
		}
	}

	/// ETH sent along with the call.
	pub fn call_value(&self, amount: U256) -> U256 {
		match self {
			Operation::SendEth => amount,
			Operation::Mint | Operation::Transfer => U256::ZERO,
		}
	}
}
