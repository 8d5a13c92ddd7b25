//! API types for the delegation HTTP API.
//!
//! Request bodies use snake_case field names. Every field of a request
//! defaults when absent so that handlers can report which one is missing
//! instead of failing on JSON shape.

use crate::{
	authorization::Authorization, call::Call, decode_hex_data, parse_hex_address,
	secret_string::SecretString, TxHash,
};
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request to sign a delegation to `contract_address`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeRequest {
	#[serde(default)]
	pub contract_address: String,
	#[serde(default)]
	pub signer_pk: SecretString,
}

/// Signed delegation and the address of the key that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeResponse {
	pub authorization: Authorization,
	pub signer_address: Address,
}

/// One call of a sponsor request, as strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallRequest {
	#[serde(default)]
	pub to: String,
	/// Hex call data; "" and "0x" mean empty.
	#[serde(default)]
	pub data: String,
	/// Base-10 wei amount; empty means zero.
	#[serde(default)]
	pub value: String,
}

impl CallRequest {
	/// Parses the call at position `index` of a request.
	pub fn to_call(&self, index: usize) -> Result<Call, APIError> {
		let to = parse_hex_address(&self.to).ok_or_else(|| {
			APIError::bad_request("INVALID_CALL", format!("Invalid address in call {}", index))
		})?;
		let data = decode_hex_data(&self.data).map_err(|_| {
			APIError::bad_request("INVALID_CALL", format!("Invalid data in call {}", index))
		})?;
		let value = match self.value.trim() {
			"" => U256::ZERO,
			v => U256::from_str_radix(v, 10).map_err(|_| {
				APIError::bad_request("INVALID_CALL", format!("Invalid value in call {}", index))
			})?,
		};

		Ok(Call::new(to, data).with_value(value))
	}
}

/// Request to execute an already signed delegation with a list of calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SponsorRequest {
	#[serde(default)]
	pub authorization: Authorization,
	#[serde(default)]
	pub calls: Vec<CallRequest>,
	#[serde(default)]
	pub sponsor_pk: SecretString,
}

/// Hash of the broadcast sponsored transaction and who paid for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SponsorResponse {
	pub tx_hash: TxHash,
	pub sponsor: Address,
}

/// Request shared by the one-shot sponsor routes (send ETH, mint, transfer).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicSponsorRequest {
	#[serde(default)]
	pub signer_pk: SecretString,
	#[serde(default)]
	pub sponsor_pk: SecretString,
	#[serde(default)]
	pub recipient: String,
	/// Decimal amount in ether or whole tokens.
	#[serde(default)]
	pub amount: String,
}

impl BasicSponsorRequest {
	/// Checks that all fields are present and that the recipient is an address.
	pub fn validate(&self) -> Result<Address, APIError> {
		if self.signer_pk.is_empty()
			|| self.sponsor_pk.is_empty()
			|| self.recipient.trim().is_empty()
			|| self.amount.trim().is_empty()
		{
			return Err(APIError::bad_request(
				"MISSING_FIELDS",
				"missing required fields",
			));
		}
		parse_hex_address(&self.recipient)
			.ok_or_else(|| APIError::bad_request("INVALID_RECIPIENT", "invalid recipient address"))
	}
}

/// Result of a one-shot sponsor route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicSponsorResponse {
	pub tx_hash: TxHash,
	pub operation: String,
	pub recipient: Address,
	pub amount: String,
	#[serde(with = "u256_serde")]
	pub amount_wei: U256,
	pub authorization: Authorization,
}

/// Request to delegate to `contract_address` and call an arbitrary function
/// of it on the signer's account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenericSponsorRequest {
	#[serde(default)]
	pub signer_pk: SecretString,
	#[serde(default)]
	pub sponsor_pk: SecretString,
	#[serde(default)]
	pub contract_address: String,
	#[serde(default)]
	pub function_signature: String,
	#[serde(default)]
	pub parameters: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericSponsorResponse {
	pub tx_hash: TxHash,
	pub authorization: Authorization,
	pub call_data: Bytes,
	pub function: String,
}

/// Request for call data of one of the fixed delegate functions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildCallRequest {
	#[serde(default)]
	pub recipient: String,
	#[serde(default)]
	pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildCallResponse {
	pub call_data: Bytes,
	pub function: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub token_address: Option<Address>,
	pub recipient: Address,
	pub amount: String,
	#[serde(with = "u256_serde")]
	pub amount_wei: U256,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildGenericRequest {
	#[serde(default)]
	pub function_signature: String,
	#[serde(default)]
	pub parameters: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildGenericResponse {
	pub call_data: Bytes,
	pub function_signature: String,
	pub parameters: Vec<serde_json::Value>,
}

/// Deployed contracts the service works with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsResponse {
	pub token_contract: Address,
	pub simple_delegate_contract: Address,
	pub network: String,
	pub chain_id: u64,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Malformed or missing input (400)
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Input rejected by a trust check such as an untrusted delegate or a
	/// stale authorization (422)
	UnprocessableEntity {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// The chain node failed or rejected the request (502)
	BadGateway { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Shorthand for a [`APIError::BadRequest`] without details.
	pub fn bad_request(error_type: impl Into<String>, message: impl Into<String>) -> Self {
		APIError::BadRequest {
			error_type: error_type.into(),
			message: message.into(),
			details: None,
		}
	}

	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::UnprocessableEntity { .. } => 422,
			APIError::BadGateway { .. } => 502,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			APIError::BadRequest {
				error_type,
				message,
				details,
			}
			| APIError::UnprocessableEntity {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
			},
			APIError::BadGateway {
				error_type,
				message,
			}
			| APIError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
			},
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::UnprocessableEntity { message, .. } => {
				write!(f, "Unprocessable Entity: {}", message)
			},
			APIError::BadGateway { message, .. } => write!(f, "Bad Gateway: {}", message),
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self.to_error_response())).into_response()
	}
}

/// Serde module for U256 as a base-10 string.
pub mod u256_serde {
	use alloy_primitives::U256;
	use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

	pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		value.to_string().serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		U256::from_str_radix(&s, 10).map_err(D::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn test_call_request_parsing() {
		let req = CallRequest {
			to: "0x93d77bE58A977350B924C0694242b075eB26AEdE".into(),
			data: "0x".into(),
			value: String::new(),
		};
		let call = req.to_call(0).unwrap();
		assert_eq!(call.to, address!("93d77bE58A977350B924C0694242b075eB26AEdE"));
		assert!(call.data.is_empty());
		assert_eq!(call.value, U256::ZERO);
		assert_eq!(call.gas_limit, None);

		let req = CallRequest {
			value: "1000".into(),
			data: "a9059cbb".into(),
			..req
		};
		let call = req.to_call(0).unwrap();
		assert_eq!(call.value, U256::from(1000u64));
		assert_eq!(call.data.len(), 4);
	}

	#[test]
	fn test_call_request_errors_name_the_index() {
		let bad_to = CallRequest {
			to: "0x1234".into(),
			..Default::default()
		};
		let err = bad_to.to_call(2).unwrap_err();
		assert_eq!(err.status_code(), 400);
		assert!(err.to_string().contains("call 2"));

		let bad_value = CallRequest {
			to: "0x93d77bE58A977350B924C0694242b075eB26AEdE".into(),
			value: "1.5".into(),
			..Default::default()
		};
		assert!(bad_value.to_call(1).unwrap_err().to_string().contains("value in call 1"));
	}

	#[test]
	fn test_basic_request_validation() {
		let req: BasicSponsorRequest = serde_json::from_str(r#"{"signer_pk":"0x01"}"#).unwrap();
		assert!(req.validate().unwrap_err().to_string().contains("missing required fields"));

		let req = BasicSponsorRequest {
			signer_pk: "0x01".into(),
			sponsor_pk: "0x02".into(),
			recipient: "not-an-address".into(),
			amount: "1".into(),
		};
		assert!(req.validate().unwrap_err().to_string().contains("invalid recipient"));
	}

	#[test]
	fn test_error_response_shape() {
		let err = APIError::UnprocessableEntity {
			error_type: "UNTRUSTED_DELEGATE".into(),
			message: "delegate not trusted".into(),
			details: None,
		};
		assert_eq!(err.status_code(), 422);
		let json = serde_json::to_value(err.to_error_response()).unwrap();
		assert_eq!(json["error"], "UNTRUSTED_DELEGATE");
		assert!(json.get("details").is_none());
	}

	#[test]
	fn test_u256_serde_as_decimal_string() {
		#[derive(Serialize, Deserialize)]
		struct Wrapper {
			#[serde(with = "u256_serde")]
			value: U256,
		}
		let json = serde_json::to_string(&Wrapper {
			value: U256::from(1_500_000_000_000_000_000u128),
		})
		.unwrap();
		assert_eq!(json, r#"{"value":"1500000000000000000"}"#);
	}
}
