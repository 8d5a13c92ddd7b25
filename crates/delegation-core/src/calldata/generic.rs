//! Call data for arbitrary function signatures.
//!
//! Every parameter is a single 32-byte word. Dynamic types (`bytes`,
//! `string`), arrays and tuples are rejected here; the only array
//! parameter accepted is the call list of [`super::MULTICALL_SIGNATURE`],
//! which is routed to [`super::encode_multicall`].

use super::{encode_multicall, MULTICALL_SIGNATURE};
use alloy_primitives::{keccak256, Address, Bytes, B256, I256, U256};
use delegation_types::{decode_hex_data, is_hex_address, parse_hex_address, Call};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while encoding call data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
	#[error("Invalid function signature: {0}")]
	InvalidSignature(String),
	#[error("Wrong parameter count: signature takes {expected}, got {got}")]
	WrongParameterCount { expected: usize, got: usize },
	#[error("arrays not supported in generic encoding, use specific functions")]
	ArrayNotSupported,
	#[error("Unsupported parameter: {0}")]
	UnsupportedParameter(String),
	#[error("Invalid hex: {0}")]
	InvalidHex(String),
	#[error("Value does not fit in a 32-byte word: {0}")]
	WordOverflow(String),
	#[error("call {index}: {reason}")]
	InvalidCall { index: usize, reason: String },
	#[error("{0}")]
	InvalidExecuteParameter(String),
}

/// A single ABI word parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
	Address(Address),
	Uint(U256),
	Int(I256),
	Bool(bool),
	/// Raw bytes, left-padded to 32 bytes.
	Bytes(Bytes),
	/// Base-10 integer text, optionally negative.
	Decimal(String),
}

impl AbiParam {
	/// Interprets a string parameter: hex address first, then decimal
	/// integer, then `0x` hex bytes.
	pub fn parse_str(s: &str) -> Result<Self, EncodingError> {
		if is_hex_address(s) {
			if let Some(address) = parse_hex_address(s) {
				return Ok(AbiParam::Address(address));
			}
		}
		if is_decimal(s) {
			return Ok(AbiParam::Decimal(s.to_string()));
		}
		if s.starts_with("0x") {
			return decode_hex_data(s)
				.map(AbiParam::Bytes)
				.map_err(|e| EncodingError::InvalidHex(format!("{}: {}", s, e)));
		}
		Err(EncodingError::UnsupportedParameter(format!(
			"unsupported string format: {}",
			s
		)))
	}

	/// Converts a JSON value into a word parameter.
	pub fn from_json(value: &Value) -> Result<Self, EncodingError> {
		match value {
			Value::String(s) => Self::parse_str(s),
			Value::Bool(b) => Ok(AbiParam::Bool(*b)),
			Value::Number(n) => {
				if let Some(u) = n.as_u64() {
					Ok(AbiParam::Uint(U256::from(u)))
				} else if let Some(i) = n.as_i64() {
					Ok(AbiParam::Int(I256::from_dec_str(&i.to_string()).map_err(|e| {
						EncodingError::WordOverflow(format!("{}: {}", i, e))
					})?))
				} else {
					Err(EncodingError::UnsupportedParameter(format!(
						"non-integer number: {}",
						n
					)))
				}
			},
			Value::Array(_) => Err(EncodingError::ArrayNotSupported),
			Value::Object(_) => Err(EncodingError::UnsupportedParameter(
				"objects are not supported".to_string(),
			)),
			Value::Null => Err(EncodingError::UnsupportedParameter(
				"null is not supported".to_string(),
			)),
		}
	}

	/// Encodes the parameter as one 32-byte word.
	///
	/// Signed integers use two's complement.
	pub fn encode_word(&self) -> Result<B256, EncodingError> {
		match self {
			AbiParam::Address(address) => Ok(address.into_word()),
			AbiParam::Uint(value) => Ok(B256::from(*value)),
			AbiParam::Int(value) => Ok(B256::from(value.into_raw())),
			AbiParam::Bool(value) => Ok(B256::with_last_byte(u8::from(*value))),
			AbiParam::Bytes(bytes) => {
				if bytes.len() > 32 {
					return Err(EncodingError::WordOverflow(format!(
						"{} bytes",
						bytes.len()
					)));
				}
				let mut word = B256::ZERO;
				word[32 - bytes.len()..].copy_from_slice(bytes);
				Ok(word)
			},
			AbiParam::Decimal(text) => {
				let overflow = || EncodingError::WordOverflow(text.clone());
				if text.starts_with('-') {
					let value = I256::from_dec_str(text).map_err(|_| overflow())?;
					Ok(B256::from(value.into_raw()))
				} else {
					let value = U256::from_str_radix(text, 10).map_err(|_| overflow())?;
					Ok(B256::from(value))
				}
			},
		}
	}
}

fn is_decimal(s: &str) -> bool {
	let digits = s.strip_prefix('-').unwrap_or(s);
	!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Returns the parameter types of `signature`, e.g. `["address", "uint256"]`
/// for `transfer(address,uint256)`. Dynamic `bytes` and `string` are
/// rejected since they cannot be encoded as a single word.
fn parameter_types(signature: &str) -> Result<Vec<&str>, EncodingError> {
	let invalid = || EncodingError::InvalidSignature(signature.to_string());

	let (name, rest) = signature.split_once('(').ok_or_else(invalid)?;
	let params = rest.strip_suffix(')').ok_or_else(invalid)?;
	if name.trim().is_empty() {
		return Err(invalid());
	}
	if params.contains(['(', ')', '[', ']']) {
		return Err(EncodingError::ArrayNotSupported);
	}
	if params.trim().is_empty() {
		return Ok(Vec::new());
	}

	let types: Vec<&str> = params.split(',').map(str::trim).collect();
	if types.iter().any(|t| t.is_empty()) {
		return Err(invalid());
	}
	if let Some(dynamic) = types.iter().find(|t| matches!(**t, "bytes" | "string")) {
		return Err(EncodingError::UnsupportedParameter(format!(
			"dynamic type '{}' is not supported in generic encoding",
			dynamic
		)));
	}
	Ok(types)
}

/// Encodes `selector(signature) || word(param)*`.
pub fn encode_generic(signature: &str, params: &[AbiParam]) -> Result<Bytes, EncodingError> {
	let types = parameter_types(signature)?;
	if types.len() != params.len() {
		return Err(EncodingError::WrongParameterCount {
			expected: types.len(),
			got: params.len(),
		});
	}

	let mut data = Vec::with_capacity(4 + 32 * params.len());
	data.extend_from_slice(&keccak256(signature.as_bytes())[..4]);
	for param in params {
		data.extend_from_slice(param.encode_word()?.as_slice());
	}
	Ok(data.into())
}

/// Builds call data from a signature and JSON parameters.
///
/// The multicall signature takes a single array of `{data, to, value}`
/// objects; any other signature goes through [`encode_generic`].
pub fn build_generic_call(signature: &str, params: &[Value]) -> Result<Bytes, EncodingError> {
	if signature == MULTICALL_SIGNATURE {
		return build_execute_call(params);
	}

	let params = params
		.iter()
		.map(AbiParam::from_json)
		.collect::<Result<Vec<_>, _>>()?;
	encode_generic(signature, &params)
}

fn build_execute_call(params: &[Value]) -> Result<Bytes, EncodingError> {
	let [param] = params else {
		return Err(EncodingError::InvalidExecuteParameter(
			"execute expects exactly 1 parameter (array of calls)".to_string(),
		));
	};
	let entries = param.as_array().ok_or_else(|| {
		EncodingError::InvalidExecuteParameter("execute parameter must be an array".to_string())
	})?;

	let calls = entries
		.iter()
		.enumerate()
		.map(|(index, entry)| parse_batch_entry(index, entry))
		.collect::<Result<Vec<_>, _>>()?;

	Ok(encode_multicall(&calls))
}

fn parse_batch_entry(index: usize, entry: &Value) -> Result<Call, EncodingError> {
	let fail = |reason: String| EncodingError::InvalidCall { index, reason };

	let object = entry
		.as_object()
		.ok_or_else(|| fail("must be an object".to_string()))?;
	let field = |name: &str| {
		object
			.get(name)
			.and_then(Value::as_str)
			.ok_or_else(|| fail(format!("'{}' must be a string", name)))
	};

	let data = field("data")?;
	let to = field("to")?;
	let value = field("value")?;

	let data = decode_hex_data(data).map_err(|e| fail(format!("invalid data hex: {}", e)))?;
	let to = parse_hex_address(to).ok_or_else(|| fail(format!("invalid address: {}", to)))?;
	let value =
		U256::from_str_radix(value, 10).map_err(|_| fail(format!("invalid value: {}", value)))?;

	Ok(Call::new(to, data).with_value(value))
}
