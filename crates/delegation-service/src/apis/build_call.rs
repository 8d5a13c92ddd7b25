//! `POST /api/build-call/*`: call data only, nothing is signed.

use super::{api_error, json_body, require_address, Operation};
use crate::server::AppState;
use axum::{
	extract::{rejection::JsonRejection, State},
	Json,
};
use delegation_core::calldata::build_generic_call;
use delegation_types::{
	APIError, BuildCallRequest, BuildCallResponse, BuildGenericRequest, BuildGenericResponse,
};

pub async fn handle_build_send_eth(
	state: State<AppState>,
	payload: Result<Json<BuildCallRequest>, JsonRejection>,
) -> Result<Json<BuildCallResponse>, APIError> {
	build_operation(state, payload, Operation::SendEth)
}

pub async fn handle_build_mint(
	state: State<AppState>,
	payload: Result<Json<BuildCallRequest>, JsonRejection>,
) -> Result<Json<BuildCallResponse>, APIError> {
	build_operation(state, payload, Operation::Mint)
}

pub async fn handle_build_transfer(
	state: State<AppState>,
	payload: Result<Json<BuildCallRequest>, JsonRejection>,
) -> Result<Json<BuildCallResponse>, APIError> {
	build_operation(state, payload, Operation::Transfer)
}

fn build_operation(
	State(state): State<AppState>,
	payload: Result<Json<BuildCallRequest>, JsonRejection>,
	operation: Operation,
) -> Result<Json<BuildCallResponse>, APIError> {
	let request = json_body(payload)?;
	if request.amount.trim().is_empty() {
		return Err(APIError::bad_request(
			"MISSING_FIELDS",
			"missing required fields",
		));
	}
	let recipient = require_address(&request.recipient, "recipient")?;
	let amount_wei = operation.amount_in_base_units(&request.amount, state.token_decimals)?;

	Ok(Json(BuildCallResponse {
		call_data: operation.encode(state.token_contract, recipient, amount_wei),
		function: operation.name().to_string(),
		token_address: operation.token(state.token_contract),
		recipient,
		amount: request.amount,
		amount_wei,
	}))
}

pub async fn handle_build_generic(
	payload: Result<Json<BuildGenericRequest>, JsonRejection>,
) -> Result<Json<BuildGenericResponse>, APIError> {
	let request = json_body(payload)?;
	let call_data = build_generic_call(&request.function_signature, &request.parameters)
		.map_err(|e| {
			tracing::debug!("Failed to build call data: {}", e);
			api_error(e.into())
		})?;

	Ok(Json(BuildGenericResponse {
		call_data,
		function_signature: request.function_signature,
		parameters: request.parameters,
	}))
}
