//! Sponsored execution routes.
//!
//! `/sponsor` executes a previously signed authorization with arbitrary
//! calls. The other routes sign a fresh delegation and execute a single call
//! on the signer's own account in one request.

use super::{api_error, json_body, load_account, require_address, Operation};
use crate::server::AppState;
use axum::{
	extract::{rejection::JsonRejection, State},
	Json,
};
use delegation_account::{AccountInterface, LocalAccount};
use delegation_core::calldata::build_generic_call;
use delegation_types::{
	APIError, Address, Authorization, BasicSponsorRequest, BasicSponsorResponse, Call,
	GenericSponsorRequest, GenericSponsorResponse, SponsorRequest, SponsorResponse, TxHash,
};

pub async fn handle_sponsor(
	State(state): State<AppState>,
	payload: Result<Json<SponsorRequest>, JsonRejection>,
) -> Result<Json<SponsorResponse>, APIError> {
	let request = json_body(payload)?;
	let sponsor = load_account(&request.sponsor_pk, "sponsor")?;
	let calls = request
		.calls
		.iter()
		.enumerate()
		.map(|(index, call)| call.to_call(index))
		.collect::<Result<Vec<_>, _>>()?;

	let tx_hash = execute(&state, &request.authorization, &calls, &sponsor).await?;

	Ok(Json(SponsorResponse {
		tx_hash,
		sponsor: sponsor.address(),
	}))
}

pub async fn handle_sponsor_eth(
	state: State<AppState>,
	payload: Result<Json<BasicSponsorRequest>, JsonRejection>,
) -> Result<Json<BasicSponsorResponse>, APIError> {
	sponsor_operation(state, payload, Operation::SendEth).await
}

pub async fn handle_sponsor_mint(
	state: State<AppState>,
	payload: Result<Json<BasicSponsorRequest>, JsonRejection>,
) -> Result<Json<BasicSponsorResponse>, APIError> {
	sponsor_operation(state, payload, Operation::Mint).await
}

pub async fn handle_sponsor_transfer(
	state: State<AppState>,
	payload: Result<Json<BasicSponsorRequest>, JsonRejection>,
) -> Result<Json<BasicSponsorResponse>, APIError> {
	sponsor_operation(state, payload, Operation::Transfer).await
}

async fn sponsor_operation(
	State(state): State<AppState>,
	payload: Result<Json<BasicSponsorRequest>, JsonRejection>,
	operation: Operation,
) -> Result<Json<BasicSponsorResponse>, APIError> {
	let request = json_body(payload)?;
	let recipient = request.validate()?;
	let signer = load_account(&request.signer_pk, "signer")?;
	let sponsor = load_account(&request.sponsor_pk, "sponsor")?;
	let amount_wei = operation.amount_in_base_units(&request.amount, state.token_decimals)?;

	let authorization = sign(&state, state.delegate_contract, &signer).await?;
	let call = Call::new(
		authorization.signer,
		operation.encode(state.token_contract, recipient, amount_wei),
	)
	.with_value(operation.call_value(amount_wei));

	let tx_hash = execute(&state, &authorization, &[call], &sponsor).await?;
	tracing::info!(
		operation = operation.name(),
		%tx_hash,
		"Sponsored operation submitted"
	);

	Ok(Json(BasicSponsorResponse {
		tx_hash,
		operation: operation.name().to_string(),
		recipient,
		amount: request.amount,
		amount_wei,
		authorization,
	}))
}

pub async fn handle_sponsor_generic(
	State(state): State<AppState>,
	payload: Result<Json<GenericSponsorRequest>, JsonRejection>,
) -> Result<Json<GenericSponsorResponse>, APIError> {
	let request = json_body(payload)?;
	if request.signer_pk.is_empty()
		|| request.sponsor_pk.is_empty()
		|| request.function_signature.trim().is_empty()
	{
		return Err(APIError::bad_request(
			"MISSING_FIELDS",
			"missing required fields",
		));
	}
	let delegate = require_address(&request.contract_address, "contract_address")?;
	let signer = load_account(&request.signer_pk, "signer")?;
	let sponsor = load_account(&request.sponsor_pk, "sponsor")?;

	let call_data = build_generic_call(&request.function_signature, &request.parameters)
		.map_err(|e| api_error(e.into()))?;

	let authorization = sign(&state, delegate, &signer).await?;
	let call = Call::new(authorization.signer, call_data.clone());
	let tx_hash = execute(&state, &authorization, &[call], &sponsor).await?;

	Ok(Json(GenericSponsorResponse {
		tx_hash,
		authorization,
		call_data,
		function: request.function_signature,
	}))
}

async fn sign(
	state: &AppState,
	delegate: Address,
	signer: &LocalAccount,
) -> Result<Authorization, APIError> {
	state
		.service
		.sign_delegation(delegate, signer)
		.await
		.map_err(|e| {
			tracing::warn!("Failed to create authorization: {}", e);
			api_error(e)
		})
}

/// Builds, signs and broadcasts the sponsored transaction.
async fn execute(
	state: &AppState,
	authorization: &Authorization,
	calls: &[Call],
	sponsor: &LocalAccount,
) -> Result<TxHash, APIError> {
	let service = &state.service;
	let tx = service
		.execute_sponsored(authorization, calls, sponsor)
		.await
		.map_err(|e| {
			tracing::warn!("Failed to execute sponsored transaction: {}", e);
			api_error(e)
		})?;

	service.broadcast(&tx).await.map_err(|e| {
		tracing::warn!("Failed to send transaction: {}", e);
		api_error(e)
	})
}
