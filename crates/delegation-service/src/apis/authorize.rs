//! `POST /api/authorize`: signs a delegation without executing anything.

use super::{api_error, json_body, load_account, require_address};
use crate::server::AppState;
use axum::{
	extract::{rejection::JsonRejection, State},
	Json,
};
use delegation_account::AccountInterface;
use delegation_types::{APIError, AuthorizeRequest, AuthorizeResponse};

pub async fn handle_authorize(
	State(state): State<AppState>,
	payload: Result<Json<AuthorizeRequest>, JsonRejection>,
) -> Result<Json<AuthorizeResponse>, APIError> {
	let request = json_body(payload)?;
	let delegate = require_address(&request.contract_address, "contract_address")?;
	let signer = load_account(&request.signer_pk, "signer")?;

	let authorization = state
		.service
		.sign_delegation(delegate, &signer)
		.await
		.map_err(|e| {
			tracing::warn!("Authorization request failed: {}", e);
			api_error(e)
		})?;

	Ok(Json(AuthorizeResponse {
		authorization,
		signer_address: signer.address(),
	}))
}
