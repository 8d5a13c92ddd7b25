//! `GET /api/contracts`

use crate::server::AppState;
use axum::{extract::State, Json};
use delegation_types::ContractsResponse;

pub async fn handle_contracts(State(state): State<AppState>) -> Json<ContractsResponse> {
	Json(ContractsResponse {
		token_contract: state.token_contract,
		simple_delegate_contract: state.delegate_contract,
		network: state.network.clone(),
		chain_id: state.service.chain_id(),
	})
}
