//! HTTP server for the delegation API.

use crate::apis;
use axum::{
	routing::{get, post},
	Router,
};
use delegation_config::{ApiConfig, Config};
use delegation_core::DelegationService;
use delegation_types::Address;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Engine serving every route.
	pub service: Arc<DelegationService>,
	/// Contract the one-shot routes delegate to.
	pub delegate_contract: Address,
	/// Token targeted by the mint and transfer routes.
	pub token_contract: Address,
	pub token_decimals: u8,
	/// Network name reported by `/contracts`.
	pub network: String,
}

impl AppState {
	pub fn new(service: Arc<DelegationService>, config: &Config) -> Self {
		Self {
			service,
			delegate_contract: config.delegation.delegate_contract,
			token_contract: config.delegation.token_contract,
			token_decimals: config.delegation.token_decimals,
			network: config.network.name.clone(),
		}
	}
}

/// Builds the API router with all routes nested under `/api`.
pub fn router(state: AppState) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/authorize", post(apis::authorize::handle_authorize))
				.route("/sponsor", post(apis::sponsor::handle_sponsor))
				.route("/sponsor-eth", post(apis::sponsor::handle_sponsor_eth))
				.route("/sponsor-mint", post(apis::sponsor::handle_sponsor_mint))
				.route("/sponsor-transfer", post(apis::sponsor::handle_sponsor_transfer))
				.route("/sponsor-generic", post(apis::sponsor::handle_sponsor_generic))
				.route("/build-call/send-eth", post(apis::build_call::handle_build_send_eth))
				.route("/build-call/mint", post(apis::build_call::handle_build_mint))
				.route("/build-call/transfer", post(apis::build_call::handle_build_transfer))
				.route("/build-call/generic", post(apis::build_call::handle_build_generic))
				.route("/contracts", get(apis::contracts::handle_contracts)),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

/// Binds the configured address and serves the API until the process exits.
pub async fn start_server(
	api_config: ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Delegation API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		body::{to_bytes, Body},
		http::{Request, StatusCode},
	};
	use delegation_chain::MockChainClient;
	use delegation_core::calldata::{encode_mint, encode_send_eth};
	use delegation_types::U256;
	use serde_json::{json, Value};
	use tower::ServiceExt;

	const SIGNER_PK: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const SIGNER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
	const SPONSOR_PK: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
	const SPONSOR: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
	const RECIPIENT: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

	const CONFIG: &str = r#"
[service]
id = "delegation-test"

[network]
rpc_url = "http://localhost:8545"
chain_id = 17000
"#;

	fn test_app(chain: Arc<MockChainClient>) -> Router {
		let config: Config = CONFIG.parse().unwrap();
		let service = DelegationService::builder()
			.with_chain_client(chain)
			.with_chain_id(17000)
			.with_trusted_contracts(config.delegation.trusted_contracts())
			.build()
			.unwrap();
		router(AppState::new(Arc::new(service), &config))
	}

	async fn request(app: Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
		let request = Request::builder()
			.method(method)
			.uri(uri)
			.header("content-type", "application/json")
			.body(body.map(Body::from).unwrap_or_else(Body::empty))
			.unwrap();
		let response = app.oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
		(status, body)
	}

	async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
		request(app, "POST", uri, Some(body.to_string())).await
	}

	fn address(s: &str) -> Address {
		s.parse().unwrap()
	}

	#[tokio::test]
	async fn test_contracts() {
		let app = test_app(Arc::new(MockChainClient::new(17000)));
		let (status, body) = request(app, "GET", "/api/contracts", None).await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["network"], "holesky");
		assert_eq!(body["chain_id"], 17000);
		assert_eq!(
			address(body["simple_delegate_contract"].as_str().unwrap()),
			delegation_config::DEFAULT_DELEGATE_CONTRACT
		);
	}

	#[tokio::test]
	async fn test_authorize() {
		let chain = Arc::new(MockChainClient::new(17000).with_nonce(address(SIGNER), 5));
		let app = test_app(chain);
		let (status, body) = post(
			app,
			"/api/authorize",
			json!({
				"contract_address": "0x1f0F9d7e19991e7E296630DC0073610f23CF066a",
				"signer_pk": SIGNER_PK,
			}),
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(address(body["signer_address"].as_str().unwrap()), address(SIGNER));
		assert_eq!(body["authorization"]["nonce"], 5);
		assert_eq!(body["authorization"]["chain_id"], 17000);
	}

	#[tokio::test]
	async fn test_authorize_rejections() {
		let app = test_app(Arc::new(MockChainClient::new(17000)));

		let (status, body) = post(
			app.clone(),
			"/api/authorize",
			json!({
				"contract_address": "0x0000000000000000000000000000000000000042",
				"signer_pk": SIGNER_PK,
			}),
		)
		.await;
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(body["error"], "UNTRUSTED_DELEGATE");

		let (status, body) = post(
			app.clone(),
			"/api/authorize",
			json!({ "contract_address": "0x1f0F9d7e19991e7E296630DC0073610f23CF066a" }),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "MISSING_KEY");

		let (status, body) =
			request(app, "POST", "/api/authorize", Some("{not json".to_string())).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "INVALID_JSON");
	}

	#[tokio::test]
	async fn test_authorize_then_sponsor() {
		let chain = Arc::new(MockChainClient::new(17000).with_nonce(address(SPONSOR), 12));
		let app = test_app(chain.clone());

		let (_, authorized) = post(
			app.clone(),
			"/api/authorize",
			json!({
				"contract_address": "0x1f0F9d7e19991e7E296630DC0073610f23CF066a",
				"signer_pk": SIGNER_PK,
			}),
		)
		.await;

		let (status, body) = post(
			app,
			"/api/sponsor",
			json!({
				"authorization": authorized["authorization"],
				"calls": [
					{ "to": RECIPIENT, "data": "0x", "value": "1000" },
					{ "to": SIGNER, "data": "0xdeadbeef", "value": "" },
				],
				"sponsor_pk": SPONSOR_PK,
			}),
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(address(body["sponsor"].as_str().unwrap()), address(SPONSOR));

		let broadcasts = chain.broadcasts().await;
		assert_eq!(broadcasts.len(), 1);
		let tx = broadcasts[0].tx();
		assert_eq!(tx.nonce, 12);
		assert_eq!(tx.to, address(SIGNER));
		assert_eq!(tx.gas_limit, 200_000);
		assert_eq!(body["tx_hash"], json!(broadcasts[0].hash()));
	}

	#[tokio::test]
	async fn test_sponsor_rejects_malformed_calls() {
		let app = test_app(Arc::new(MockChainClient::new(17000)));
		let (status, body) = post(
			app,
			"/api/sponsor",
			json!({
				"calls": [{ "to": RECIPIENT, "data": "0x", "value": "ten" }],
				"sponsor_pk": SPONSOR_PK,
			}),
		)
		.await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["message"], "Invalid value in call 0");
	}

	#[tokio::test]
	async fn test_sponsor_eth() {
		let chain = Arc::new(MockChainClient::new(17000));
		let app = test_app(chain.clone());
		let (status, body) = post(
			app,
			"/api/sponsor-eth",
			json!({
				"signer_pk": SIGNER_PK,
				"sponsor_pk": SPONSOR_PK,
				"recipient": RECIPIENT,
				"amount": "0.5",
			}),
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["operation"], "sendETH");
		assert_eq!(body["amount_wei"], "500000000000000000");

		let broadcasts = chain.broadcasts().await;
		let tx = broadcasts[0].tx();
		assert_eq!(tx.to, address(SIGNER));
		assert_eq!(tx.value, U256::ZERO);
		assert_eq!(
			tx.input,
			encode_send_eth(address(RECIPIENT), U256::from(500_000_000_000_000_000u64))
		);
		assert_eq!(tx.authorization_list.len(), 1);
	}

	#[tokio::test]
	async fn test_sponsor_mint_validation_and_chain_failure() {
		let app = test_app(Arc::new(MockChainClient::new(17000)));
		let (status, body) = post(
			app,
			"/api/sponsor-mint",
			json!({ "signer_pk": SIGNER_PK, "recipient": RECIPIENT, "amount": "1" }),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["message"], "missing required fields");

		let app = test_app(Arc::new(MockChainClient::new(17000).with_failing_broadcasts()));
		let (status, body) = post(
			app,
			"/api/sponsor-transfer",
			json!({
				"signer_pk": SIGNER_PK,
				"sponsor_pk": SPONSOR_PK,
				"recipient": RECIPIENT,
				"amount": "1",
			}),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_GATEWAY);
		assert_eq!(body["error"], "BROADCAST_FAILED");
	}

	#[tokio::test]
	async fn test_sponsor_generic() {
		let chain = Arc::new(MockChainClient::new(17000));
		let app = test_app(chain.clone());
		let (status, body) = post(
			app,
			"/api/sponsor-generic",
			json!({
				"signer_pk": SIGNER_PK,
				"sponsor_pk": SPONSOR_PK,
				"contract_address": "0x1f0F9d7e19991e7E296630DC0073610f23CF066a",
				"function_signature": "sendETH(address,uint256)",
				"parameters": [RECIPIENT, "1000"],
			}),
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["function"], "sendETH(address,uint256)");
		let expected = encode_send_eth(address(RECIPIENT), U256::from(1000u64));
		assert_eq!(body["call_data"], json!(expected));
		assert_eq!(chain.broadcasts().await[0].tx().input, expected);
	}

	#[tokio::test]
	async fn test_build_call_mint() {
		let app = test_app(Arc::new(MockChainClient::new(17000)));
		let (status, body) = post(
			app,
			"/api/build-call/mint",
			json!({ "recipient": RECIPIENT, "amount": "2" }),
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["function"], "mint");
		assert_eq!(body["amount_wei"], "2000000000000000000");
		let expected = encode_mint(
			delegation_config::DEFAULT_TOKEN_CONTRACT,
			address(RECIPIENT),
			U256::from(2_000_000_000_000_000_000u128),
		);
		assert_eq!(body["call_data"], json!(expected));
		assert!(body["token_address"].is_string());
	}

	#[tokio::test]
	async fn test_build_call_send_eth_has_no_token() {
		let app = test_app(Arc::new(MockChainClient::new(17000)));
		let (status, body) = post(
			app.clone(),
			"/api/build-call/send-eth",
			json!({ "recipient": RECIPIENT, "amount": "1" }),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert!(body.get("token_address").is_none());

		let (status, _) = post(
			app,
			"/api/build-call/send-eth",
			json!({ "recipient": "0x1234", "amount": "1" }),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_build_call_generic() {
		let app = test_app(Arc::new(MockChainClient::new(17000)));
		let (status, body) = post(
			app.clone(),
			"/api/build-call/generic",
			json!({
				"function_signature": "transfer(address,uint256)",
				"parameters": [RECIPIENT, 1000],
			}),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["parameters"], json!([RECIPIENT, 1000]));
		assert!(body["call_data"].as_str().unwrap().starts_with("0xa9059cbb"));

		let (status, body) = post(
			app,
			"/api/build-call/generic",
			json!({
				"function_signature": "transfer(address,uint256)",
				"parameters": [[RECIPIENT], "1"],
			}),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "ENCODING_ERROR");
	}
}
