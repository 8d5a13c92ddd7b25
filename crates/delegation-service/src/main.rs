//! Main entry point for the delegation service.
//!
//! Loads the configuration, connects to the configured chain and serves the
//! delegation HTTP API on top of the core engine.

use clap::Parser;
use delegation_chain::AlloyChainClient;
use delegation_config::{Config, SponsorshipConfig};
use delegation_core::{DelegationService, SponsorPolicy};
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the delegation service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started delegation service");

	let config_path = args.config.to_string_lossy();
	let config = Config::from_file(&config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let service = Arc::new(build_service(&config).await?);
	tracing::info!(
		chain_id = service.chain_id(),
		network = %config.network.name,
		"Delegation service ready"
	);

	let api_config = config.api();
	if !api_config.enabled {
		tracing::warn!("API server disabled in configuration, nothing to serve");
		return Ok(());
	}

	server::start_server(api_config, server::AppState::new(service, &config)).await?;

	tracing::info!("Stopped delegation service");
	Ok(())
}

/// Wires the chain client, allow-list and sponsorship policy into a
/// [`DelegationService`].
async fn build_service(config: &Config) -> Result<DelegationService, Box<dyn std::error::Error>> {
	let chain = Arc::new(AlloyChainClient::new(&config.network.rpc_url)?);

	let mut builder = DelegationService::builder()
		.with_chain_client(chain)
		.with_trusted_contracts(config.delegation.trusted_contracts())
		.with_policy(sponsor_policy(&config.sponsorship)?)
		.with_authorization_max_age(config.delegation.authorization_max_age_seconds);
	if let Some(chain_id) = config.network.chain_id {
		builder = builder.with_chain_id(chain_id);
	}

	Ok(builder.build_with_chain_lookup().await?)
}

fn sponsor_policy(
	config: &SponsorshipConfig,
) -> Result<SponsorPolicy, delegation_config::ConfigError> {
	Ok(SponsorPolicy {
		max_total_value: config.max_total_value_wei()?,
		fallback_priority_fee: config.fallback_priority_fee_wei as u128,
		fee_cap_multiplier: config.fee_cap_multiplier as u128,
		default_gas_limit: config.default_gas_limit,
		multicall_base_gas: config.multicall_base_gas,
		multicall_per_call_gas: config.multicall_per_call_gas,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const CONFIG: &str = r#"
[service]
id = "delegation-test"

[network]
rpc_url = "http://localhost:8545"
chain_id = 17000

[sponsorship]
max_total_value_ether = "1.5"
fee_cap_multiplier = 4
"#;

	#[test]
	fn test_args_parse() {
		let args = Args::parse_from(["delegation", "--config", "custom.toml", "-l", "debug"]);
		assert_eq!(args.config, PathBuf::from("custom.toml"));
		assert_eq!(args.log_level, "debug");

		let defaults = Args::parse_from(["delegation"]);
		assert_eq!(defaults.config, PathBuf::from("config.toml"));
		assert_eq!(defaults.log_level, "info");
	}

	#[test]
	fn test_sponsor_policy_from_config() {
		let config: Config = CONFIG.parse().unwrap();
		let policy = sponsor_policy(&config.sponsorship).unwrap();

		assert_eq!(
			policy.max_total_value,
			delegation_types::ether_to_wei("1.5").unwrap()
		);
		assert_eq!(policy.fee_cap_multiplier, 4);
		assert_eq!(policy.fallback_priority_fee, 2_000_000_000);
		assert_eq!(policy.default_gas_limit, 1_000_000);
	}

	#[tokio::test]
	async fn test_build_service_with_configured_chain_id() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(CONFIG.as_bytes()).unwrap();

		let config = Config::from_file(file.path().to_str().unwrap())
			.await
			.unwrap();
		let service = build_service(&config).await.unwrap();

		assert_eq!(service.chain_id(), 17000);
		assert!(service
			.trusted_contracts()
			.contains(&config.delegation.delegate_contract));
	}
}
