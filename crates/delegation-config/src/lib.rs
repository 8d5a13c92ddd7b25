//! Configuration module for the delegation service.
//!
//! Configuration is a single TOML file. `${VAR}` and `${VAR:-default}`
//! references are replaced from the environment before parsing, so private
//! values such as RPC credentials can stay out of the file.

use alloy_primitives::address;
use delegation_types::{ether_to_wei, Address, U256};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Delegate contract used when none is configured.
pub const DEFAULT_DELEGATE_CONTRACT: Address = address!("1f0F9d7e19991e7E296630DC0073610f23CF066a");
/// Token contract used when none is configured.
pub const DEFAULT_TOKEN_CONTRACT: Address = address!("93d77bE58A977350B924C0694242b075eB26AEdE");

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the delegation service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this service instance.
	pub service: ServiceConfig,
	/// Chain the service operates on.
	pub network: NetworkConfig,
	/// Contracts the service delegates to and calls.
	#[serde(default)]
	pub delegation: DelegationConfig,
	/// Limits and gas policy for sponsored transactions.
	#[serde(default)]
	pub sponsorship: SponsorshipConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this instance, used in logs.
	pub id: String,
}

/// Chain connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	/// HTTP JSON-RPC endpoint.
	pub rpc_url: String,
	/// Expected chain id. Looked up from the node when absent.
	pub chain_id: Option<u64>,
	/// Human-readable network name reported by the contracts endpoint.
	#[serde(default = "default_network_name")]
	pub name: String,
}

fn default_network_name() -> String {
	"holesky".to_string()
}

/// Contracts involved in delegation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DelegationConfig {
	/// Implementation contract signers delegate their code to.
	#[serde(default = "default_delegate_contract")]
	pub delegate_contract: Address,
	/// Token contract targeted by the mint and transfer routes.
	#[serde(default = "default_token_contract")]
	pub token_contract: Address,
	/// Decimals of the token contract.
	#[serde(default = "default_token_decimals")]
	pub token_decimals: u8,
	/// Delegates the service accepts. Empty means the delegate and token
	/// contracts above.
	#[serde(default)]
	pub trusted_contracts: Vec<Address>,
	/// Maximum age of an authorization before it is rejected.
	#[serde(default = "default_authorization_max_age_seconds")]
	pub authorization_max_age_seconds: u64,
}

impl Default for DelegationConfig {
	fn default() -> Self {
		Self {
			delegate_contract: default_delegate_contract(),
			token_contract: default_token_contract(),
			token_decimals: default_token_decimals(),
			trusted_contracts: Vec::new(),
			authorization_max_age_seconds: default_authorization_max_age_seconds(),
		}
	}
}

impl DelegationConfig {
	/// Returns the effective allow-list of delegate contracts.
	pub fn trusted_contracts(&self) -> Vec<Address> {
		if self.trusted_contracts.is_empty() {
			vec![self.delegate_contract, self.token_contract]
		} else {
			self.trusted_contracts.clone()
		}
	}
}

fn default_delegate_contract() -> Address {
	DEFAULT_DELEGATE_CONTRACT
}

fn default_token_contract() -> Address {
	DEFAULT_TOKEN_CONTRACT
}

fn default_token_decimals() -> u8 {
	18
}

fn default_authorization_max_age_seconds() -> u64 {
	300
}

/// Sponsorship limits and gas policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SponsorshipConfig {
	/// Cap on the summed value of one transaction's calls, in ether.
	#[serde(default = "default_max_total_value_ether")]
	pub max_total_value_ether: String,
	/// Priority fee used when the node cannot suggest one, in wei.
	#[serde(default = "default_fallback_priority_fee_wei")]
	pub fallback_priority_fee_wei: u64,
	/// Fee cap as a multiple of the priority fee.
	#[serde(default = "default_fee_cap_multiplier")]
	pub fee_cap_multiplier: u64,
	/// Gas limit of a single call without an explicit limit.
	#[serde(default = "default_gas_limit")]
	pub default_gas_limit: u64,
	/// Fixed part of the multicall gas limit.
	#[serde(default = "default_multicall_base_gas")]
	pub multicall_base_gas: u64,
	/// Per-call part of the multicall gas limit.
	#[serde(default = "default_multicall_per_call_gas")]
	pub multicall_per_call_gas: u64,
}

impl Default for SponsorshipConfig {
	fn default() -> Self {
		Self {
			max_total_value_ether: default_max_total_value_ether(),
			fallback_priority_fee_wei: default_fallback_priority_fee_wei(),
			fee_cap_multiplier: default_fee_cap_multiplier(),
			default_gas_limit: default_gas_limit(),
			multicall_base_gas: default_multicall_base_gas(),
			multicall_per_call_gas: default_multicall_per_call_gas(),
		}
	}
}

impl SponsorshipConfig {
	/// Returns the value cap in wei.
	pub fn max_total_value_wei(&self) -> Result<U256, ConfigError> {
		ether_to_wei(&self.max_total_value_ether).map_err(|e| {
			ConfigError::Validation(format!("Invalid max_total_value_ether: {}", e))
		})
	}
}

fn default_max_total_value_ether() -> String {
	"10".to_string()
}

fn default_fallback_priority_fee_wei() -> u64 {
	2_000_000_000
}

fn default_fee_cap_multiplier() -> u64 {
	3
}

fn default_gas_limit() -> u64 {
	1_000_000
}

fn default_multicall_base_gas() -> u64 {
	100_000
}

fn default_multicall_per_call_gas() -> u64 {
	50_000
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			enabled: default_api_enabled(),
			host: default_api_host(),
			port: default_api_port(),
		}
	}
}

fn default_api_enabled() -> bool {
	true
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	8080
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		// Full-line comments are left as written.
		let line_start = input[..full_match.start()].rfind('\n').map_or(0, |i| i + 1);
		if input[line_start..full_match.start()].trim_start().starts_with('#') {
			continue;
		}
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file, resolving environment variables
	/// and validating the result.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read config file {}: {}", path, e),
			))
		})?;
		content.parse()
	}

	/// Returns the API settings, falling back to defaults when the section
	/// is absent.
	pub fn api(&self) -> ApiConfig {
		self.api.clone().unwrap_or_default()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.trim().is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		if self.network.rpc_url.trim().is_empty() {
			return Err(ConfigError::Validation("Network rpc_url cannot be empty".into()));
		}
		if self.network.chain_id == Some(0) {
			return Err(ConfigError::Validation("Network chain_id cannot be 0".into()));
		}

		let delegation = &self.delegation;
		if delegation.delegate_contract.is_zero() {
			return Err(ConfigError::Validation(
				"Delegate contract cannot be the zero address".into(),
			));
		}
		let trusted = delegation.trusted_contracts();
		if trusted.iter().any(|address| address.is_zero()) {
			return Err(ConfigError::Validation(
				"Trusted contracts cannot contain the zero address".into(),
			));
		}
		if !trusted.contains(&delegation.delegate_contract) {
			return Err(ConfigError::Validation(format!(
				"Delegate contract {} must be in trusted_contracts",
				delegation.delegate_contract
			)));
		}
		if delegation.authorization_max_age_seconds == 0 {
			return Err(ConfigError::Validation(
				"authorization_max_age_seconds must be greater than 0".into(),
			));
		}

		let sponsorship = &self.sponsorship;
		sponsorship.max_total_value_wei()?;
		for (name, value) in [
			("fee_cap_multiplier", sponsorship.fee_cap_multiplier),
			("default_gas_limit", sponsorship.default_gas_limit),
			("multicall_base_gas", sponsorship.multicall_base_gas),
		] {
			if value == 0 {
				return Err(ConfigError::Validation(format!(
					"{} must be greater than 0",
					name
				)));
			}
		}

		if let Some(api) = &self.api {
			if api.enabled && api.port == 0 {
				return Err(ConfigError::Validation("API port cannot be 0".into()));
			}
		}

		Ok(())
	}
}

/// Parses a TOML string, resolving environment variables and validating the
/// result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
