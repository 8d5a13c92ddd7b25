//! Call data for the delegate contract.
//!
//! The delegate contract's interface is compiled in. The four fixed entry
//! points are encoded through it, and [`generic`] covers arbitrary function
//! signatures one 32-byte word per parameter.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use delegation_types::Call;

pub mod generic;

pub use generic::{build_generic_call, encode_generic, AbiParam, EncodingError};

sol! {
	/// One entry of a batched `execute` call.
	#[derive(Debug, PartialEq, Eq)]
	struct BatchCall {
		bytes data;
		address to;
		uint256 value;
	}

	/// Entry points of the delegate contract an EOA delegates its code to.
	interface ISimpleDelegate {
		function execute(BatchCall[] calls) external payable;
		function mint(address token, address to, uint256 amount) external;
		function transfer(address token, address to, uint256 amount) external;
		function sendETH(address to, uint256 amount) external;
	}
}

/// Canonical signature of the batched execute entry point.
pub const MULTICALL_SIGNATURE: &str = ISimpleDelegate::executeCall::SIGNATURE;

/// Encodes `mint(token, to, amount)`.
pub fn encode_mint(token: Address, to: Address, amount: U256) -> Bytes {
	ISimpleDelegate::mintCall { token, to, amount }
		.abi_encode()
		.into()
}

/// Encodes `transfer(token, to, amount)`.
pub fn encode_transfer(token: Address, to: Address, amount: U256) -> Bytes {
	ISimpleDelegate::transferCall { token, to, amount }
		.abi_encode()
		.into()
}

/// Encodes `sendETH(to, amount)`.
pub fn encode_send_eth(to: Address, amount: U256) -> Bytes {
	ISimpleDelegate::sendETHCall { to, amount }
		.abi_encode()
		.into()
}

/// Encodes `execute((bytes,address,uint256)[])` over `calls`, in order.
///
/// Per-call gas limits are not part of the encoding.
pub fn encode_multicall(calls: &[Call]) -> Bytes {
	let calls = calls
		.iter()
		.map(|call| BatchCall {
			data: call.data.clone(),
			to: call.to,
			value: call.value,
		})
		.collect();

	ISimpleDelegate::executeCall { calls }.abi_encode().into()
}
