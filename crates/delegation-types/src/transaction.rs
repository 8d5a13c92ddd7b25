//! Sponsored set-code transaction type.

use alloy_consensus::{Signed, TxEip7702};

/// A sponsor-signed EIP-7702 transaction, ready for broadcast.
///
/// Its `to` is the delegating signer, its `value` is always zero and its
/// authorization list holds exactly one signed delegation.
pub type SponsoredTransaction = Signed<TxEip7702>;

/// Hash of a broadcast transaction.
pub type TxHash = alloy_primitives::TxHash;
