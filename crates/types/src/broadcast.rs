//! Broadcast result

use serde::{
    Deserialize,
    Serialize,
};

/// Code reported by the node for a transaction that executed successfully.
pub const SUCCESS_CODE: u32 = 0;

/// The outcome of a broadcast transaction as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    /// ABCI result code. `0` means success.
    pub code: u32,
    /// Hex encoded hash of the transaction.
    pub transaction_hash: String,
    /// Log of the execution, or the reason of the rejection.
    pub raw_log: String,
    /// Height of the block including the transaction, `0` while it is
    /// only known to the mempool.
    pub height: u64,
}

impl BroadcastResult {
    /// Returns `true` if the node reported success.
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Returns `true` once the transaction is part of a block.
    pub fn is_included(&self) -> bool {
        self.height > 0
    }
}
