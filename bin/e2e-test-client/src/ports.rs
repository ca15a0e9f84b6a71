use ledger_check_types::{
    Account,
    Amount,
    BroadcastResult,
    Fee,
};

/// Read access to balances.
#[async_trait::async_trait]
pub trait BalanceQuery: Send + Sync {
    /// The balance of `address` in `denom`. An address without any balance
    /// must read as zero, not as an error.
    async fn balance(&self, address: &str, denom: &str) -> anyhow::Result<Amount>;
}

/// Submission of signed transfers.
#[async_trait::async_trait]
pub trait TxSubmitter: Send + Sync {
    /// Submits a transfer of `amounts` from `sender` to `recipient`.
    ///
    /// Implementations should resolve once the transaction is included. A
    /// result with a zero height is treated as mempool acceptance only, and
    /// the caller follows up with [`TxSubmitter::await_inclusion`].
    async fn send_tokens(
        &self,
        sender: &Account,
        recipient: &str,
        amounts: &[Amount],
        fee: &Fee,
        memo: &str,
    ) -> anyhow::Result<BroadcastResult>;

    /// Resolves once the transaction `transaction_hash` is part of a block.
    async fn await_inclusion(
        &self,
        transaction_hash: &str,
    ) -> anyhow::Result<BroadcastResult>;
}

/// Source of the accounts able to sign transfers.
#[async_trait::async_trait]
pub trait AccountProvider: Send + Sync {
    async fn accounts(&self) -> anyhow::Result<Vec<Account>>;
}
