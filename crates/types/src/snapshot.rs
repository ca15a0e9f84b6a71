//! Balance snapshot

use crate::coin::Amount;
use num_bigint::BigUint;
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;

/// When a snapshot was taken relative to the transfer under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Before the transfer was submitted.
    Before,
    /// After the transfer was included.
    After,
    /// A repeated read with no transfer since the previous one.
    Reread,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Before => f.write_str("before"),
            Stage::After => f.write_str("after"),
            Stage::Reread => f.write_str("on reread"),
        }
    }
}

/// The balance of one address in one denom at a given stage.
///
/// Snapshots are never mutated after they are taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Owner of the balance.
    pub address: String,
    /// Denom of the balance.
    pub denom: String,
    /// The balance itself.
    #[serde(with = "crate::coin::decimal")]
    pub amount: BigUint,
    /// When the snapshot was taken.
    pub stage: Stage,
}

impl BalanceSnapshot {
    /// Records `balance` as the balance of `address` at `stage`.
    pub fn new(stage: Stage, address: impl Into<String>, balance: Amount) -> Self {
        Self {
            address: address.into(),
            denom: balance.denom,
            amount: balance.amount,
            stage,
        }
    }
}

impl fmt::Display for BalanceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} holds {}{} {}",
            self.address, self.amount, self.denom, self.stage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_names_the_stage() {
        let snapshot = BalanceSnapshot::new(
            Stage::Reread,
            "nolus1validator",
            Amount::new("nomo", 5000u32),
        );

        assert_eq!(snapshot.to_string(), "nolus1validator holds 5000nomo on reread");
        assert_eq!(Stage::Before.to_string(), "before");
    }
}
