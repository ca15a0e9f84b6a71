//! The types observed by the ledger check suite: coins, fees, accounts,
//! broadcast results and balance snapshots.
//!
//! Amounts travel as decimal strings on the wire and are held as
//! [`BigUint`](num_bigint::BigUint) in memory, so balance arithmetic never
//! loses precision.

#![deny(clippy::cast_possible_truncation)]
#![deny(unused_crate_dependencies)]
#![deny(missing_docs)]

pub mod account;
pub mod broadcast;
pub mod coin;
pub mod fee;
pub mod snapshot;

pub use account::Account;
pub use broadcast::BroadcastResult;
pub use coin::{
    Amount,
    ParseAmountError,
};
pub use fee::Fee;
pub use num_bigint::BigUint;
pub use snapshot::{
    BalanceSnapshot,
    Stage,
};
