#![deny(clippy::cast_possible_truncation)]
#![deny(unused_crate_dependencies)]
pub mod cli;
pub mod client;
pub mod error;
pub mod keyring;
pub mod signer;

pub use client::LedgerClient;
pub use error::ClientError;

#[cfg(test)]
use axum as _;
#[cfg(test)]
use ledger_check_trace as _;
#[cfg(test)]
use pretty_assertions as _;
