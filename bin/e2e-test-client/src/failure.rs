use ledger_check_types::BigUint;
use std::{
    error::Error,
    time::Duration,
};

/// Why a scenario failed. Every variant carries what is needed to diagnose
/// it without re-running the scenario.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// A required setting is missing or empty. Raised before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The ledger could not answer a balance query.
    #[error("Querying the {denom} balance of {address} failed: {source}")]
    QueryFailure {
        address: String,
        denom: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The transfer could not be handed to the ledger at all.
    #[error("Submitting the transfer failed: {source}")]
    SubmissionFailure {
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The ledger rejected the transfer with a non-zero code.
    #[error("Broadcast failed with code {code}: {raw_log}")]
    BroadcastFailure { code: u32, raw_log: String },
    /// A measured balance contradicts the expected arithmetic.
    #[error("Invariant violated for {subject}: expected {expected}, got {actual}")]
    InvariantViolation {
        subject: String,
        expected: BigUint,
        actual: BigUint,
    },
    /// A plain assertion on observed state did not hold.
    #[error("Assertion failed: {0}")]
    AssertionFailure(String),
    /// The transfer was not included in time.
    #[error("Transaction {transaction} was not included within {after:?}")]
    Timeout { transaction: String, after: Duration },
}

impl Failure {
    /// Stable name of the failure kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::Configuration(_) => "ConfigurationError",
            Failure::QueryFailure { .. } => "QueryFailure",
            Failure::SubmissionFailure { .. } => "SubmissionFailure",
            Failure::BroadcastFailure { .. } => "BroadcastFailure",
            Failure::InvariantViolation { .. } => "InvariantViolation",
            Failure::AssertionFailure(_) => "AssertionFailure",
            Failure::Timeout { .. } => "Timeout",
        }
    }
}

pub(crate) fn require_non_empty(what: &str, value: &str) -> Result<(), Failure> {
    if value.trim().is_empty() {
        return Err(Failure::Configuration(format!("{what} must not be empty")))
    }
    Ok(())
}
