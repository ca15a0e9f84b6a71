//! Fee

use crate::coin::{
    parse_decimal,
    Amount,
    ParseAmountError,
};
use num_bigint::BigUint;
use serde::{
    Deserialize,
    Serialize,
};
use std::num::NonZeroU64;

/// The fee attached to a transaction: the coins paid and the gas limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Coins paid by the signer, in node order.
    pub amount: Vec<Amount>,
    /// Gas limit, a positive integer encoded as a decimal string.
    #[serde(with = "gas")]
    pub gas: NonZeroU64,
}

impl Fee {
    /// Creates a fee paying `amount` with the gas limit `gas`.
    pub fn new(amount: Vec<Amount>, gas: NonZeroU64) -> Self {
        Self { amount, gas }
    }

    /// Builds a fee from the wire form of its gas limit.
    pub fn parse(amount: Vec<Amount>, gas: &str) -> Result<Self, ParseAmountError> {
        Ok(Self::new(amount, parse_gas(gas)?))
    }

    /// The total paid in `denom`. Zero if the fee does not use that denom.
    pub fn total(&self, denom: &str) -> BigUint {
        self.amount
            .iter()
            .filter(|coin| coin.denom == denom)
            .map(|coin| &coin.amount)
            .sum()
    }
}

fn parse_gas(raw: &str) -> Result<NonZeroU64, ParseAmountError> {
    let invalid = || ParseAmountError::InvalidGas(raw.to_string());
    let gas = parse_decimal(raw).map_err(|_| invalid())?;
    u64::try_from(gas)
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or_else(invalid)
}

mod gas {
    use serde::{
        Deserialize,
        Deserializer,
        Serializer,
    };
    use std::{
        borrow::Cow,
        num::NonZeroU64,
    };

    pub fn serialize<S>(value: &NonZeroU64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NonZeroU64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Cow::<'de, str>::deserialize(deserializer)?;
        super::parse_gas(&raw).map_err(serde::de::Error::custom)
    }
}
