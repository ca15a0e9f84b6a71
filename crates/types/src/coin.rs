//! Coin

use num_bigint::BigUint;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    str::FromStr,
};

/// Errors raised while reading amounts, coins and fees from their string form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseAmountError {
    /// The amount string is empty.
    #[error("amount is empty")]
    Empty,
    /// The amount string contains something other than ASCII digits.
    #[error("amount `{0}` is not a non-negative decimal integer")]
    NotDecimal(String),
    /// The denom is empty.
    #[error("denom is empty")]
    EmptyDenom,
    /// The gas limit is zero or not a decimal integer.
    #[error("gas `{0}` must be a positive decimal integer")]
    InvalidGas(String),
}

/// Parses a decimal string into an arbitrary precision integer.
///
/// Only ASCII digits are accepted. Signs, separators and whitespace are
/// rejected even where [`BigUint::from_str`] would tolerate them.
pub fn parse_decimal(raw: &str) -> Result<BigUint, ParseAmountError> {
    if raw.is_empty() {
        return Err(ParseAmountError::Empty)
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseAmountError::NotDecimal(raw.to_string()))
    }
    BigUint::parse_bytes(raw.as_bytes(), 10)
        .ok_or_else(|| ParseAmountError::NotDecimal(raw.to_string()))
}

/// A quantity of a single denom, e.g. `1234nomo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// Identifier of the token type.
    pub denom: String,
    /// Non-negative quantity, encoded as a decimal string on the wire.
    #[serde(with = "decimal")]
    pub amount: BigUint,
}

impl Amount {
    /// Creates a new amount of `denom`.
    pub fn new(denom: impl Into<String>, amount: impl Into<BigUint>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    /// Zero of `denom`. This is how an account without any balance reads.
    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, BigUint::default())
    }

    /// Builds an amount from its wire parts, validating both.
    pub fn parse(denom: &str, amount: &str) -> Result<Self, ParseAmountError> {
        if denom.is_empty() {
            return Err(ParseAmountError::EmptyDenom)
        }
        Ok(Self::new(denom, parse_decimal(amount)?))
    }

    /// Returns `true` if the quantity is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.bits() == 0
    }
}

/// Formats the amount the way node CLIs expect coins: `<amount><denom>`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or(ParseAmountError::EmptyDenom)?;
        let (amount, denom) = s.split_at(split);
        Self::parse(denom, amount)
    }
}

/// Formats a list of coins as a comma separated CLI argument.
pub fn format_coins(coins: &[Amount]) -> String {
    coins
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) mod decimal {
    use super::parse_decimal;
    use num_bigint::BigUint;
    use serde::{
        Deserialize,
        Deserializer,
        Serializer,
    };
    use std::borrow::Cow;

    pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Cow::<'de, str>::deserialize(deserializer)?;
        parse_decimal(&raw).map_err(serde::de::Error::custom)
    }
}
