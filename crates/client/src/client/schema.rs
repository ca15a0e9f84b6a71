//! Wire shapes of the node REST (LCD) gateway.

use ledger_check_types::{
    Amount,
    BroadcastResult,
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};

pub const BROADCAST_MODE_SYNC: &str = "BROADCAST_MODE_SYNC";

#[derive(Debug, Deserialize)]
pub struct BalanceResponse {
    #[serde(default)]
    pub balance: Option<Amount>,
}

#[derive(Debug, Serialize)]
pub struct BroadcastTxRequest<'a> {
    pub tx_bytes: &'a str,
    pub mode: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastTxResponse {
    pub tx_response: TxResponse,
}

#[derive(Debug, Deserialize)]
pub struct GetTxResponse {
    pub tx_response: TxResponse,
}

/// `cosmos.base.abci.v1beta1.TxResponse`, limited to the fields the suite reads.
#[derive(Debug, Deserialize)]
pub struct TxResponse {
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub height: u64,
    pub txhash: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
}

impl From<TxResponse> for BroadcastResult {
    fn from(value: TxResponse) -> Self {
        BroadcastResult {
            code: value.code,
            transaction_hash: value.txhash,
            raw_log: value.raw_log,
            height: value.height,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NodeInfoResponse {
    pub default_node_info: DefaultNodeInfo,
    #[serde(default)]
    pub application_version: Option<ApplicationVersion>,
}

#[derive(Debug, Deserialize)]
pub struct DefaultNodeInfo {
    pub network: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub moniker: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationVersion {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

// The gateway encodes 64 bit integers as strings, some proxies re-encode
// them as numbers.
fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        String(String),
        Number(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::String(s) => s.parse().map_err(serde::de::Error::custom),
        Raw::Number(n) => Ok(n),
    }
}
