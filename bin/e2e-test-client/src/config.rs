use crate::failure::Failure;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    path::PathBuf,
    time::Duration,
};

pub const NODE_URL_VAR: &str = "NODE_URL";
pub const DENOM_VAR: &str = "DENOM";
pub const VALIDATOR_ADDR_VAR: &str = "VALIDATOR_ADDR";
pub const USER_ADDR_VAR: &str = "USR_1_ADDR";

#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(default)]
pub struct SuiteConfig {
    // the REST endpoint of the node
    pub endpoint: String,
    // native denom of the chain
    pub denom: String,
    // address that has never received funds, enables the bootstrap scenario
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fresh_recipient: Option<String>,
    // upper bound for a transfer to be included
    #[serde(with = "humantime_serde")]
    pub sync_timeout: Duration,
    // delay between inclusion polls
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    // the validator must have pre-existing funds
    pub validator: WalletConfig,
    pub user: WalletConfig,
    pub signer: SignerConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1317".to_string(),
            denom: "nomo".to_string(),
            fresh_recipient: None,
            sync_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            validator: WalletConfig {
                name: Some("validator".to_string()),
                address: String::new(),
            },
            user: WalletConfig::default(),
            signer: SignerConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(default)]
pub struct WalletConfig {
    // name of the key in the keyring, required to sign
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    // resolved from the keyring when empty
    pub address: String,
}

impl WalletConfig {
    pub fn is_configured(&self) -> bool {
        self.name.is_some() || !self.address.is_empty()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(default)]
pub struct SignerConfig {
    // the node binary, optionally behind a wrapper like `docker exec`
    pub command: Vec<String>,
    pub chain_id: String,
    pub keyring_backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
    // Tendermint RPC used by the CLI, defaults to its own configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_node: Option<String>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            command: vec!["nolusd".to_string()],
            chain_id: "nolus-local".to_string(),
            keyring_backend: "test".to_string(),
            home: None,
            rpc_node: None,
        }
    }
}

impl SuiteConfig {
    /// Overrides file settings with the variables the node's deployment
    /// scripts export.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(endpoint) = lookup(NODE_URL_VAR) {
            self.endpoint = endpoint;
        }
        if let Some(denom) = lookup(DENOM_VAR) {
            self.denom = denom;
        }
        if let Some(address) = lookup(VALIDATOR_ADDR_VAR) {
            self.validator.address = address;
        }
        if let Some(address) = lookup(USER_ADDR_VAR) {
            self.user.address = address;
        }
    }

    pub fn validate(&self) -> Result<(), Failure> {
        if self.endpoint.trim().is_empty() {
            return Err(Failure::Configuration("endpoint must not be empty".into()))
        }
        if self.denom.trim().is_empty() {
            return Err(Failure::Configuration("denom must not be empty".into()))
        }
        if !self.validator.is_configured() {
            return Err(Failure::Configuration(
                "the validator needs a key name or an address".into(),
            ))
        }
        if self.sync_timeout.is_zero() {
            return Err(Failure::Configuration("sync_timeout must be positive".into()))
        }
        if self.poll_interval.is_zero() {
            return Err(Failure::Configuration("poll_interval must be positive".into()))
        }
        Ok(())
    }
}
