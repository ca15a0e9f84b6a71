//! Account

use serde::{
    Deserialize,
    Serialize,
};

/// An account able to sign transfers.
///
/// The key material stays with the keyring that owns `name`; the suite only
/// ever needs the address and the name to ask the keyring for a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    /// Name of the key in the keyring, if the account can sign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Bech32 address of the account.
    pub address: String,
}

impl Account {
    /// An account known only by its address.
    pub fn watch_only(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into(),
        }
    }

    /// An account backed by the keyring key `name`.
    pub fn named(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            address: address.into(),
        }
    }

    /// The identifier handed to the signer: the key name when known,
    /// otherwise the address.
    pub fn signer_id(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.address)
    }
}
