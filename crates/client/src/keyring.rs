use crate::{
    cli::NodeCli,
    error::ClientError,
};
use ledger_check_types::Account;
use std::ffi::OsString;

/// Resolves the addresses of named keyring keys.
#[derive(Debug, Clone)]
pub struct KeyringAccounts {
    cli: NodeCli,
    names: Vec<String>,
}

impl KeyringAccounts {
    pub fn new(cli: NodeCli, names: Vec<String>) -> Self {
        Self { cli, names }
    }

    /// The accounts in the order their names were given.
    pub async fn accounts(&self) -> Result<Vec<Account>, ClientError> {
        let mut accounts = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let mut args: Vec<OsString> =
                vec!["keys".into(), "show".into(), name.into(), "-a".into()];
            args.extend(self.cli.keyring_args());
            let address = self.cli.run(args).await?.trim().to_string();
            if address.is_empty() {
                return Err(ClientError::Command {
                    command: format!("keys show {name}"),
                    status: "success".to_string(),
                    stderr: "no address printed".to_string(),
                })
            }
            accounts.push(Account::named(name.clone(), address));
        }
        Ok(accounts)
    }
}
