//! Binds the ports to a live node: queries and broadcasts go through the
//! REST gateway, signing and key lookups through the node CLI.

use crate::{
    config::WalletConfig,
    ports::{
        AccountProvider,
        BalanceQuery,
        TxSubmitter,
    },
};
use ledger_check_client::{
    cli::NodeCli,
    keyring::KeyringAccounts,
    signer::CliSigner,
    LedgerClient,
};
use ledger_check_types::{
    Account,
    Amount,
    BroadcastResult,
    Fee,
};

#[async_trait::async_trait]
impl BalanceQuery for LedgerClient {
    async fn balance(&self, address: &str, denom: &str) -> anyhow::Result<Amount> {
        Ok(LedgerClient::balance(self, address, denom).await?)
    }
}

/// Signs with the node CLI and broadcasts through the gateway.
pub struct CliSubmitter {
    client: LedgerClient,
    signer: CliSigner,
}

impl CliSubmitter {
    pub fn new(client: LedgerClient, signer: CliSigner) -> Self {
        Self { client, signer }
    }
}

#[async_trait::async_trait]
impl TxSubmitter for CliSubmitter {
    async fn send_tokens(
        &self,
        sender: &Account,
        recipient: &str,
        amounts: &[Amount],
        fee: &Fee,
        memo: &str,
    ) -> anyhow::Result<BroadcastResult> {
        let tx_bytes = self
            .signer
            .sign_send(sender, recipient, amounts, fee, memo)
            .await?;
        Ok(self.client.submit_and_await_inclusion(&tx_bytes).await?)
    }

    async fn await_inclusion(
        &self,
        transaction_hash: &str,
    ) -> anyhow::Result<BroadcastResult> {
        Ok(self.client.await_inclusion(transaction_hash).await?)
    }
}

/// Accounts from the suite configuration. Wallets configured with a key name
/// only get their address from the keyring.
pub struct ConfiguredAccounts {
    wallets: Vec<WalletConfig>,
    cli: Option<NodeCli>,
}

impl ConfiguredAccounts {
    pub fn new(wallets: Vec<WalletConfig>, cli: Option<NodeCli>) -> Self {
        Self { wallets, cli }
    }
}

#[async_trait::async_trait]
impl AccountProvider for ConfiguredAccounts {
    async fn accounts(&self) -> anyhow::Result<Vec<Account>> {
        let mut accounts = Vec::with_capacity(self.wallets.len());
        for wallet in &self.wallets {
            let account = match (&wallet.name, wallet.address.is_empty()) {
                (Some(name), false) => Account::named(name.clone(), wallet.address.clone()),
                (None, false) => Account::watch_only(wallet.address.clone()),
                (Some(name), true) => {
                    let cli = self.cli.clone().ok_or_else(|| {
                        anyhow::anyhow!("No node CLI to resolve the address of `{name}`")
                    })?;
                    let resolved = KeyringAccounts::new(cli, vec![name.clone()])
                        .accounts()
                        .await?;
                    resolved.into_iter().next().ok_or_else(|| {
                        anyhow::anyhow!("The keyring has no address for `{name}`")
                    })?
                }
                (None, true) => {
                    anyhow::bail!("A wallet needs a key name or an address")
                }
            };
            accounts.push(account);
        }
        Ok(accounts)
    }
}
