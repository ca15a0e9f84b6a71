use crate::{
    adapters::{
        CliSubmitter,
        ConfiguredAccounts,
    },
    config::SuiteConfig,
    failure::Failure,
    harness::TransferHarness,
    ports::{
        AccountProvider,
        BalanceQuery,
        TxSubmitter,
    },
};
use ledger_check_client::{
    cli::NodeCli,
    signer::CliSigner,
    LedgerClient,
};
use ledger_check_types::Account;
use std::sync::Arc;

/// Everything a scenario needs. Built fresh for every scenario so no state
/// leaks between them.
pub struct TestContext {
    pub config: SuiteConfig,
    pub harness: TransferHarness,
    validator: Arc<dyn AccountProvider>,
    user: Arc<dyn AccountProvider>,
}

impl TestContext {
    /// Connects to the node and signer described by `config`.
    pub fn new(config: SuiteConfig) -> Result<Self, Failure> {
        config.validate()?;

        let client = LedgerClient::new(&config.endpoint)
            .map_err(|e| Failure::Configuration(e.to_string()))?
            .with_poll_interval(config.poll_interval);

        let signer = &config.signer;
        let mut cli = NodeCli::new(signer.command.clone())
            .map_err(|e| Failure::Configuration(format!("signer: {e}")))?
            .with_keyring_backend(signer.keyring_backend.clone());
        if let Some(home) = &signer.home {
            cli = cli.with_home(home.clone());
        }
        let mut cli_signer = CliSigner::new(cli.clone(), signer.chain_id.clone());
        if let Some(rpc_node) = &signer.rpc_node {
            cli_signer = cli_signer.with_rpc_node(rpc_node.clone());
        }

        let validator = ConfiguredAccounts::new(vec![config.validator.clone()], Some(cli.clone()));
        let user = ConfiguredAccounts::new(vec![config.user.clone()], Some(cli));

        Ok(Self::with_ports(
            config,
            Arc::new(client.clone()),
            Arc::new(CliSubmitter::new(client, cli_signer)),
            Arc::new(validator),
            Arc::new(user),
        ))
    }

    pub fn with_ports(
        config: SuiteConfig,
        query: Arc<dyn BalanceQuery>,
        submitter: Arc<dyn TxSubmitter>,
        validator: Arc<dyn AccountProvider>,
        user: Arc<dyn AccountProvider>,
    ) -> Self {
        let harness = TransferHarness::new(query, submitter, config.sync_timeout);
        Self {
            config,
            harness,
            validator,
            user,
        }
    }

    pub async fn validator_account(&self) -> Result<Account, Failure> {
        first_account(self.validator.as_ref(), "validator").await
    }

    pub async fn user_account(&self) -> Result<Account, Failure> {
        first_account(self.user.as_ref(), "user").await
    }
}

async fn first_account(
    provider: &dyn AccountProvider,
    role: &str,
) -> Result<Account, Failure> {
    let accounts = provider.accounts().await.map_err(|e| {
        Failure::Configuration(format!("resolving the {role} account failed: {e:#}"))
    })?;
    accounts
        .into_iter()
        .next()
        .ok_or_else(|| Failure::Configuration(format!("no {role} account configured")))
}
