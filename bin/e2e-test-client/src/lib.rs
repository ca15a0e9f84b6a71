use crate::{
    config::SuiteConfig,
    test_context::TestContext,
    tests::report,
};
use anyhow::Context;
use libtest_mimic::{
    Arguments,
    Failed,
    Trial,
};
use std::{
    env,
    fs,
    future::Future,
    path::Path,
};

pub const CONFIG_FILE_KEY: &str = "LEDGER_CHECK_E2E_CONFIG";

pub mod adapters;
pub mod config;
pub mod failure;
pub mod harness;
#[cfg(any(test, feature = "test-helpers"))]
pub mod in_memory;
pub mod logging;
pub mod ports;
pub mod test_context;
pub mod tests;

pub fn main_body(config: SuiteConfig, mut args: Arguments) {
    fn with_cloned(
        config: &SuiteConfig,
        f: impl FnOnce(SuiteConfig) -> anyhow::Result<(), Failed>,
    ) -> impl FnOnce() -> anyhow::Result<(), Failed> {
        let config = config.clone();
        move || f(config)
    }

    // Scenarios move funds of the same accounts, running them in parallel
    // breaks the balance arithmetic.
    args.test_threads = Some(1);

    let without_user_key = config.user.name.is_none();
    let without_fresh_recipient = config.fresh_recipient.is_none();

    let tests = vec![
        Trial::test(
            "validator has positive balance",
            with_cloned(&config, |config| {
                async_execute(async {
                    let ctx = TestContext::new(config).map_err(report)?;
                    tests::balances::validator_has_positive_balance(&ctx).await
                })
            }),
        ),
        Trial::test(
            "validator can send tokens",
            with_cloned(&config, |config| {
                async_execute(async {
                    let ctx = TestContext::new(config).map_err(report)?;
                    tests::transfers::validator_can_send_tokens(&ctx).await
                })
            }),
        ),
        Trial::test(
            "validator balance reads are stable",
            with_cloned(&config, |config| {
                async_execute(async {
                    let ctx = TestContext::new(config).map_err(report)?;
                    tests::balances::validator_balance_is_stable(&ctx).await
                })
            }),
        ),
        Trial::test(
            "validator pays amount plus fee",
            with_cloned(&config, |config| {
                async_execute(async {
                    let ctx = TestContext::new(config).map_err(report)?;
                    tests::transfers::validator_pays_amount_plus_fee(&ctx).await
                })
            }),
        ),
        Trial::test(
            "user can send tokens back",
            with_cloned(&config, |config| {
                async_execute(async {
                    let ctx = TestContext::new(config).map_err(report)?;
                    tests::transfers::user_can_send_tokens_back(&ctx).await
                })
            }),
        )
        .with_ignored_flag(without_user_key),
        Trial::test(
            "transfer to unseen recipient starts from zero",
            with_cloned(&config, |config| {
                async_execute(async {
                    let ctx = TestContext::new(config).map_err(report)?;
                    tests::transfers::transfer_to_unseen_recipient(&ctx).await
                })
            }),
        )
        .with_ignored_flag(without_fresh_recipient),
    ];

    libtest_mimic::run(&args, tests).exit();
}

/// Loads the file named by [`CONFIG_FILE_KEY`], or the defaults, and applies
/// the environment overrides on top.
pub fn load_config_env() -> anyhow::Result<SuiteConfig> {
    let mut config = match env::var_os(CONFIG_FILE_KEY) {
        Some(path) => load_config(path)?,
        None => SuiteConfig::default(),
    };
    config.apply_env_overrides(|key| env::var(key).ok());
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<SuiteConfig> {
    let path = path.as_ref();
    let file = fs::read_to_string(path)
        .with_context(|| format!("Reading the config file {} failed", path.display()))?;
    toml::from_str(&file)
        .with_context(|| format!("Parsing the config file {} failed", path.display()))
}

fn async_execute<F: Future<Output = anyhow::Result<(), Failed>>>(
    func: F,
) -> Result<(), Failed> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Failed::from(format!("Building the runtime failed: {e}")))?
        .block_on(func)
}
