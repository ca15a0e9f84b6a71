use anyhow::Context;
use std::{
    env,
    str::FromStr,
};
use tracing_subscriber::{
    layer::SubscriberExt,
    registry,
    EnvFilter,
    Layer,
};

pub const LOG_FILTER: &str = "RUST_LOG";
pub const HUMAN_LOGGING: &str = "HUMAN_LOGGING";
/// Used when `RUST_LOG` is unset: the suite's own decisions at debug, the
/// REST client and everything else at info.
pub const DEFAULT_LOG_FILTER: &str =
    "info,ledger_check_e2e=debug,ledger_check_client=info,hyper=warn,reqwest=warn";

/// Installs the global subscriber. Logs go to stderr so they never mix with
/// the test report on stdout.
pub fn init_logging() -> anyhow::Result<()> {
    let filter = match env::var_os(LOG_FILTER) {
        Some(_) => EnvFilter::try_from_default_env()
            .with_context(|| format!("Invalid `{LOG_FILTER}` provided"))?,
        None => EnvFilter::try_new(DEFAULT_LOG_FILTER)
            .with_context(|| format!("Invalid default filter `{DEFAULT_LOG_FILTER}`"))?,
    };

    let human_logging = match env::var(HUMAN_LOGGING) {
        Ok(value) => bool::from_str(&value).with_context(|| {
            format!("Expected `true` or `false` to be provided for `{HUMAN_LOGGING}`")
        })?,
        Err(_) => true,
    };

    let layer = tracing_subscriber::fmt::Layer::default().with_writer(std::io::stderr);

    let fmt = if human_logging {
        layer
            .with_ansi(true)
            .with_level(true)
            .with_line_number(true)
            .boxed()
    } else {
        // machine parseable
        layer
            .with_ansi(false)
            .with_level(true)
            .with_line_number(true)
            .json()
            .boxed()
    };

    let subscriber = registry::Registry::default().with(filter).with(fmt);

    tracing::subscriber::set_global_default(subscriber)
        .context("Setting the global default subscriber failed")?;
    Ok(())
}
