use ledger_check_e2e::{
    load_config_env,
    logging::init_logging,
    main_body,
};
use libtest_mimic::Arguments;

fn main() -> anyhow::Result<()> {
    let command_line_args = Arguments::from_args();
    init_logging()?;
    let config = load_config_env()?;
    tracing::info!(endpoint = %config.endpoint, denom = %config.denom, "running suite");
    main_body(config, command_line_args);
    Ok(())
}
