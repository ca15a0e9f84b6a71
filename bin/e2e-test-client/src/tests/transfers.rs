use crate::{
    failure::Failure,
    test_context::TestContext,
    tests::report,
};
use ledger_check_types::{
    Amount,
    BigUint,
    Fee,
    Stage,
};
use libtest_mimic::Failed;

pub const SEND_AMOUNT: u64 = 1234;
pub const FEE_AMOUNT: u64 = 12;
pub const GAS_LIMIT: &str = "100000";
pub const MEMO: &str = "Testing send transaction";

fn transfer_terms(denom: &str) -> Result<(Amount, Fee), Failure> {
    let fee = Fee::parse(vec![Amount::new(denom, FEE_AMOUNT)], GAS_LIMIT)
        .map_err(|e| Failure::Configuration(e.to_string()))?;
    Ok((Amount::new(denom, SEND_AMOUNT), fee))
}

// validator sends to the user, the user must be credited exactly the amount
pub async fn validator_can_send_tokens(ctx: &TestContext) -> Result<(), Failed> {
    let validator = ctx.validator_account().await.map_err(report)?;
    let user = ctx.user_account().await.map_err(report)?;
    let (amount, fee) = transfer_terms(&ctx.config.denom).map_err(report)?;

    ctx.harness
        .verify_transfer(&validator, &user.address, &amount, &fee, MEMO)
        .await
        .map_err(report)?;
    Ok(())
}

// the validator is debited the amount plus the fee
pub async fn validator_pays_amount_plus_fee(ctx: &TestContext) -> Result<(), Failed> {
    let validator = ctx.validator_account().await.map_err(report)?;
    let user = ctx.user_account().await.map_err(report)?;
    let (amount, fee) = transfer_terms(&ctx.config.denom).map_err(report)?;

    let accounting = ctx
        .harness
        .verify_transfer_with_sender(&validator, &user.address, &amount, &fee, MEMO)
        .await
        .map_err(report)?;
    tracing::info!(
        sender_pre = %accounting.sender_pre.amount,
        sender_post = %accounting.sender_post.amount,
        "sender debited"
    );
    Ok(())
}

// the user signs with its own key and returns funds to the validator
pub async fn user_can_send_tokens_back(ctx: &TestContext) -> Result<(), Failed> {
    let validator = ctx.validator_account().await.map_err(report)?;
    let user = ctx.user_account().await.map_err(report)?;
    let (amount, fee) = transfer_terms(&ctx.config.denom).map_err(report)?;

    ctx.harness
        .verify_transfer(&user, &validator.address, &amount, &fee, MEMO)
        .await
        .map_err(report)?;
    Ok(())
}

// an address the ledger has never seen reads as zero and ends at the amount
pub async fn transfer_to_unseen_recipient(ctx: &TestContext) -> Result<(), Failed> {
    let recipient = ctx.config.fresh_recipient.clone().ok_or_else(|| {
        report(Failure::Configuration(
            "fresh_recipient is not configured".to_string(),
        ))
    })?;
    let validator = ctx.validator_account().await.map_err(report)?;
    let (amount, fee) = transfer_terms(&ctx.config.denom).map_err(report)?;

    let unseen = ctx
        .harness
        .snapshot(Stage::Before, &recipient, &ctx.config.denom)
        .await
        .map_err(report)?;
    if unseen.amount != BigUint::default() {
        return Err(report(Failure::AssertionFailure(format!(
            "{recipient} already holds {}{}, configure an address that was never funded",
            unseen.amount, unseen.denom
        ))))
    }

    let transfer = ctx
        .harness
        .verify_transfer(&validator, &recipient, &amount, &fee, MEMO)
        .await
        .map_err(report)?;
    if transfer.post.amount != amount.amount {
        return Err(report(Failure::InvariantViolation {
            subject: format!("first {} balance of {recipient}", amount.denom),
            expected: amount.amount,
            actual: transfer.post.amount,
        }))
    }
    Ok(())
}
