use crate::failure::Failure;
use libtest_mimic::Failed;

pub mod transfers;

/// Logs the failure and hands it to the test runner, prefixed by its kind.
pub(crate) fn report(failure: Failure) -> Failed {
    tracing::error!(kind = failure.kind(), "{failure}");
    Failed::from(format!("[{}] {failure}", failure.kind()))
}

#[cfg(test)]
#[allow(non_snake_case)]
mod scenario_tests {
    use crate::{
        config::SuiteConfig,
        in_memory::InMemoryLedger,
        test_context::TestContext,
        tests::{
            balances,
            transfers,
        },
    };
    use ledger_check_types::{
        Account,
        Amount,
        BigUint,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const VALIDATOR: &str = "nolus1validator";
    const USER: &str = "nolus1user";

    fn context(ledger: &Arc<InMemoryLedger>, config: SuiteConfig) -> TestContext {
        let validator = Arc::new(
            InMemoryLedger::new().with_account(Account::named("validator", VALIDATOR)),
        );
        let user = Arc::new(InMemoryLedger::new().with_account(Account::named("user1", USER)));
        TestContext::with_ports(config, ledger.clone(), ledger.clone(), validator, user)
    }

    fn funded_ledger() -> Arc<InMemoryLedger> {
        Arc::new(
            InMemoryLedger::new()
                .with_balance(VALIDATOR, Amount::new("nomo", 1_000_000u32))
                .with_balance(USER, Amount::new("nomo", 50_000u32)),
        )
    }

    #[tokio::test]
    async fn all_scenarios__pass_against_a_consistent_ledger() {
        let ledger = funded_ledger();
        let mut config = SuiteConfig::default();
        config.fresh_recipient = Some("nolus1fresh".to_string());
        let ctx = context(&ledger, config);

        balances::validator_has_positive_balance(&ctx).await.unwrap();
        balances::validator_balance_is_stable(&ctx).await.unwrap();
        transfers::validator_can_send_tokens(&ctx).await.unwrap();
        transfers::validator_pays_amount_plus_fee(&ctx).await.unwrap();
        transfers::user_can_send_tokens_back(&ctx).await.unwrap();
        transfers::transfer_to_unseen_recipient(&ctx).await.unwrap();

        // two transfers in, one back out
        assert_eq!(
            ledger.balance_of(USER, "nomo"),
            BigUint::from(50_000u32 + 1234 - 12)
        );
        assert_eq!(ledger.balance_of("nolus1fresh", "nomo"), BigUint::from(1234u32));
        assert_eq!(ledger.submissions(), 4);
    }

    #[tokio::test]
    async fn validator_has_positive_balance__fails_for_unfunded_validator() {
        let ledger = Arc::new(InMemoryLedger::new());
        let ctx = context(&ledger, SuiteConfig::default());

        let result = balances::validator_has_positive_balance(&ctx).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn transfer_to_unseen_recipient__refuses_funded_address() {
        let ledger = funded_ledger();
        let mut config = SuiteConfig::default();
        config.fresh_recipient = Some(USER.to_string());
        let ctx = context(&ledger, config);

        let result = transfers::transfer_to_unseen_recipient(&ctx).await;

        assert!(result.is_err());
        assert_eq!(ledger.submissions(), 0);
    }

    #[tokio::test]
    async fn transfer_to_unseen_recipient__needs_configured_address() {
        let ledger = funded_ledger();
        let ctx = context(&ledger, SuiteConfig::default());

        assert!(transfers::transfer_to_unseen_recipient(&ctx).await.is_err());
    }
}
