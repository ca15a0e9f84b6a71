use crate::{
    failure::{
        require_non_empty,
        Failure,
    },
    ports::{
        BalanceQuery,
        TxSubmitter,
    },
};
use ledger_check_types::{
    Account,
    Amount,
    BalanceSnapshot,
    BigUint,
    BroadcastResult,
    Fee,
    Stage,
};
use std::{
    sync::Arc,
    time::Duration,
};
use tokio::time::{
    timeout_at,
    Instant,
};

/// What a successful transfer verification observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// Recipient balance before the transfer was submitted.
    pub pre: BalanceSnapshot,
    /// Recipient balance after the transfer was included.
    pub post: BalanceSnapshot,
    /// The included transaction.
    pub result: BroadcastResult,
}

/// A [`TransferReport`] extended with the sender side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderReport {
    pub transfer: TransferReport,
    pub sender_pre: BalanceSnapshot,
    pub sender_post: BalanceSnapshot,
}

/// Drives a transfer against the ledger and checks its observable effects.
///
/// Each verification is a linear sequence: snapshot, submit, snapshot,
/// assert. Nothing is retried; a retried transfer would be a second
/// transfer and break the arithmetic under test.
#[derive(Clone)]
pub struct TransferHarness {
    query: Arc<dyn BalanceQuery>,
    submitter: Arc<dyn TxSubmitter>,
    inclusion_timeout: Duration,
}

impl TransferHarness {
    pub fn new(
        query: Arc<dyn BalanceQuery>,
        submitter: Arc<dyn TxSubmitter>,
        inclusion_timeout: Duration,
    ) -> Self {
        Self {
            query,
            submitter,
            inclusion_timeout,
        }
    }

    pub async fn snapshot(
        &self,
        stage: Stage,
        address: &str,
        denom: &str,
    ) -> Result<BalanceSnapshot, Failure> {
        let balance = self.query.balance(address, denom).await.map_err(|e| {
            Failure::QueryFailure {
                address: address.to_string(),
                denom: denom.to_string(),
                source: e.into(),
            }
        })?;
        if balance.denom != denom {
            return Err(Failure::AssertionFailure(format!(
                "asked for the {denom} balance of {address}, the ledger answered in {}",
                balance.denom
            )))
        }
        let snapshot = BalanceSnapshot::new(stage, address, balance);
        tracing::debug!(%snapshot, "balance snapshot");
        Ok(snapshot)
    }

    /// Succeeds if `address` holds a strictly positive amount of `denom`.
    #[tracing::instrument(skip(self))]
    pub async fn verify_positive_balance(
        &self,
        address: &str,
        denom: &str,
    ) -> Result<BalanceSnapshot, Failure> {
        require_non_empty("address", address)?;
        require_non_empty("denom", denom)?;

        let snapshot = self.snapshot(Stage::Before, address, denom).await?;
        if snapshot.amount == BigUint::default() {
            return Err(Failure::AssertionFailure(format!(
                "{address} holds no {denom}"
            )))
        }
        Ok(snapshot)
    }

    /// Two consecutive reads with no transfer in between must agree.
    #[tracing::instrument(skip(self))]
    pub async fn verify_idempotent_read(
        &self,
        address: &str,
        denom: &str,
    ) -> Result<BalanceSnapshot, Failure> {
        require_non_empty("address", address)?;
        require_non_empty("denom", denom)?;

        let first = self.snapshot(Stage::Before, address, denom).await?;
        let second = self.snapshot(Stage::Reread, address, denom).await?;
        if first.amount != second.amount {
            return Err(Failure::InvariantViolation {
                subject: format!("repeated {denom} balance reads of {address}"),
                expected: first.amount,
                actual: second.amount,
            })
        }
        Ok(second)
    }

    /// Transfers `amount` from `sender` to `recipient` and checks that the
    /// recipient was credited exactly `amount`.
    ///
    /// A transfer to self is not rejected, but the recipient invariant then
    /// only holds if the fee is paid in another denom.
    #[tracing::instrument(
        skip_all,
        fields(sender = %sender.address, %recipient, %amount)
    )]
    pub async fn verify_transfer(
        &self,
        sender: &Account,
        recipient: &str,
        amount: &Amount,
        fee: &Fee,
        memo: &str,
    ) -> Result<TransferReport, Failure> {
        validate_transfer(sender, recipient, amount)?;
        if sender.address == recipient {
            tracing::warn!(
                "self-transfer: the recipient balance only changes by the fee"
            );
        }

        let pre = self.snapshot(Stage::Before, recipient, &amount.denom).await?;
        let result = self.submit(sender, recipient, amount, fee, memo).await?;
        let post = self.snapshot(Stage::After, recipient, &amount.denom).await?;

        let expected = &pre.amount + &amount.amount;
        if post.amount != expected {
            return Err(Failure::InvariantViolation {
                subject: format!("{} balance of recipient {recipient}", amount.denom),
                expected,
                actual: post.amount,
            })
        }

        tracing::info!(
            hash = %result.transaction_hash,
            height = result.height,
            pre = %pre.amount,
            post = %post.amount,
            "transfer verified"
        );
        Ok(TransferReport { pre, post, result })
    }

    /// [`TransferHarness::verify_transfer`], additionally checking that the
    /// sender paid exactly the amount plus the fee in that denom.
    ///
    /// Only meaningful while nothing else moves funds of the sender.
    pub async fn verify_transfer_with_sender(
        &self,
        sender: &Account,
        recipient: &str,
        amount: &Amount,
        fee: &Fee,
        memo: &str,
    ) -> Result<SenderReport, Failure> {
        validate_transfer(sender, recipient, amount)?;
        if sender.address == recipient {
            return Err(Failure::Configuration(
                "sender accounting needs distinct sender and recipient".to_string(),
            ))
        }

        let denom = amount.denom.as_str();
        let sender_pre = self.snapshot(Stage::Before, &sender.address, denom).await?;
        let transfer = self
            .verify_transfer(sender, recipient, amount, fee, memo)
            .await?;
        let sender_post = self.snapshot(Stage::After, &sender.address, denom).await?;

        let spent = &amount.amount + fee.total(denom);
        if sender_pre.amount < spent {
            return Err(Failure::AssertionFailure(format!(
                "{} held {}{denom} before paying {spent}{denom}, yet the transfer succeeded",
                sender.address, sender_pre.amount
            )))
        }
        let expected = &sender_pre.amount - &spent;
        if sender_post.amount != expected {
            return Err(Failure::InvariantViolation {
                subject: format!("{denom} balance of sender {}", sender.address),
                expected,
                actual: sender_post.amount,
            })
        }

        Ok(SenderReport {
            transfer,
            sender_pre,
            sender_post,
        })
    }

    /// Submits the transfer and returns once it is included, bounded by the
    /// inclusion timeout.
    async fn submit(
        &self,
        sender: &Account,
        recipient: &str,
        amount: &Amount,
        fee: &Fee,
        memo: &str,
    ) -> Result<BroadcastResult, Failure> {
        let deadline = Instant::now() + self.inclusion_timeout;
        let amounts = [amount.clone()];

        let send = self
            .submitter
            .send_tokens(sender, recipient, &amounts, fee, memo);
        let result = timeout_at(deadline, send)
            .await
            .map_err(|_| Failure::Timeout {
                transaction: format!("from {} to {recipient}", sender.address),
                after: self.inclusion_timeout,
            })?
            .map_err(|e| Failure::SubmissionFailure { source: e.into() })?;
        ensure_success(&result)?;

        if result.is_included() {
            return Ok(result)
        }

        // Accepted by the mempool only; the post snapshot must wait for the block.
        tracing::debug!(hash = %result.transaction_hash, "awaiting inclusion");
        let hash = result.transaction_hash;
        let included = timeout_at(deadline, self.submitter.await_inclusion(&hash))
            .await
            .map_err(|_| Failure::Timeout {
                transaction: hash.clone(),
                after: self.inclusion_timeout,
            })?
            .map_err(|e| Failure::SubmissionFailure { source: e.into() })?;
        ensure_success(&included)?;
        Ok(included)
    }
}

fn validate_transfer(
    sender: &Account,
    recipient: &str,
    amount: &Amount,
) -> Result<(), Failure> {
    require_non_empty("sender address", &sender.address)?;
    require_non_empty("recipient", recipient)?;
    require_non_empty("denom", &amount.denom)?;
    if amount.is_zero() {
        return Err(Failure::Configuration(
            "the transferred amount must be positive".to_string(),
        ))
    }
    Ok(())
}

fn ensure_success(result: &BroadcastResult) -> Result<(), Failure> {
    if !result.is_success() {
        return Err(Failure::BroadcastFailure {
            code: result.code,
            raw_log: result.raw_log.clone(),
        })
    }
    Ok(())
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::in_memory::{
        InMemoryLedger,
        INSUFFICIENT_FUNDS_CODE,
    };
    use pretty_assertions::assert_eq;

    const VALIDATOR: &str = "nolus1validator";
    const USER: &str = "nolus1user";
    const DENOM: &str = "nomo";

    fn funded_ledger() -> Arc<InMemoryLedger> {
        Arc::new(
            InMemoryLedger::new()
                .with_balance(VALIDATOR, Amount::new(DENOM, 5000u32))
                .with_balance(USER, Amount::new(DENOM, 5000u32)),
        )
    }

    fn harness(ledger: &Arc<InMemoryLedger>) -> TransferHarness {
        TransferHarness::new(ledger.clone(), ledger.clone(), Duration::from_secs(5))
    }

    fn validator() -> Account {
        Account::named("validator", VALIDATOR)
    }

    fn fee() -> Fee {
        Fee::parse(vec![Amount::new(DENOM, 12u32)], "100000").unwrap()
    }

    fn amount() -> Amount {
        Amount::new(DENOM, 1234u32)
    }

    #[tokio::test]
    async fn verify_transfer__credits_recipient_exactly_the_amount() {
        let ledger = funded_ledger();

        let report = harness(&ledger)
            .verify_transfer(&validator(), USER, &amount(), &fee(), "memo")
            .await
            .unwrap();

        assert_eq!(report.pre.amount, BigUint::from(5000u32));
        assert_eq!(report.post.amount, BigUint::from(6234u32));
        assert_eq!(report.pre.stage, Stage::Before);
        assert_eq!(report.post.stage, Stage::After);
        assert!(report.result.is_included());
        assert_eq!(ledger.balance_of(VALIDATOR, DENOM), BigUint::from(3754u32));
    }

    #[tokio::test]
    async fn verify_transfer__unseen_recipient_starts_from_zero() {
        let ledger = funded_ledger();

        let report = harness(&ledger)
            .verify_transfer(&validator(), "nolus1fresh", &amount(), &fee(), "")
            .await
            .unwrap();

        assert_eq!(report.pre.amount, BigUint::default());
        assert_eq!(report.post.amount, BigUint::from(1234u32));
    }

    #[tokio::test]
    async fn verify_transfer__rejected_broadcast_skips_post_snapshot() {
        let ledger = funded_ledger();
        ledger.reject_next(13, "insufficient fee");

        let err = harness(&ledger)
            .verify_transfer(&validator(), USER, &amount(), &fee(), "")
            .await
            .unwrap_err();

        assert!(
            matches!(&err, Failure::BroadcastFailure { code: 13, raw_log } if raw_log == "insufficient fee"),
            "{err:?}"
        );
        assert_eq!(ledger.queries(), 1);
        assert_eq!(ledger.balance_of(USER, DENOM), BigUint::from(5000u32));
    }

    #[tokio::test]
    async fn verify_transfer__sender_without_funds_is_a_broadcast_failure() {
        let ledger = Arc::new(
            InMemoryLedger::new().with_balance(VALIDATOR, Amount::new(DENOM, 100u32)),
        );

        let err = harness(&ledger)
            .verify_transfer(&validator(), USER, &amount(), &fee(), "")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "BroadcastFailure");
        assert!(
            matches!(err, Failure::BroadcastFailure { code, .. } if code == INSUFFICIENT_FUNDS_CODE)
        );
    }

    #[tokio::test]
    async fn verify_transfer__waits_for_inclusion_of_accepted_transfer() {
        let ledger = Arc::new(
            InMemoryLedger::new()
                .with_balance(VALIDATOR, Amount::new(DENOM, 5000u32))
                .lagging(),
        );

        let report = harness(&ledger)
            .verify_transfer(&validator(), USER, &amount(), &fee(), "")
            .await
            .unwrap();

        assert_eq!(report.post.amount, BigUint::from(1234u32));
        assert_eq!(report.result.height, 1);
    }

    #[tokio::test]
    async fn verify_transfer__detects_wrong_credit() {
        let ledger = funded_ledger();
        ledger.credit_extra(1);

        let err = harness(&ledger)
            .verify_transfer(&validator(), USER, &amount(), &fee(), "")
            .await
            .unwrap_err();

        match err {
            Failure::InvariantViolation {
                expected, actual, ..
            } => {
                assert_eq!(expected, BigUint::from(6234u32));
                assert_eq!(actual, BigUint::from(6235u32));
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[tokio::test]
    async fn verify_transfer__invalid_input_submits_nothing() {
        let ledger = funded_ledger();
        let harness = harness(&ledger);

        let zero = harness
            .verify_transfer(&validator(), USER, &Amount::zero(DENOM), &fee(), "")
            .await
            .unwrap_err();
        let no_recipient = harness
            .verify_transfer(&validator(), "", &amount(), &fee(), "")
            .await
            .unwrap_err();
        let no_sender = harness
            .verify_transfer(&Account::watch_only(""), USER, &amount(), &fee(), "")
            .await
            .unwrap_err();

        for err in [zero, no_recipient, no_sender] {
            assert!(matches!(err, Failure::Configuration(_)), "{err:?}");
        }
        assert_eq!(ledger.submissions(), 0);
        assert_eq!(ledger.queries(), 0);
    }

    #[tokio::test]
    async fn verify_transfer__query_error_is_a_query_failure() {
        let ledger = funded_ledger();
        ledger.fail_queries("connection refused");

        let err = harness(&ledger)
            .verify_transfer(&validator(), USER, &amount(), &fee(), "")
            .await
            .unwrap_err();

        assert!(
            matches!(&err, Failure::QueryFailure { address, .. } if address == USER),
            "{err:?}"
        );
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(ledger.submissions(), 0);
    }

    struct StalledSubmitter;

    #[async_trait::async_trait]
    impl TxSubmitter for StalledSubmitter {
        async fn send_tokens(
            &self,
            _: &Account,
            _: &str,
            _: &[Amount],
            _: &Fee,
            _: &str,
        ) -> anyhow::Result<BroadcastResult> {
            std::future::pending().await
        }

        async fn await_inclusion(&self, _: &str) -> anyhow::Result<BroadcastResult> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn verify_transfer__times_out_when_never_included() {
        let ledger = funded_ledger();
        let harness = TransferHarness::new(
            ledger.clone(),
            Arc::new(StalledSubmitter),
            Duration::from_millis(50),
        );

        let err = harness
            .verify_transfer(&validator(), USER, &amount(), &fee(), "")
            .await
            .unwrap_err();

        assert!(
            matches!(err, Failure::Timeout { after, .. } if after == Duration::from_millis(50))
        );
    }

    // Accepted by the mempool, then either never included or failed in the block.
    struct AcceptedSubmitter {
        delivered: Option<BroadcastResult>,
    }

    fn accepted(code: u32, height: u64) -> BroadcastResult {
        BroadcastResult {
            code,
            transaction_hash: "AB12".to_string(),
            raw_log: if code == 0 {
                String::new()
            } else {
                "out of gas".to_string()
            },
            height,
        }
    }

    #[async_trait::async_trait]
    impl TxSubmitter for AcceptedSubmitter {
        async fn send_tokens(
            &self,
            _: &Account,
            _: &str,
            _: &[Amount],
            _: &Fee,
            _: &str,
        ) -> anyhow::Result<BroadcastResult> {
            Ok(accepted(0, 0))
        }

        async fn await_inclusion(&self, _: &str) -> anyhow::Result<BroadcastResult> {
            match &self.delivered {
                Some(result) => Ok(result.clone()),
                None => std::future::pending().await,
            }
        }
    }

    #[tokio::test]
    async fn verify_transfer__times_out_when_accepted_but_never_included() {
        let ledger = funded_ledger();
        let harness = TransferHarness::new(
            ledger.clone(),
            Arc::new(AcceptedSubmitter { delivered: None }),
            Duration::from_millis(50),
        );

        let err = harness
            .verify_transfer(&validator(), USER, &amount(), &fee(), "")
            .await
            .unwrap_err();

        assert!(
            matches!(&err, Failure::Timeout { transaction, .. } if transaction == "AB12"),
            "{err:?}"
        );
        assert_eq!(ledger.queries(), 1);
    }

    #[tokio::test]
    async fn verify_transfer__failed_delivery_is_a_broadcast_failure() {
        let ledger = funded_ledger();
        let harness = TransferHarness::new(
            ledger.clone(),
            Arc::new(AcceptedSubmitter {
                delivered: Some(accepted(11, 9)),
            }),
            Duration::from_secs(5),
        );

        let err = harness
            .verify_transfer(&validator(), USER, &amount(), &fee(), "")
            .await
            .unwrap_err();

        assert!(
            matches!(&err, Failure::BroadcastFailure { code: 11, raw_log } if raw_log == "out of gas"),
            "{err:?}"
        );
        assert_eq!(ledger.queries(), 1);
    }

    #[tokio::test]
    async fn verify_transfer_with_sender__debits_amount_and_fee() {
        let ledger = funded_ledger();

        let report = harness(&ledger)
            .verify_transfer_with_sender(&validator(), USER, &amount(), &fee(), "")
            .await
            .unwrap();

        assert_eq!(report.sender_pre.amount, BigUint::from(5000u32));
        assert_eq!(report.sender_post.amount, BigUint::from(3754u32));
        assert_eq!(report.transfer.post.amount, BigUint::from(6234u32));
    }

    #[tokio::test]
    async fn verify_transfer_with_sender__rejects_self_transfer() {
        let ledger = funded_ledger();

        let err = harness(&ledger)
            .verify_transfer_with_sender(&validator(), VALIDATOR, &amount(), &fee(), "")
            .await
            .unwrap_err();

        assert!(matches!(err, Failure::Configuration(_)));
        assert_eq!(ledger.submissions(), 0);
    }

    #[tokio::test]
    async fn verify_positive_balance__fails_for_unfunded_address() {
        let ledger = funded_ledger();
        let harness = harness(&ledger);

        let funded = harness.verify_positive_balance(VALIDATOR, DENOM).await.unwrap();
        let unfunded = harness
            .verify_positive_balance("nolus1fresh", DENOM)
            .await
            .unwrap_err();
        let no_denom = harness.verify_positive_balance(VALIDATOR, "").await.unwrap_err();

        assert_eq!(funded.amount, BigUint::from(5000u32));
        assert!(matches!(unfunded, Failure::AssertionFailure(_)));
        assert!(matches!(no_denom, Failure::Configuration(_)));
    }

    #[tokio::test]
    async fn verify_idempotent_read__reads_twice() {
        let ledger = funded_ledger();

        let snapshot = harness(&ledger)
            .verify_idempotent_read(VALIDATOR, DENOM)
            .await
            .unwrap();

        assert_eq!(snapshot.amount, BigUint::from(5000u32));
        assert_eq!(snapshot.stage, Stage::Reread);
        assert_eq!(ledger.queries(), 2);
    }
}
