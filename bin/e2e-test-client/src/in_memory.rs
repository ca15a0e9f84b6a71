//! A deterministic ledger living in memory, used to exercise the harness
//! and the scenarios without a node.

use crate::ports::{
    AccountProvider,
    BalanceQuery,
    TxSubmitter,
};
use ledger_check_types::{
    Account,
    Amount,
    BigUint,
    BroadcastResult,
    Fee,
};
use parking_lot::Mutex;
use std::collections::{
    BTreeMap,
    HashMap,
};

/// Code the bank module reports for a sender without enough funds.
pub const INSUFFICIENT_FUNDS_CODE: u32 = 5;

#[derive(Debug, Clone)]
struct PendingTransfer {
    sender: String,
    recipient: String,
    amounts: Vec<Amount>,
    fee: Vec<Amount>,
    memo: String,
}

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<(String, String), BigUint>,
    accounts: Vec<Account>,
    height: u64,
    transactions: u64,
    pending: HashMap<String, PendingTransfer>,
    included: HashMap<String, BroadcastResult>,
    lagging: bool,
    rejection: Option<(u32, String)>,
    query_error: Option<String>,
    extra_credit: BigUint,
    submissions: usize,
    queries: usize,
}

impl LedgerState {
    fn balance(&self, address: &str, denom: &str) -> BigUint {
        self.balances
            .get(&(address.to_string(), denom.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn has_funds(&self, address: &str, spending: &[&Amount]) -> bool {
        let mut needed: BTreeMap<&str, BigUint> = BTreeMap::new();
        for coin in spending {
            *needed.entry(coin.denom.as_str()).or_default() += &coin.amount;
        }
        needed
            .into_iter()
            .all(|(denom, need)| self.balance(address, denom) >= need)
    }

    fn debit(&mut self, address: &str, coin: &Amount) {
        let key = (address.to_string(), coin.denom.clone());
        let balance = self.balances.entry(key).or_default();
        *balance -= &coin.amount;
    }

    fn credit(&mut self, address: &str, denom: &str, amount: &BigUint) {
        let key = (address.to_string(), denom.to_string());
        *self.balances.entry(key).or_default() += amount;
    }

    fn include(&mut self, hash: String, transfer: PendingTransfer) -> BroadcastResult {
        for coin in transfer.amounts.iter().chain(transfer.fee.iter()) {
            self.debit(&transfer.sender, coin);
        }
        for coin in &transfer.amounts {
            self.credit(&transfer.recipient, &coin.denom, &coin.amount);
        }
        if let Some(first) = transfer.amounts.first() {
            let extra = self.extra_credit.clone();
            self.credit(&transfer.recipient, &first.denom, &extra);
        }

        self.height += 1;
        let result = BroadcastResult {
            code: 0,
            transaction_hash: hash.clone(),
            raw_log: format!("memo: {}", transfer.memo),
            height: self.height,
        };
        self.included.insert(hash, result.clone());
        result
    }
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, address: &str, balance: Amount) -> Self {
        self.state
            .lock()
            .balances
            .insert((address.to_string(), balance.denom), balance.amount);
        self
    }

    pub fn with_account(self, account: Account) -> Self {
        self.state.lock().accounts.push(account);
        self
    }

    /// Transfers are only accepted into the mempool by `send_tokens` and
    /// applied by `await_inclusion`.
    pub fn lagging(self) -> Self {
        self.state.lock().lagging = true;
        self
    }

    /// The next submission is rejected with `code`.
    pub fn reject_next(&self, code: u32, raw_log: &str) {
        self.state.lock().rejection = Some((code, raw_log.to_string()));
    }

    /// Every balance query fails with `reason` from now on.
    pub fn fail_queries(&self, reason: &str) {
        self.state.lock().query_error = Some(reason.to_string());
    }

    /// Credits recipients `extra` on top of every transfer, like a faulty
    /// bank module would.
    pub fn credit_extra(&self, extra: u64) {
        self.state.lock().extra_credit = BigUint::from(extra);
    }

    pub fn balance_of(&self, address: &str, denom: &str) -> BigUint {
        self.state.lock().balance(address, denom)
    }

    pub fn submissions(&self) -> usize {
        self.state.lock().submissions
    }

    pub fn queries(&self) -> usize {
        self.state.lock().queries
    }
}

#[async_trait::async_trait]
impl BalanceQuery for InMemoryLedger {
    async fn balance(&self, address: &str, denom: &str) -> anyhow::Result<Amount> {
        let mut state = self.state.lock();
        state.queries += 1;
        if let Some(reason) = &state.query_error {
            anyhow::bail!("{reason}")
        }
        Ok(Amount::new(denom, state.balance(address, denom)))
    }
}

#[async_trait::async_trait]
impl TxSubmitter for InMemoryLedger {
    async fn send_tokens(
        &self,
        sender: &Account,
        recipient: &str,
        amounts: &[Amount],
        fee: &Fee,
        memo: &str,
    ) -> anyhow::Result<BroadcastResult> {
        let mut state = self.state.lock();
        state.submissions += 1;
        state.transactions += 1;
        let hash = format!("{:064X}", state.transactions);

        if let Some((code, raw_log)) = state.rejection.take() {
            return Ok(BroadcastResult {
                code,
                transaction_hash: hash,
                raw_log,
                height: 0,
            })
        }

        let spending: Vec<&Amount> = amounts.iter().chain(fee.amount.iter()).collect();
        if !state.has_funds(&sender.address, &spending) {
            return Ok(BroadcastResult {
                code: INSUFFICIENT_FUNDS_CODE,
                transaction_hash: hash,
                raw_log: format!("{} has insufficient funds", sender.address),
                height: 0,
            })
        }

        let transfer = PendingTransfer {
            sender: sender.address.clone(),
            recipient: recipient.to_string(),
            amounts: amounts.to_vec(),
            fee: fee.amount.clone(),
            memo: memo.to_string(),
        };
        if state.lagging {
            state.pending.insert(hash.clone(), transfer);
            return Ok(BroadcastResult {
                code: 0,
                transaction_hash: hash,
                raw_log: String::new(),
                height: 0,
            })
        }
        Ok(state.include(hash, transfer))
    }

    async fn await_inclusion(
        &self,
        transaction_hash: &str,
    ) -> anyhow::Result<BroadcastResult> {
        let mut state = self.state.lock();
        if let Some(transfer) = state.pending.remove(transaction_hash) {
            return Ok(state.include(transaction_hash.to_string(), transfer))
        }
        state
            .included
            .get(transaction_hash)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown transaction {transaction_hash}"))
    }
}

#[async_trait::async_trait]
impl AccountProvider for InMemoryLedger {
    async fn accounts(&self) -> anyhow::Result<Vec<Account>> {
        Ok(self.state.lock().accounts.clone())
    }
}
