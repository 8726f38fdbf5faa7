use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::card::{AccountId, BankId};

use super::{Ledger, LedgerError};

#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    banks: HashMap<BankId, String>,
    accounts: HashMap<AccountId, Decimal>,
}

impl InMemoryLedger {
    /// Later entries with the same id replace earlier ones.
    pub fn new(
        banks: impl IntoIterator<Item = (BankId, String)>,
        accounts: impl IntoIterator<Item = (AccountId, Decimal)>,
    ) -> Self {
        Self {
            banks: banks.into_iter().collect(),
            accounts: accounts.into_iter().collect(),
        }
    }

    pub fn bank_count(&self) -> usize {
        self.banks.len()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl Ledger for InMemoryLedger {
    fn bank_name(&self, bank_id: BankId) -> Result<&str, LedgerError> {
        self.banks
            .get(&bank_id)
            .map(String::as_str)
            .ok_or(LedgerError::no_such_bank(bank_id))
    }

    fn balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        self.accounts
            .get(&account_id)
            .copied()
            .ok_or(LedgerError::no_such_account(account_id))
    }

    fn adjust(&mut self, account_id: AccountId, delta: Decimal) -> Result<Decimal, LedgerError> {
        let Some(balance) = self.accounts.get_mut(&account_id) else {
            return Err(LedgerError::no_such_account(account_id));
        };
        let Some(new_balance) = balance.checked_add(delta) else {
            return Err(LedgerError::AmountOutOfRange { account_id, delta });
        };
        if new_balance < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds {
                account_id,
                delta,
                balance: *balance,
            });
        }
        debug!(account_id, %delta, %new_balance, "balance adjusted");
        *balance = new_balance;
        Ok(new_balance)
    }
}
