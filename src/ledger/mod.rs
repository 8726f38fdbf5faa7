use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::card::{AccountId, BankId};

pub mod in_memory_ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Bank,
    Account,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bank => f.write_str("Bank"),
            Self::Account => f.write_str("Account"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("No Such {kind} With Id: {id}")]
    NotFound { kind: EntityKind, id: u32 },
    #[error(
        "INSUFFICIENT FUNDS: Attempted to adjust account {account_id} by {delta} with balance of {balance}"
    )]
    InsufficientFunds {
        account_id: AccountId,
        delta: Decimal,
        balance: Decimal,
    },
    #[error("Adjusting account {account_id} by {delta} is out of range")]
    AmountOutOfRange {
        account_id: AccountId,
        delta: Decimal,
    },
}

impl LedgerError {
    pub fn no_such_bank(bank_id: BankId) -> Self {
        Self::NotFound {
            kind: EntityKind::Bank,
            id: u32::from(bank_id),
        }
    }

    pub fn no_such_account(account_id: AccountId) -> Self {
        Self::NotFound {
            kind: EntityKind::Account,
            id: account_id,
        }
    }
}

/// Bank directory plus account balances, as seen by the session machine.
///
/// NOTE: only the in-memory implementation exists, the trait marks where a
/// different backing store would plug in.
pub trait Ledger {
    fn bank_name(&self, bank_id: BankId) -> Result<&str, LedgerError>;

    fn balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError>;

    /// Adds `delta` to the balance and returns the new balance.
    ///
    /// Fails without touching the ledger when the result would be negative
    /// or does not fit in a [`Decimal`].
    /// The sign of `delta` is not checked here.
    fn adjust(&mut self, account_id: AccountId, delta: Decimal) -> Result<Decimal, LedgerError>;
}
