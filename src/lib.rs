/// Card number decoding: length check, Luhn check digit and field extraction.
/// Pure functions only.
pub mod card;

/// Bank directory and account balances, behind the [`ledger::Ledger`] trait,
/// plus the "in memory" implementation.
/// Every balance change goes through `adjust`, which never lets a balance go negative.
pub mod ledger;

/// Action keywords typed by the card holder and the commands built from them.
pub mod action;

/// ATM state machine: card insertion, action dispatch and card ejection.
/// Owns the ledger it works on.
pub mod session;

/// Terminal plumbing used by the binary and the integration tests:
/// line reading, prompts and ledger bootstrap.
pub mod bin_utils;
