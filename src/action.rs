use std::{fmt, str::FromStr};

use rust_decimal::Decimal;

/// Keyword typed by the card holder while a card is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Deposit,
    Withdraw,
    Display,
    Eject,
    Exit,
    /// Anything else, kept verbatim so it can be echoed back.
    Unrecognized(String),
}

impl Action {
    /// Total parse: surrounding whitespace is ignored and case does not matter.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "deposit" => Self::Deposit,
            "withdraw" => Self::Withdraw,
            "display" => Self::Display,
            "eject" => Self::Eject,
            "exit" => Self::Exit,
            _ => Self::Unrecognized(input.to_owned()),
        }
    }

    /// Converts to a [`Command`], or names the money action that still needs
    /// an amount line.
    pub fn into_command(self) -> Result<Command, MoneyAction> {
        match self {
            Self::Deposit => Err(MoneyAction::Deposit),
            Self::Withdraw => Err(MoneyAction::Withdraw),
            Self::Display => Ok(Command::Display),
            Self::Eject => Ok(Command::Eject),
            Self::Exit => Ok(Command::Exit),
            Self::Unrecognized(input) => Ok(Command::Unrecognized(input)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyAction {
    Deposit,
    Withdraw,
}

impl MoneyAction {
    /// Signed ledger delta for a positive `amount`.
    pub fn delta(self, amount: Decimal) -> Decimal {
        match self {
            Self::Deposit => amount,
            Self::Withdraw => -amount,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Self::Deposit => "Enter amount to deposit: ",
            Self::Withdraw => "Enter amount to withdraw: ",
        }
    }
}

impl fmt::Display for MoneyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => f.write_str("deposit"),
            Self::Withdraw => f.write_str("withdrawal"),
        }
    }
}

/// A fully formed request for the session machine.
///
/// Amounts are carried as typed; their sign is checked by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Deposit(Decimal),
    Withdraw(Decimal),
    Display,
    Eject,
    Exit,
    Unrecognized(String),
}

impl Command {
    pub fn with_amount(action: MoneyAction, amount: Decimal) -> Self {
        match action {
            MoneyAction::Deposit => Self::Deposit(amount),
            MoneyAction::Withdraw => Self::Withdraw(amount),
        }
    }
}

/// Parses an amount line. Anything that is not a decimal number yields `None`.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    Decimal::from_str(input.trim()).ok()
}
