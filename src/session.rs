use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    action::{Command, MoneyAction},
    card::{Card, CardError},
    ledger::{Ledger, LedgerError},
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    CardErr(#[from] CardError),
    #[error(transparent)]
    LedgerErr(#[from] LedgerError),
    /// `input` is the raw line when it is not a number, otherwise the parsed
    /// amount in its normalized form (`-05` reads back as `-5`).
    #[error("Invalid {action} amount '{input}'. Must be greater than zero.")]
    InvalidAmount { action: MoneyAction, input: String },
    #[error("I do not recognize the command: {input}, please try again.")]
    UnrecognizedAction { input: String },
    #[error("No card is inserted")]
    NoCardInserted,
    #[error("A card is already inserted, eject it first")]
    CardAlreadyInserted,
    #[error("ATM is shut down")]
    Terminated,
}

/// The card currently inside the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    card: Card,
}

impl Session {
    pub fn card(&self) -> &Card {
        &self.card
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingCard,
    CardActive(Session),
    Terminated,
}

/// What a successful step produced, rendered as the line shown to the card holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Balance { bank_name: String, balance: Decimal },
    Deposited { amount: Decimal, balance: Decimal },
    Withdrew { amount: Decimal, balance: Decimal },
    Ejected,
    Shutdown,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Balance { bank_name, balance } => {
                write!(f, "{bank_name} | Account Balance: {balance}")
            }
            Self::Deposited { amount, .. } => write!(f, "Successfully deposited: {amount}"),
            Self::Withdrew { amount, .. } => write!(f, "Successfully withdrew: {amount}"),
            Self::Ejected => f.write_str("Card ejected."),
            Self::Shutdown => f.write_str("ATM is now off."),
        }
    }
}

/// Drives one card at a time against an owned ledger.
///
/// `AwaitingCard -> CardActive -> (AwaitingCard | Terminated)`. Every failure is
/// returned as a [`SessionError`] and leaves the machine in a usable state.
pub struct Atm<L> {
    ledger: L,
    state: SessionState,
}

impl<L> Atm<L>
where
    L: Ledger,
{
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            state: SessionState::AwaitingCard,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    /// Validates the card and resolves its bank and account.
    ///
    /// Any failure abandons the attempt and the machine keeps waiting for a card.
    pub fn insert_card(&mut self, raw: &str) -> Result<Outcome, SessionError> {
        match self.state {
            SessionState::AwaitingCard => {}
            SessionState::CardActive(_) => return Err(SessionError::CardAlreadyInserted),
            SessionState::Terminated => return Err(SessionError::Terminated),
        }

        let outcome = Card::decode(raw)
            .map_err(SessionError::from)
            .and_then(|card| Ok((card, self.balance_of(&card)?)));
        match outcome {
            Ok((card, outcome)) => {
                info!(
                    bank_id = card.bank_id(),
                    account_id = card.account_id(),
                    "card accepted"
                );
                self.state = SessionState::CardActive(Session { card });
                Ok(outcome)
            }
            Err(err) => {
                warn!(%err, "card rejected");
                Err(err)
            }
        }
    }

    /// Runs one command against the inserted card.
    pub fn perform(&mut self, command: Command) -> Result<Outcome, SessionError> {
        let card = match self.state {
            SessionState::CardActive(session) => session.card,
            SessionState::AwaitingCard => return Err(SessionError::NoCardInserted),
            SessionState::Terminated => return Err(SessionError::Terminated),
        };

        match command {
            Command::Deposit(amount) => self.transfer(&card, MoneyAction::Deposit, amount),
            Command::Withdraw(amount) => self.transfer(&card, MoneyAction::Withdraw, amount),
            Command::Display => self.balance_of(&card),
            Command::Eject => {
                info!(account_id = card.account_id(), "card ejected");
                self.state = SessionState::AwaitingCard;
                Ok(Outcome::Ejected)
            }
            Command::Exit => {
                self.shutdown();
                Ok(Outcome::Shutdown)
            }
            Command::Unrecognized(input) => Err(SessionError::UnrecognizedAction { input }),
        }
    }

    /// Ends any active session and refuses all further input.
    pub fn shutdown(&mut self) {
        if self.state != SessionState::Terminated {
            info!("ATM shutting down");
            self.state = SessionState::Terminated;
        }
    }

    fn balance_of(&self, card: &Card) -> Result<Outcome, SessionError> {
        let bank_name = self.ledger.bank_name(card.bank_id())?.to_owned();
        let balance = self.ledger.balance(card.account_id())?;
        Ok(Outcome::Balance { bank_name, balance })
    }

    fn transfer(
        &mut self,
        card: &Card,
        action: MoneyAction,
        amount: Decimal,
    ) -> Result<Outcome, SessionError> {
        if amount <= Decimal::ZERO {
            return Err(SessionError::InvalidAmount {
                action,
                input: amount.to_string(),
            });
        }
        let balance = self
            .ledger
            .adjust(card.account_id(), action.delta(amount))?;
        Ok(match action {
            MoneyAction::Deposit => Outcome::Deposited { amount, balance },
            MoneyAction::Withdraw => Outcome::Withdrew { amount, balance },
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use crate::{action::Action, ledger::in_memory_ledger::InMemoryLedger};

    use super::*;

    const AMEX_CARD: &str = "34123455";

    fn atm() -> Atm<InMemoryLedger> {
        Atm::new(InMemoryLedger::new(
            [(34, "American Express".to_string())],
            [(12345, dec!(1650.32))],
        ))
    }

    fn active_atm() -> Atm<InMemoryLedger> {
        let mut atm = atm();
        atm.insert_card(AMEX_CARD).unwrap();
        atm
    }

    fn balance(atm: &Atm<InMemoryLedger>) -> Decimal {
        atm.ledger().balance(12345).unwrap()
    }

    #[test]
    fn insert_valid_card_shows_balance() {
        let mut atm = atm();
        let outcome = atm.insert_card(AMEX_CARD).unwrap();
        assert_eq!(
            outcome.to_string(),
            "American Express | Account Balance: 1650.32"
        );
        assert!(matches!(atm.state(), SessionState::CardActive(session) if session.card().account_id() == 12345));
    }

    #[rstest]
    #[case::too_short("3412345")]
    #[case::bad_check_digit("34123456")]
    #[case::unknown_bank("99123457")]
    #[case::unknown_account("34543215")]
    fn rejected_card_keeps_waiting(#[case] raw: &str) {
        let mut atm = atm();
        assert!(atm.insert_card(raw).is_err());
        assert_eq!(atm.state(), &SessionState::AwaitingCard);
    }

    #[test]
    fn unknown_bank_is_reported() {
        let mut atm = atm();
        let err = atm
            .insert_card(&Card::issue(99, 12345).unwrap().number())
            .unwrap_err();
        assert_eq!(err.to_string(), "No Such Bank With Id: 99");
    }

    #[test]
    fn deposit_and_withdraw() {
        let mut atm = active_atm();
        let outcome = atm.perform(Command::Deposit(dec!(100))).unwrap();
        assert_eq!(
            outcome,
            Outcome::Deposited {
                amount: dec!(100),
                balance: dec!(1750.32)
            }
        );
        assert_eq!(outcome.to_string(), "Successfully deposited: 100");

        let outcome = atm.perform(Command::Withdraw(dec!(50.32))).unwrap();
        assert_eq!(outcome.to_string(), "Successfully withdrew: 50.32");
        assert_eq!(balance(&atm), dec!(1700));
    }

    #[test]
    fn overdraft_is_reported_and_session_continues() {
        let mut atm = active_atm();
        let err = atm.perform(Command::Withdraw(dec!(2000))).unwrap_err();
        assert!(matches!(
            err,
            SessionError::LedgerErr(LedgerError::InsufficientFunds { .. })
        ));
        assert_eq!(balance(&atm), dec!(1650.32));
        assert!(matches!(atm.state(), SessionState::CardActive(_)));
    }

    #[rstest]
    #[case::negative_deposit(Command::Deposit(dec!(-5)))]
    #[case::zero_deposit(Command::Deposit(dec!(0)))]
    #[case::negative_withdraw(Command::Withdraw(dec!(-5)))]
    #[case::zero_withdraw(Command::Withdraw(dec!(0)))]
    fn non_positive_amounts_are_rejected(#[case] command: Command) {
        let mut atm = active_atm();
        let err = atm.perform(command).unwrap_err();
        assert!(matches!(err, SessionError::InvalidAmount { .. }));
        assert_eq!(balance(&atm), dec!(1650.32));
        assert!(matches!(atm.state(), SessionState::CardActive(_)));
    }

    #[test]
    fn overflowing_deposit_keeps_session() {
        let mut atm = active_atm();
        let err = atm.perform(Command::Deposit(Decimal::MAX)).unwrap_err();
        assert!(matches!(
            err,
            SessionError::LedgerErr(LedgerError::AmountOutOfRange {
                account_id: 12345,
                ..
            })
        ));
        assert_eq!(balance(&atm), dec!(1650.32));
        assert!(matches!(atm.state(), SessionState::CardActive(_)));
    }

    #[test]
    fn invalid_amount_shows_normalized_number() {
        let mut atm = active_atm();
        let amount = crate::action::parse_amount("-05").unwrap();
        let err = atm.perform(Command::Withdraw(amount)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid withdrawal amount '-5'. Must be greater than zero."
        );
    }

    #[test]
    fn invalid_amount_message() {
        let mut atm = active_atm();
        let err = atm.perform(Command::Deposit(dec!(-5))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid deposit amount '-5'. Must be greater than zero."
        );
    }

    #[test]
    fn display_never_changes_balance() {
        let mut atm = active_atm();
        for _ in 0..3 {
            let outcome = atm.perform(Command::Display).unwrap();
            assert_eq!(
                outcome,
                Outcome::Balance {
                    bank_name: "American Express".to_string(),
                    balance: dec!(1650.32)
                }
            );
        }
        atm.perform(Command::Deposit(dec!(1))).unwrap();
        atm.perform(Command::Display).unwrap();
        atm.perform(Command::Display).unwrap();
        assert_eq!(balance(&atm), dec!(1651.32));
    }

    #[test]
    fn unrecognized_action_echoes_input() {
        let mut atm = active_atm();
        let command = Action::parse("transfer").into_command().unwrap();
        let err = atm.perform(command).unwrap_err();
        assert_eq!(
            err.to_string(),
            "I do not recognize the command: transfer, please try again."
        );
        assert!(matches!(atm.state(), SessionState::CardActive(_)));
    }

    #[test]
    fn eject_waits_for_next_card() {
        let mut atm = active_atm();
        assert_eq!(atm.perform(Command::Eject).unwrap(), Outcome::Ejected);
        assert_eq!(atm.state(), &SessionState::AwaitingCard);
        assert!(matches!(
            atm.perform(Command::Display),
            Err(SessionError::NoCardInserted)
        ));
        atm.insert_card(AMEX_CARD).unwrap();
    }

    #[test]
    fn exit_is_final() {
        let mut atm = active_atm();
        assert_eq!(atm.perform(Command::Exit).unwrap(), Outcome::Shutdown);
        assert!(atm.is_terminated());
        assert!(matches!(
            atm.insert_card(AMEX_CARD),
            Err(SessionError::Terminated)
        ));
        assert!(matches!(
            atm.perform(Command::Display),
            Err(SessionError::Terminated)
        ));
    }

    #[test]
    fn second_card_is_refused() {
        let mut atm = active_atm();
        assert!(matches!(
            atm.insert_card(AMEX_CARD),
            Err(SessionError::CardAlreadyInserted)
        ));
        assert!(matches!(atm.state(), SessionState::CardActive(_)));
    }
}
