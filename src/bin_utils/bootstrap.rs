use std::{io::BufRead, str::FromStr};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    card::{AccountId, BankId},
    ledger::in_memory_ledger::InMemoryLedger,
};

use super::LineReader;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Unexpected end of input after line {line}, expected {expected}")]
    UnexpectedEof { line: u64, expected: &'static str },
    #[error("Line {line}: cannot read {expected} from `{value}`")]
    Malformed {
        line: u64,
        expected: &'static str,
        value: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reads the line bootstrap: a count `n`, then `n` bank id/name line pairs,
/// then `n` account id/balance line pairs.
pub fn read_ledger<R>(reader: &mut LineReader<R>) -> Result<InMemoryLedger, BootstrapError>
where
    R: BufRead,
{
    let count: usize = parse_next(reader, "bank and account count")?;

    // count is untrusted input, so nothing is reserved up front
    let mut banks = Vec::new();
    for _ in 0..count {
        let bank_id: BankId = parse_next(reader, "bank id")?;
        let name = next_field(reader, "bank name")?;
        banks.push((bank_id, name));
    }

    let mut accounts = Vec::new();
    for _ in 0..count {
        let account_id: AccountId = parse_next(reader, "account id")?;
        let balance: Decimal = parse_next(reader, "account balance")?;
        accounts.push((account_id, balance));
    }

    Ok(InMemoryLedger::new(banks, accounts))
}

/// Fixed data set used by `--demo`.
pub fn demo_ledger() -> InMemoryLedger {
    InMemoryLedger::new(
        [
            (34, "American Express".to_string()),
            (45, "Visa".to_string()),
            (51, "Mastercard".to_string()),
        ],
        [
            (12345, Decimal::new(165032, 2)),
            (54321, Decimal::new(20000, 2)),
            (11111, Decimal::new(-5000, 2)),
        ],
    )
}

fn next_field<R>(
    reader: &mut LineReader<R>,
    expected: &'static str,
) -> Result<String, BootstrapError>
where
    R: BufRead,
{
    reader.next_line()?.ok_or(BootstrapError::UnexpectedEof {
        line: reader.line_number(),
        expected,
    })
}

fn parse_next<R, T>(
    reader: &mut LineReader<R>,
    expected: &'static str,
) -> Result<T, BootstrapError>
where
    R: BufRead,
    T: FromStr,
{
    let value = next_field(reader, expected)?;
    value.parse().map_err(|_| BootstrapError::Malformed {
        line: reader.line_number(),
        expected,
        value,
    })
}
