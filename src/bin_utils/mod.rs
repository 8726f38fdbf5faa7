use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    action::{Action, Command, MoneyAction, parse_amount},
    ledger::in_memory_ledger::InMemoryLedger,
    session::{Atm, Outcome, SessionError},
};
pub mod bootstrap;
pub mod csv_seed;

const ACTION_PROMPT: &str = "Enter desired action: deposit, withdraw, display, eject, exit";

/// Line-at-a-time reader that strips line endings and surrounding whitespace.
///
/// Bytes that are not UTF-8 are replaced, so a garbled line still reaches the
/// card and action parsers instead of failing the read.
pub struct LineReader<R> {
    input: R,
    line: u64,
}

impl<R> LineReader<R>
where
    R: BufRead,
{
    pub fn new(input: R) -> Self {
        Self { input, line: 0 }
    }

    /// `None` once the input is exhausted.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        Ok(Some(String::from_utf8_lossy(&buf).trim().to_owned()))
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> u64 {
        self.line
    }
}

/// Where the ledger comes from before the first card is read.
pub enum Seed {
    /// Line bootstrap read from the service input itself.
    FromInput,
    Preloaded(InMemoryLedger),
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub seed: Seed,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: BufRead,
    W: Write + 'w,
{
    pub fn run(self) -> Result<()> {
        let mut reader = LineReader::new(self.input);
        let output = self.output;

        let ledger = match self.seed {
            Seed::FromInput => {
                bootstrap::read_ledger(&mut reader).context("Failed to bootstrap ledger")?
            }
            Seed::Preloaded(ledger) => ledger,
        };
        info!(
            banks = ledger.bank_count(),
            accounts = ledger.account_count(),
            "ledger ready"
        );

        let mut atm = Atm::new(ledger);
        writeln!(output, "ATM is now on.")?;

        while !atm.is_terminated() {
            write!(output, "Input Card Number: ")?;
            output.flush()?;
            let Some(raw) = reader.next_line()? else {
                info!("input closed while waiting for a card");
                break;
            };
            if Action::parse(&raw) == Action::Exit {
                atm.shutdown();
                break;
            }

            match atm.insert_card(&raw) {
                Ok(outcome) => writeln!(output, "{outcome}")?,
                Err(err) => {
                    writeln!(output, "{err}")?;
                    continue;
                }
            }
            run_session(&mut atm, &mut reader, output)?;
        }

        writeln!(output, "ATM is now off.")?;
        output.flush().context("Failed to flush output")
    }
}

/// Serves actions until the card is ejected or the ATM shuts down.
fn run_session<R, W>(
    atm: &mut Atm<InMemoryLedger>,
    reader: &mut LineReader<R>,
    output: &mut W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(output, "{ACTION_PROMPT}")?;
        let Some(line) = reader.next_line()? else {
            info!("input closed during a session");
            atm.shutdown();
            return Ok(());
        };

        let command = match Action::parse(&line).into_command() {
            Ok(command) => command,
            Err(money_action) => match read_amount(money_action, reader, output)? {
                Ok(command) => command,
                Err(err) => {
                    writeln!(output, "{err}")?;
                    continue;
                }
            },
        };

        match atm.perform(command) {
            Ok(Outcome::Shutdown) => return Ok(()),
            Ok(Outcome::Ejected) => {
                writeln!(output, "{}", Outcome::Ejected)?;
                return Ok(());
            }
            Ok(outcome) => writeln!(output, "{outcome}")?,
            Err(err) => writeln!(output, "{err}")?,
        }
    }
}

/// Prompts for and parses the amount line of a deposit or withdrawal.
///
/// The outer `Result` carries I/O failures, the inner one bad amounts.
fn read_amount<R, W>(
    action: MoneyAction,
    reader: &mut LineReader<R>,
    output: &mut W,
) -> Result<Result<Command, SessionError>>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{}", action.prompt())?;
    output.flush()?;
    let line = reader.next_line()?.unwrap_or_default();
    Ok(match parse_amount(&line) {
        Some(amount) => Ok(Command::with_amount(action, amount)),
        None => Err(SessionError::InvalidAmount {
            action,
            input: line,
        }),
    })
}
