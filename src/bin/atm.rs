use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use atm_terminal::bin_utils::{Seed, Service, bootstrap::demo_ledger, csv_seed::load_ledger};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Single-terminal ATM simulator.
///
/// Without seed options the bank/account bootstrap is read from stdin,
/// followed by the card and action lines.
#[derive(Parser, Debug)]
#[command(name = "atm")]
struct Args {
    /// CSV file with `id,name` bank rows
    #[arg(long, value_name = "FILE", requires = "accounts")]
    banks: Option<PathBuf>,

    /// CSV file with `id,balance` account rows
    #[arg(long, value_name = "FILE", requires = "banks")]
    accounts: Option<PathBuf>,

    /// Use the built-in demo banks and accounts
    #[arg(long, conflicts_with_all = ["banks", "accounts"])]
    demo: bool,
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open `{}`", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let seed = match (args.banks, args.accounts) {
        (Some(banks), Some(accounts)) => {
            Seed::Preloaded(load_ledger(open(&banks)?, open(&accounts)?)?)
        }
        _ if args.demo => Seed::Preloaded(demo_ledger()),
        _ => Seed::FromInput,
    };

    let service = Service {
        input: io::stdin().lock(),
        output: &mut io::stdout(),
        seed,
    };
    service.run()
}
