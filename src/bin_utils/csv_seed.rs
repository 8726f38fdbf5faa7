use std::io::Read;

use anyhow::{Context, Result};
use csv::Trim;
use rust_decimal::Decimal;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    card::{AccountId, BankId},
    ledger::in_memory_ledger::InMemoryLedger,
};

#[derive(Debug, Deserialize)]
struct BankRecord {
    id: BankId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    id: AccountId,
    balance: Decimal,
}

/// Builds the ledger from two CSV files with `id,name` and `id,balance` headers.
pub fn load_ledger<B, A>(banks: B, accounts: A) -> Result<InMemoryLedger>
where
    B: Read,
    A: Read,
{
    let banks = read_records::<_, BankRecord>(banks).context("Failed to read bank seed")?;
    let accounts =
        read_records::<_, AccountRecord>(accounts).context("Failed to read account seed")?;

    Ok(InMemoryLedger::new(
        banks.into_iter().map(|bank| (bank.id, bank.name)),
        accounts
            .into_iter()
            .map(|account| (account.id, account.balance)),
    ))
}

fn read_records<R, T>(source: R) -> Result<Vec<T>>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(source);

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record = row.context("Malformed CSV row")?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::ledger::Ledger;

    use super::*;

    #[test]
    fn load_seed_files() {
        let banks = "id, name\n34, American Express\n45, Visa\n";
        let accounts = "id,balance\n12345,1650.32\n54321, -12.5\n";
        let ledger = load_ledger(banks.as_bytes(), accounts.as_bytes()).unwrap();
        assert_eq!(ledger.bank_name(34).unwrap(), "American Express");
        assert_eq!(ledger.bank_name(45).unwrap(), "Visa");
        assert_eq!(ledger.balance(12345).unwrap(), dec!(1650.32));
        assert_eq!(ledger.balance(54321).unwrap(), dec!(-12.5));
    }

    #[test]
    fn bad_row_is_an_error() {
        let banks = "id,name\n300,Too Big\n";
        let accounts = "id,balance\n";
        let err = load_ledger(banks.as_bytes(), accounts.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to read bank seed");
    }
}
