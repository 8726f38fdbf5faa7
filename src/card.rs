use std::{fmt, str::FromStr};

use thiserror::Error;

pub type BankId = u8;
pub type AccountId = u32;

pub const CARD_LENGTH: usize = 8;
const BANK_ID_LENGTH: usize = 2;
const ACCOUNT_ID_LENGTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("Card number must be length {expected}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Card number must contain only digits, got `{raw}`")]
    NotNumeric { raw: String },
    #[error("Check digit, {check_digit}, for card with number: {raw} is invalid")]
    InvalidCheckDigit { check_digit: u8, raw: String },
    #[error("Cannot issue a card for bank {bank_id} and account {account_id}")]
    FieldOutOfRange {
        bank_id: BankId,
        account_id: AccountId,
    },
}

/// Decoded card number: `BB AAAAA C`, bank id, account id and Luhn check digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    bank_id: BankId,
    account_id: AccountId,
    check_digit: u8,
}

impl Card {
    /// Validates `raw` and extracts its fields.
    ///
    /// `raw` must be exactly [`CARD_LENGTH`] ASCII digits and pass the Luhn check.
    pub fn decode(raw: &str) -> Result<Self, CardError> {
        let actual = raw.chars().count();
        if actual != CARD_LENGTH {
            return Err(CardError::InvalidLength {
                expected: CARD_LENGTH,
                actual,
            });
        }
        let Some(digits) = split_digits(raw) else {
            return Err(CardError::NotNumeric {
                raw: raw.to_owned(),
            });
        };

        let bank_id = digits_to_int(&digits[..BANK_ID_LENGTH]) as BankId;
        let account_id =
            digits_to_int(&digits[BANK_ID_LENGTH..BANK_ID_LENGTH + ACCOUNT_ID_LENGTH]);
        let check_digit = digits[CARD_LENGTH - 1];

        if luhn_sum(&digits) % 10 != 0 {
            return Err(CardError::InvalidCheckDigit {
                check_digit,
                raw: raw.to_owned(),
            });
        }

        Ok(Self {
            bank_id,
            account_id,
            check_digit,
        })
    }

    /// Builds the card for the given bank and account, computing the check digit.
    pub fn issue(bank_id: BankId, account_id: AccountId) -> Result<Self, CardError> {
        if bank_id > 99 || account_id > 99_999 {
            return Err(CardError::FieldOutOfRange {
                bank_id,
                account_id,
            });
        }
        // check digit slot stays zero, so it adds nothing to the sum
        let mut digits = [0u8; CARD_LENGTH];
        let mut payload = u32::from(bank_id) * 100_000 + account_id;
        for slot in digits[..CARD_LENGTH - 1].iter_mut().rev() {
            *slot = (payload % 10) as u8;
            payload /= 10;
        }
        let check_digit = ((10 - luhn_sum(&digits) % 10) % 10) as u8;
        Ok(Self {
            bank_id,
            account_id,
            check_digit,
        })
    }

    pub fn bank_id(&self) -> BankId {
        self.bank_id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn check_digit(&self) -> u8 {
        self.check_digit
    }

    /// The 8-digit card number, with zero-padded fields.
    pub fn number(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}{:05}{}",
            self.bank_id, self.account_id, self.check_digit
        )
    }
}

impl FromStr for Card {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

fn split_digits(raw: &str) -> Option<Vec<u8>> {
    raw.chars()
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect()
}

fn digits_to_int(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0, |number, &digit| number * 10 + u32::from(digit))
}

/// Luhn sum of `digits`, read right to left, doubling every second digit.
fn luhn_sum(digits: &[u8]) -> u32 {
    digits
        .iter()
        .rev()
        .enumerate()
        .map(|(position, &digit)| {
            let digit = u32::from(digit);
            if position % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum()
}
