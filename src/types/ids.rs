use std::fmt;
use std::fmt::{Display, Formatter};

use rand::Rng;
use serde::Serialize;
use uuid::{Builder, Uuid};

const ACCOUNT_PREFIX: &str = "ACC-";

/// Customer account identifier of the form `ACC-<digits>-<letter>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let number = rng.gen_range(100_000..=999_999u32);
        let letter = char::from(b'A' + rng.gen_range(0..26u8));

        Self(format!("{ACCOUNT_PREFIX}{number}-{letter}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_well_formed(value: &str) -> bool {
        let Some((digits, letter)) = value.strip_prefix(ACCOUNT_PREFIX).and_then(|rest| rest.split_once('-')) else {
            return false;
        };

        let mut letter = letter.chars();

        !digits.is_empty()
            && digits.chars().all(|c| c.is_ascii_digit())
            && letter.next().is_some_and(|c| c.is_ascii_uppercase())
            && letter.next().is_none()
    }
}

impl Display for AccountId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl Display for TransactionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(formatter)
    }
}

/// Source of transaction ids for a single generator.
///
/// The upper half of every id is a run identifier drawn once at construction, the lower
/// half is a counter. The UUID variant bits overwrite the top two bits of the counter, so
/// ids stay unique for the first 2^62 draws.
#[derive(Debug, Clone)]
pub struct IdSequence {
    run: u64,
    next: u64
}

impl IdSequence {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            run: rng.r#gen(),
            next: 0
        }
    }

    pub fn next_id(&mut self) -> TransactionId {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.run.to_be_bytes());
        bytes[8..].copy_from_slice(&self.next.to_be_bytes());
        self.next += 1;

        TransactionId(Builder::from_custom_bytes(bytes).into_uuid())
    }

    pub fn issued(&self) -> u64 {
        self.next
    }
}
