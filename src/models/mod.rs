mod errors;
mod transaction;

use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[cfg(test)]
pub use errors::InvariantViolation;
pub use transaction::{CardInfo, Location, Merchant, Metadata, Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Purchase,
    Withdrawal,
    Transfer,
    Deposit,
    Refund
}

impl TransactionType {
    #[cfg(test)]
    pub const ALL: [TransactionType; 5] = [
        TransactionType::Purchase,
        TransactionType::Withdrawal,
        TransactionType::Transfer,
        TransactionType::Deposit,
        TransactionType::Refund
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Withdrawal => "withdrawal",
            Self::Transfer => "transfer",
            Self::Deposit => "deposit",
            Self::Refund => "refund"
        }
    }

    /// Purchases and refunds are settled against a merchant.
    #[cfg(test)]
    pub fn has_merchant(&self) -> bool {
        matches!(self, Self::Purchase | Self::Refund)
    }

    #[cfg(test)]
    pub fn has_card(&self) -> bool {
        matches!(self, Self::Purchase | Self::Withdrawal | Self::Refund)
    }

    #[cfg(test)]
    pub fn has_recipient(&self) -> bool {
        matches!(self, Self::Transfer)
    }
}

impl Display for TransactionType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Chf,
    Jpy,
    Cad,
    Aud
}

impl Currency {
    pub const ALL: [Currency; 7] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Chf,
        Currency::Jpy,
        Currency::Cad,
        Currency::Aud
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Completed,
    Pending,
    Failed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Web,
    MobileApp,
    PosTerminal,
    Branch
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Debit,
    Credit
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Discover
}

impl CardNetwork {
    pub const ALL: [CardNetwork; 4] = [
        CardNetwork::Visa,
        CardNetwork::Mastercard,
        CardNetwork::Amex,
        CardNetwork::Discover
    ];
}
