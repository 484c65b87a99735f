use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::models::errors::InvariantViolation;
use crate::models::{CardNetwork, CardType, Channel, Currency, Status, TransactionType};
use crate::types::{AccountId, TransactionId};

/// A single synthetic financial transaction.
///
/// The type-dependent payload lives in [`TransactionKind`], so a record can never carry
/// merchant or card data next to transfer data. Serialization flattens the kind back into
/// the wire shape, with absent optional sections written as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Unique within the generator that produced it.
    pub transaction_id: TransactionId,
    /// Generation time in UTC.
    pub timestamp: DateTime<Utc>,
    /// The customer account, also used as the publish key.
    pub account_id: AccountId,
    /// Strictly positive, two decimal places.
    pub amount: Decimal,
    pub currency: Currency,
    pub status: Status,
    pub location: Location,
    pub metadata: Metadata,
    pub kind: TransactionKind
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionKind {
    Purchase {
        merchant: Merchant,
        card: CardInfo
    },
    Withdrawal {
        card: CardInfo
    },
    Transfer {
        recipient_account_id: AccountId,
        transfer_reference: String
    },
    Deposit,
    Refund {
        merchant: Merchant,
        card: CardInfo
    }
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Purchase { .. } => TransactionType::Purchase,
            Self::Withdrawal { .. } => TransactionType::Withdrawal,
            Self::Transfer { .. } => TransactionType::Transfer,
            Self::Deposit => TransactionType::Deposit,
            Self::Refund { .. } => TransactionType::Refund
        }
    }

    pub fn merchant(&self) -> Option<&Merchant> {
        match self {
            Self::Purchase { merchant, .. } | Self::Refund { merchant, .. } => Some(merchant),
            _ => None
        }
    }

    pub fn card(&self) -> Option<&CardInfo> {
        match self {
            Self::Purchase { card, .. } | Self::Withdrawal { card } | Self::Refund { card, .. } => Some(card),
            _ => None
        }
    }

    pub fn recipient_account_id(&self) -> Option<&AccountId> {
        match self {
            Self::Transfer { recipient_account_id, .. } => Some(recipient_account_id),
            _ => None
        }
    }

    pub fn transfer_reference(&self) -> Option<&str> {
        match self {
            Self::Transfer { transfer_reference, .. } => Some(transfer_reference),
            _ => None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Merchant {
    pub merchant_id: String,
    pub merchant_name: String,
    pub merchant_category: String,
    pub mcc_code: String
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardInfo {
    pub card_type: CardType,
    pub card_network: CardNetwork,
    pub card_last_four: String
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub city: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    pub latitude: f64,
    pub longitude: f64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub channel: Channel,
    pub device_id: String,
    pub ip_address: String
}

impl Transaction {
    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    /// Checks the rules the type system cannot express on its own.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let transaction_id = self.transaction_id;

        if self.amount <= Decimal::ZERO {
            return Err(InvariantViolation::NonPositiveAmount { transaction_id });
        }

        if self.amount.normalize().scale() > 2 {
            return Err(InvariantViolation::AmountPrecision { transaction_id });
        }

        if !AccountId::is_well_formed(self.account_id.as_str()) {
            return Err(InvariantViolation::MalformedAccountId { transaction_id, field: "account_id" });
        }

        if !(-90.0..=90.0).contains(&self.location.latitude) || !(-180.0..=180.0).contains(&self.location.longitude) {
            return Err(InvariantViolation::CoordinatesOutOfRange { transaction_id });
        }

        let mut required = vec![
            ("location.city", self.location.city.as_str()),
            ("location.country", self.location.country.as_str()),
            ("metadata.device_id", self.metadata.device_id.as_str()),
            ("metadata.ip_address", self.metadata.ip_address.as_str())
        ];

        if let Some(merchant) = self.kind.merchant() {
            required.extend([
                ("merchant.merchant_id", merchant.merchant_id.as_str()),
                ("merchant.merchant_name", merchant.merchant_name.as_str()),
                ("merchant.merchant_category", merchant.merchant_category.as_str()),
                ("merchant.mcc_code", merchant.mcc_code.as_str())
            ]);
        }

        if let Some(card) = self.kind.card() {
            required.push(("card_info.card_last_four", card.card_last_four.as_str()));
        }

        if let TransactionKind::Transfer { recipient_account_id, transfer_reference } = &self.kind {
            if !AccountId::is_well_formed(recipient_account_id.as_str()) {
                return Err(InvariantViolation::MalformedAccountId { transaction_id, field: "recipient_account_id" });
            }

            if *recipient_account_id == self.account_id {
                return Err(InvariantViolation::SelfTransfer { transaction_id });
            }

            required.push(("transfer_reference", transfer_reference.as_str()));
        }

        match required.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(InvariantViolation::EmptyField { transaction_id, field }),
            None => Ok(())
        }
    }
}

/// Wire shape of a transaction. Every optional section is always present, `null` when absent.
#[derive(Serialize)]
struct TransactionRecord<'a> {
    transaction_id: &'a TransactionId,
    timestamp: &'a DateTime<Utc>,
    account_id: &'a AccountId,
    transaction_type: TransactionType,
    #[serde(serialize_with = "serialize_amount")]
    amount: Decimal,
    currency: Currency,
    status: Status,
    location: &'a Location,
    merchant: Option<&'a Merchant>,
    card_info: Option<&'a CardInfo>,
    recipient_account_id: Option<&'a AccountId>,
    transfer_reference: Option<&'a str>,
    metadata: &'a Metadata
}

impl<'a> From<&'a Transaction> for TransactionRecord<'a> {
    fn from(transaction: &'a Transaction) -> Self {
        Self {
            transaction_id: &transaction.transaction_id,
            timestamp: &transaction.timestamp,
            account_id: &transaction.account_id,
            transaction_type: transaction.transaction_type(),
            amount: transaction.amount,
            currency: transaction.currency,
            status: transaction.status,
            location: &transaction.location,
            merchant: transaction.kind.merchant(),
            card_info: transaction.kind.card(),
            recipient_account_id: transaction.kind.recipient_account_id(),
            transfer_reference: transaction.kind.transfer_reference(),
            metadata: &transaction.metadata
        }
    }
}

impl Serialize for Transaction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        TransactionRecord::from(self).serialize(serializer)
    }
}

/// Writes the amount as a JSON number. Dividing the integer mantissa keeps the nearest
/// binary value to the decimal, which prints back as the same decimal as long as it has at
/// most fifteen significant digits (see `MAX_AMOUNT_CENTS`).
fn serialize_amount<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let scale = 10f64.powi(amount.scale() as i32);
    serializer.serialize_f64(amount.mantissa() as f64 / scale)
}
