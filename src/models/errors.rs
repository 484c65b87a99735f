use thiserror::Error;

use crate::types::TransactionId;

/// A generated record that breaks one of the structural rules of [`super::Transaction`].
#[derive(Debug, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("Transaction [{transaction_id}] has an empty [{field}]")]
    EmptyField {
        transaction_id: TransactionId,
        field: &'static str
    },
    #[error("Transaction [{transaction_id}] has a non-positive amount")]
    NonPositiveAmount {
        transaction_id: TransactionId
    },
    #[error("Transaction [{transaction_id}] has an amount with more than two decimal places")]
    AmountPrecision {
        transaction_id: TransactionId
    },
    #[error("Transaction [{transaction_id}] has a malformed [{field}]")]
    MalformedAccountId {
        transaction_id: TransactionId,
        field: &'static str
    },
    #[error("Transaction [{transaction_id}] transfers to its own account")]
    SelfTransfer {
        transaction_id: TransactionId
    },
    #[error("Transaction [{transaction_id}] has coordinates outside geographic bounds")]
    CoordinatesOutOfRange {
        transaction_id: TransactionId
    }
}
