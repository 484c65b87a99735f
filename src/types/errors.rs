use thiserror::Error;

use crate::models::TransactionType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: the [{pool}] pool is empty")]
    EmptyPool {
        pool: &'static str
    },
    #[error("Configuration error: the [{table}] weights are unusable: {reason}")]
    InvalidWeights {
        table: &'static str,
        reason: String
    },
    #[error("Configuration error: the amount rule for [{transaction_type}] is invalid: {reason}")]
    InvalidAmount {
        transaction_type: TransactionType,
        reason: String
    },
    #[error("Configuration error: the [{pool}] pool settings are invalid: {reason}")]
    InvalidPool {
        pool: &'static str,
        reason: String
    },
    #[error("Configuration error: rate must be a positive number of transactions per second, got [{0}]")]
    InvalidRate(f64),
    #[error("Configuration error: unable to read profile [{path}]: {source}")]
    ProfileRead {
        path: String,
        #[source]
        source: std::io::Error
    },
    #[error("Configuration error: unable to parse profile [{path}]: {source}")]
    ProfileParse {
        path: String,
        #[source]
        source: toml::de::Error
    }
}

impl ConfigError {
    pub fn empty_pool(pool: &'static str) -> Self {
        Self::EmptyPool { pool }
    }

    pub fn invalid_weights(table: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidWeights { table, reason: reason.into() }
    }

    pub fn invalid_amount(transaction_type: TransactionType, reason: impl Into<String>) -> Self {
        Self::InvalidAmount { transaction_type, reason: reason.into() }
    }

    pub fn invalid_pool(pool: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidPool { pool, reason: reason.into() }
    }
}
