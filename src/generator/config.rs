use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::generator::catalog::{default_cities, default_merchant_categories, City, MerchantCategory};
use crate::models::{CardNetwork, Channel, Currency, Status, TransactionType};
use crate::types::{AmountRule, ConfigError};

/// Tunable distributions for the transaction generator.
///
/// Every field has a documented default and can be overridden from a TOML profile. A
/// table or section given in the profile replaces the default for that field as a whole.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Relative weight of each transaction type.
    pub transaction_types: BTreeMap<TransactionType, u32>,
    /// Relative weight of each status.
    pub statuses: BTreeMap<Status, u32>,
    /// Relative weight of each originating channel.
    pub channels: BTreeMap<Channel, u32>,
    pub currencies: Vec<Currency>,
    pub card_networks: Vec<CardNetwork>,
    pub amounts: AmountRules,
    pub accounts: PoolConfig,
    pub merchants: PoolConfig,
    pub merchant_categories: Vec<MerchantCategory>,
    pub cities: Vec<City>,
    /// Maximum offset in degrees applied to a city centre for each location.
    pub location_jitter: f64
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            transaction_types: BTreeMap::from([
                (TransactionType::Purchase, 50),
                (TransactionType::Withdrawal, 15),
                (TransactionType::Transfer, 15),
                (TransactionType::Deposit, 10),
                (TransactionType::Refund, 10)
            ]),
            statuses: BTreeMap::from([
                (Status::Completed, 85),
                (Status::Pending, 10),
                (Status::Failed, 5)
            ]),
            channels: BTreeMap::from([
                (Channel::MobileApp, 35),
                (Channel::Web, 30),
                (Channel::PosTerminal, 25),
                (Channel::Branch, 10)
            ]),
            currencies: Currency::ALL.to_vec(),
            card_networks: CardNetwork::ALL.to_vec(),
            amounts: AmountRules::default(),
            accounts: PoolConfig {
                initial: 100,
                capacity: 200,
                reuse_probability: 0.8
            },
            merchants: PoolConfig {
                initial: 50,
                capacity: 100,
                reuse_probability: 0.7
            },
            merchant_categories: default_merchant_categories(),
            cities: default_cities(),
            location_jitter: 0.05
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(profile: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(profile)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let profile = fs::read_to_string(path).map_err(|source| ConfigError::ProfileRead {
            path: path.display().to_string(),
            source
        })?;

        Self::from_toml_str(&profile).map_err(|source| ConfigError::ProfileParse {
            path: path.display().to_string(),
            source
        })
    }
}

/// Amount rule per transaction type. Defaults keep purchases and refunds small, transfers
/// and deposits large, and withdrawals on cash-machine denominations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AmountRules {
    pub purchase: AmountRule,
    pub withdrawal: AmountRule,
    pub transfer: AmountRule,
    pub deposit: AmountRule,
    pub refund: AmountRule
}

impl AmountRules {
    pub fn rule(&self, transaction_type: TransactionType) -> &AmountRule {
        match transaction_type {
            TransactionType::Purchase => &self.purchase,
            TransactionType::Withdrawal => &self.withdrawal,
            TransactionType::Transfer => &self.transfer,
            TransactionType::Deposit => &self.deposit,
            TransactionType::Refund => &self.refund
        }
    }
}

impl Default for AmountRules {
    fn default() -> Self {
        Self {
            purchase: AmountRule::uniform(Decimal::new(100, 2), Decimal::new(50_000, 2)),
            withdrawal: AmountRule::choice([20, 40, 50, 60, 80, 100, 200, 300, 500].map(Decimal::from)),
            transfer: AmountRule::uniform(Decimal::new(1_000, 2), Decimal::new(500_000, 2)),
            deposit: AmountRule::uniform(Decimal::new(10_000, 2), Decimal::new(1_000_000, 2)),
            refund: AmountRule::uniform(Decimal::new(500, 2), Decimal::new(20_000, 2))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    /// Entries minted up front.
    pub initial: usize,
    /// Upper bound on retained entries.
    pub capacity: usize,
    /// Chance that a draw reuses an existing entry instead of minting a new one.
    pub reuse_probability: f64
}

impl PoolConfig {
    pub fn validate(&self, pool: &'static str) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::invalid_pool(pool, "capacity must be at least 1"));
        }

        if self.initial > self.capacity {
            return Err(ConfigError::invalid_pool(pool, format!("initial size [{}] exceeds capacity [{}]", self.initial, self.capacity)));
        }

        if !(0.0..=1.0).contains(&self.reuse_probability) {
            return Err(ConfigError::invalid_pool(pool, format!("reuse probability [{}] is outside [0, 1]", self.reuse_probability)));
        }

        Ok(())
    }
}
