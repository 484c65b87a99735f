use std::net::Ipv4Addr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::generator::catalog::{City, MerchantCategory, NAME_PREFIXES, NAME_STEMS, NAME_SUFFIXES};
use crate::generator::{Clock, GeneratorConfig, RotatingPool, SystemClock};
use crate::models::{CardInfo, CardNetwork, CardType, Channel, Currency, Location, Merchant, Metadata, Status, Transaction, TransactionKind, TransactionType};
use crate::types::{AccountId, AmountSampler, Choices, ConfigError, IdSequence, WeightedTable};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";
const COORDINATE_SCALE: f64 = 1_000_000.0;

/// Produces well-formed synthetic transactions.
///
/// The generator owns its random source, clock and id sequence, so independent instances
/// never share state. All configuration is validated once in the constructor; `generate`
/// itself cannot fail.
pub struct TransactionGenerator<R = StdRng, C = SystemClock> {
    rng: R,
    clock: C,
    ids: IdSequence,
    tables: Tables,
    accounts: RotatingPool<AccountId>,
    merchants: RotatingPool<Merchant>
}

/// Validated, ready-to-sample form of a [`GeneratorConfig`].
struct Tables {
    transaction_types: WeightedTable<TransactionType>,
    statuses: WeightedTable<Status>,
    channels: WeightedTable<Channel>,
    currencies: Choices<Currency>,
    card_networks: Choices<CardNetwork>,
    purchase: AmountSampler,
    withdrawal: AmountSampler,
    transfer: AmountSampler,
    deposit: AmountSampler,
    refund: AmountSampler,
    merchant_categories: Choices<MerchantCategory>,
    cities: Choices<City>,
    location_jitter: f64
}

impl TransactionGenerator {
    /// Builds a generator backed by `StdRng`, seeded when a seed is given and from OS
    /// entropy otherwise.
    pub fn new(config: &GeneratorConfig, seed: Option<u64>) -> Result<Self, ConfigError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy()
        };

        Self::with_parts(config, rng, SystemClock)
    }
}

impl<R: Rng, C: Clock> TransactionGenerator<R, C> {
    pub fn with_parts(config: &GeneratorConfig, mut rng: R, clock: C) -> Result<Self, ConfigError> {
        let tables = Tables::new(config)?;
        let ids = IdSequence::new(&mut rng);
        let accounts = RotatingPool::new("accounts", &config.accounts, &mut rng, |rng| AccountId::random(rng))?;
        let merchants = RotatingPool::new("merchants", &config.merchants, &mut rng, |rng| mint_merchant(rng, &tables))?;

        debug!(
            "Transaction generator ready: {} accounts and {} merchants pre-seeded, {} cities, {} merchant categories",
            config.accounts.initial,
            config.merchants.initial,
            tables.cities.len(),
            tables.merchant_categories.len()
        );

        Ok(Self {
            rng,
            clock,
            ids,
            tables,
            accounts,
            merchants
        })
    }

    /// Generates one transaction.
    pub fn generate(&mut self) -> Transaction {
        let transaction_type = self.tables.transaction_types.sample(&mut self.rng);
        let account_id = self.accounts.draw(&mut self.rng, |rng| AccountId::random(rng));
        let amount = self.tables.amount(transaction_type).sample(&mut self.rng);
        let currency = *self.tables.currencies.pick(&mut self.rng);
        let status = self.tables.statuses.sample(&mut self.rng);
        let location = self.location();
        let metadata = self.metadata();
        let kind = self.kind(transaction_type, &account_id);

        let transaction = Transaction {
            transaction_id: self.ids.next_id(),
            timestamp: self.clock.now(),
            account_id,
            amount,
            currency,
            status,
            location,
            metadata,
            kind
        };

        debug_assert_eq!(transaction.validate(), Ok(()));

        transaction
    }

    /// Number of transactions generated so far.
    pub fn issued(&self) -> u64 {
        self.ids.issued()
    }

    fn kind(&mut self, transaction_type: TransactionType, account_id: &AccountId) -> TransactionKind {
        match transaction_type {
            TransactionType::Purchase => TransactionKind::Purchase {
                merchant: self.merchant(),
                card: self.card()
            },
            TransactionType::Withdrawal => TransactionKind::Withdrawal {
                card: self.card()
            },
            TransactionType::Transfer => TransactionKind::Transfer {
                recipient_account_id: self.recipient(account_id),
                transfer_reference: format!("TRF-{}", random_hex(&mut self.rng, 10).to_ascii_uppercase())
            },
            TransactionType::Deposit => TransactionKind::Deposit,
            TransactionType::Refund => TransactionKind::Refund {
                merchant: self.merchant(),
                card: self.card()
            }
        }
    }

    fn merchant(&mut self) -> Merchant {
        let tables = &self.tables;
        self.merchants.draw(&mut self.rng, |rng| mint_merchant(rng, tables))
    }

    fn card(&mut self) -> CardInfo {
        let card_type = if self.rng.gen_bool(0.5) { CardType::Debit } else { CardType::Credit };

        CardInfo {
            card_type,
            card_network: *self.tables.card_networks.pick(&mut self.rng),
            card_last_four: format!("{:04}", self.rng.gen_range(0..10_000u32))
        }
    }

    fn recipient(&mut self, account_id: &AccountId) -> AccountId {
        loop {
            let candidate = AccountId::random(&mut self.rng);

            if candidate != *account_id {
                return candidate;
            }
        }
    }

    fn location(&mut self) -> Location {
        let city = self.tables.cities.pick(&mut self.rng);
        let jitter = self.tables.location_jitter;
        let latitude = city.latitude + self.rng.gen_range(-jitter..=jitter);
        let longitude = city.longitude + self.rng.gen_range(-jitter..=jitter);

        Location {
            city: city.name.clone(),
            country: city.country.clone(),
            latitude: round_coordinate(latitude.clamp(-90.0, 90.0)),
            longitude: round_coordinate(longitude.clamp(-180.0, 180.0))
        }
    }

    fn metadata(&mut self) -> Metadata {
        Metadata {
            channel: self.tables.channels.sample(&mut self.rng),
            device_id: random_hex(&mut self.rng, 16),
            ip_address: public_ipv4(&mut self.rng).to_string()
        }
    }
}

impl Tables {
    fn new(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        let sampler = |transaction_type| config.amounts.rule(transaction_type).sampler(transaction_type);

        if !config.location_jitter.is_finite() || !(0.0..=1.0).contains(&config.location_jitter) {
            return Err(ConfigError::invalid_pool("cities", format!("location jitter [{}] is outside [0, 1]", config.location_jitter)));
        }

        for city in &config.cities {
            if city.name.trim().is_empty() {
                return Err(ConfigError::invalid_pool("cities", "every city needs a name"));
            }

            if !is_country_code(&city.country) {
                return Err(ConfigError::invalid_pool("cities", format!("[{}] country [{}] is not a two-letter ISO code", city.name, city.country)));
            }

            if !(-90.0..=90.0).contains(&city.latitude) || !(-180.0..=180.0).contains(&city.longitude) {
                return Err(ConfigError::invalid_pool("cities", format!("[{}] has coordinates outside geographic bounds", city.name)));
            }
        }

        for category in &config.merchant_categories {
            if category.name.trim().is_empty() {
                return Err(ConfigError::invalid_pool("merchant_categories", "every category needs a name"));
            }

            if !is_mcc_code(&category.mcc_code) {
                return Err(ConfigError::invalid_pool("merchant_categories", format!("[{}] mcc code [{}] is not four digits", category.name, category.mcc_code)));
            }
        }

        Ok(Self {
            transaction_types: WeightedTable::new("transaction_types", &config.transaction_types)?,
            statuses: WeightedTable::new("statuses", &config.statuses)?,
            channels: WeightedTable::new("channels", &config.channels)?,
            currencies: Choices::new("currencies", config.currencies.clone())?,
            card_networks: Choices::new("card_networks", config.card_networks.clone())?,
            purchase: sampler(TransactionType::Purchase)?,
            withdrawal: sampler(TransactionType::Withdrawal)?,
            transfer: sampler(TransactionType::Transfer)?,
            deposit: sampler(TransactionType::Deposit)?,
            refund: sampler(TransactionType::Refund)?,
            merchant_categories: Choices::new("merchant_categories", config.merchant_categories.clone())?,
            cities: Choices::new("cities", config.cities.clone())?,
            location_jitter: config.location_jitter
        })
    }

    fn amount(&self, transaction_type: TransactionType) -> &AmountSampler {
        match transaction_type {
            TransactionType::Purchase => &self.purchase,
            TransactionType::Withdrawal => &self.withdrawal,
            TransactionType::Transfer => &self.transfer,
            TransactionType::Deposit => &self.deposit,
            TransactionType::Refund => &self.refund
        }
    }
}

fn is_country_code(value: &str) -> bool {
    value.len() == 2 && value.bytes().all(|byte| byte.is_ascii_uppercase())
}

fn is_mcc_code(value: &str) -> bool {
    value.len() == 4 && value.bytes().all(|byte| byte.is_ascii_digit())
}

fn mint_merchant<R: Rng + ?Sized>(rng: &mut R, tables: &Tables) -> Merchant {
    let category = tables.merchant_categories.pick(rng);
    let merchant_id = format!("MER-{}", random_hex(rng, 8).to_ascii_uppercase());
    let merchant_name = format!(
        "{} {} {}",
        NAME_PREFIXES[rng.gen_range(0..NAME_PREFIXES.len())],
        NAME_STEMS[rng.gen_range(0..NAME_STEMS.len())],
        NAME_SUFFIXES[rng.gen_range(0..NAME_SUFFIXES.len())]
    );

    Merchant {
        merchant_id,
        merchant_name,
        merchant_category: category.name.clone(),
        mcc_code: category.mcc_code.clone()
    }
}

fn random_hex<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())]))
        .collect()
}

/// Draws addresses until one lands outside the private, loopback and reserved ranges.
fn public_ipv4<R: Rng + ?Sized>(rng: &mut R) -> Ipv4Addr {
    loop {
        let address = Ipv4Addr::from(rng.r#gen::<u32>());
        let first_octet = address.octets()[0];

        let reserved = address.is_private()
            || address.is_loopback()
            || address.is_link_local()
            || address.is_multicast()
            || address.is_broadcast()
            || address.is_documentation()
            || address.is_unspecified()
            || first_octet == 0
            || first_octet >= 240;

        if !reserved {
            return address;
        }
    }
}

fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}
