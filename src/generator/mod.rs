mod catalog;
mod clock;
mod config;
mod pool;
mod transaction_generator;

pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use config::AmountRules;
pub use config::{GeneratorConfig, PoolConfig};
pub use pool::RotatingPool;
pub use transaction_generator::TransactionGenerator;
