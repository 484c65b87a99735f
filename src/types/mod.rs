mod amount;
mod choice;
mod errors;
mod ids;

pub use amount::{AmountRule, AmountSampler};
#[cfg(test)]
pub use amount::MAX_AMOUNT_CENTS;
pub use choice::{Choices, WeightedTable};
pub use errors::ConfigError;
pub use ids::{AccountId, IdSequence, TransactionId};
