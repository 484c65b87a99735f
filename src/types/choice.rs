use std::collections::BTreeMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::types::ConfigError;

/// Categorical distribution over a small enumerated set.
///
/// Values are held in key order of the source map so a seeded generator always
/// draws the same sequence for the same weights.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    values: Vec<T>,
    index: WeightedIndex<u32>
}

impl<T: Copy> WeightedTable<T> {
    pub fn new(table: &'static str, weights: &BTreeMap<T, u32>) -> Result<Self, ConfigError> {
        if weights.is_empty() {
            return Err(ConfigError::empty_pool(table));
        }

        let total = weights.values().try_fold(0u32, |total, weight| total.checked_add(*weight));

        if total.is_none() {
            return Err(ConfigError::invalid_weights(table, format!("weights must add up to at most {}", u32::MAX)));
        }

        let index = WeightedIndex::new(weights.values().copied())
            .map_err(|error| ConfigError::invalid_weights(table, error.to_string()))?;

        Ok(Self {
            values: weights.keys().copied().collect(),
            index
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.values[self.index.sample(rng)]
    }
}

/// Uniform choice over a pool that is known to be non-empty.
#[derive(Debug, Clone)]
pub struct Choices<T> {
    items: Vec<T>
}

impl<T> Choices<T> {
    pub fn new(pool: &'static str, items: Vec<T>) -> Result<Self, ConfigError> {
        if items.is_empty() {
            return Err(ConfigError::empty_pool(pool));
        }

        Ok(Self { items })
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        &self.items[rng.gen_range(0..self.items.len())]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
