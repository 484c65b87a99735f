use std::collections::VecDeque;

use rand::Rng;

use crate::generator::PoolConfig;
use crate::types::ConfigError;

/// Bounded pool of recurring entities (accounts, merchants).
///
/// Draws either reuse an existing entry or mint a new one. New entries are appended and
/// the oldest entry is evicted once the pool exceeds its capacity.
#[derive(Debug, Clone)]
pub struct RotatingPool<T> {
    entries: VecDeque<T>,
    capacity: usize,
    reuse_probability: f64
}

impl<T: Clone> RotatingPool<T> {
    pub fn new<R, F>(pool: &'static str, config: &PoolConfig, rng: &mut R, mut mint: F) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
        F: FnMut(&mut R) -> T,
    {
        config.validate(pool)?;

        let mut entries = VecDeque::with_capacity(config.capacity + 1);

        for _ in 0..config.initial {
            entries.push_back(mint(rng));
        }

        Ok(Self {
            entries,
            capacity: config.capacity,
            reuse_probability: config.reuse_probability
        })
    }

    pub fn draw<R, F>(&mut self, rng: &mut R, mint: F) -> T
    where
        R: Rng + ?Sized,
        F: FnOnce(&mut R) -> T,
    {
        if !self.entries.is_empty() && rng.gen_bool(self.reuse_probability) {
            return self.entries[rng.gen_range(0..self.entries.len())].clone();
        }

        let entry = mint(rng);
        self.entries.push_back(entry.clone());

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }

        entry
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn contains(&self, entry: &T) -> bool
    where
        T: PartialEq,
    {
        self.entries.contains(entry)
    }
}
