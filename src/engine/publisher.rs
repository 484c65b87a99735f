use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tokio::select;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::engine::{Shutdown, Summary};
use crate::generator::{Clock, SystemClock, TransactionGenerator};
use crate::models::TransactionType;
use crate::sink::{Sink, SinkError};
use crate::types::{AccountId, ConfigError, TransactionId};

const BURST_PROGRESS_INTERVAL: u64 = 100;
const CONTINUOUS_PROGRESS_INTERVAL: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Publish exactly `count` records as fast as the sink accepts them.
    Burst {
        count: u64
    },
    /// Publish `rate` records per second until shut down or `max_messages` is reached.
    Continuous {
        rate: f64,
        max_messages: Option<u64>
    }
}

impl Mode {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Burst { .. } => Ok(()),
            Self::Continuous { rate, .. } => {
                let representable = rate.is_finite() && *rate > 0.0 && Duration::try_from_secs_f64(1.0 / rate).is_ok();

                if representable { Ok(()) } else { Err(ConfigError::InvalidRate(*rate)) }
            }
        }
    }

    fn progress_interval(&self) -> u64 {
        match self {
            Self::Burst { .. } => BURST_PROGRESS_INTERVAL,
            Self::Continuous { .. } => CONTINUOUS_PROGRESS_INTERVAL
        }
    }
}

/// Drives the generator and hands each serialized record to the sink.
///
/// Records are generated one at a time and handed to the sink as background deliveries, at
/// most [`Sink::max_in_flight`] at once. Counters are only updated here, as deliveries
/// complete. A failed publish is counted and logged and the loop moves on; nothing short
/// of a shutdown request ends a run early.
pub struct Publisher<S, R = StdRng, C = SystemClock> {
    sink: Arc<S>,
    generator: TransactionGenerator<R, C>,
    topic: Arc<str>,
    shutdown: Shutdown,
    progress_interval: Option<u64>,
    deliveries: JoinSet<Delivery>
}

struct Delivery {
    transaction_id: TransactionId,
    transaction_type: TransactionType,
    account_id: AccountId,
    result: Result<(), SinkError>
}

#[derive(Debug, Clone, Copy)]
struct Progress {
    interval: u64,
    total: Option<u64>
}

impl<S: Sink + 'static, R: Rng, C: Clock> Publisher<S, R, C> {
    pub fn new(sink: S, generator: TransactionGenerator<R, C>, topic: impl Into<String>, shutdown: Shutdown) -> Self {
        let topic: String = topic.into();

        Self {
            sink: Arc::new(sink),
            generator,
            topic: Arc::from(topic),
            shutdown,
            progress_interval: None,
            deliveries: JoinSet::new()
        }
    }

    /// Logs progress every `interval` attempts instead of the per-mode default.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = Some(interval.max(1));
        self
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        self.sink.as_ref()
    }

    pub async fn run(&mut self, mode: Mode) -> Result<Summary, ConfigError> {
        mode.validate()?;

        let started = Instant::now();
        let progress = Progress {
            interval: self.progress_interval.unwrap_or_else(|| mode.progress_interval()),
            total: match mode {
                Mode::Burst { count } => Some(count),
                Mode::Continuous { max_messages, .. } => max_messages
            }
        };
        let mut summary = Summary::default();

        match mode {
            Mode::Burst { count } => {
                info!("Sending burst of {count} transactions to topic [{}]", self.topic);
                self.run_burst(count, progress, &mut summary).await;
            }
            Mode::Continuous { rate, max_messages } => {
                info!("Producing {rate} transactions per second to topic [{}]", self.topic);
                self.run_continuous(rate, max_messages, progress, &mut summary).await;
            }
        }

        if summary.cancelled {
            info!("Shutdown requested, waiting for {} in-flight transactions", self.deliveries.len());
        }

        while let Some(joined) = self.deliveries.join_next().await {
            record(joined, &mut summary, progress);
        }

        if let Err(error) = self.sink.flush().await {
            warn!("Flushing remaining messages failed: {error}");
        }

        summary.elapsed = started.elapsed();
        debug!("Generator has issued {} transaction ids", self.generator.issued());

        Ok(summary)
    }

    async fn run_burst(&mut self, count: u64, progress: Progress, summary: &mut Summary) {
        for _ in 0..count {
            self.reserve_slot(progress, summary).await;

            if self.shutdown.is_triggered() {
                summary.cancelled = true;
                break;
            }

            self.publish_next(progress, summary);
        }
    }

    /// Paces sends against a fixed origin: message `n` is due at `origin + n / rate`, so
    /// time spent inside the sink is absorbed by the next wait rather than accumulating.
    async fn run_continuous(&mut self, rate: f64, max_messages: Option<u64>, progress: Progress, summary: &mut Summary) {
        let origin = Instant::now();
        let mut scheduled = 0u64;

        loop {
            if max_messages.is_some_and(|max_messages| scheduled >= max_messages) {
                info!("Reached maximum message count: {scheduled}");
                break;
            }

            let Some(deadline) = deadline(origin, scheduled, rate) else {
                self.shutdown.triggered().await;
                summary.cancelled = true;
                break;
            };

            select! {
                biased;
                _ = self.shutdown.triggered() => {
                    summary.cancelled = true;
                    break;
                }
                _ = sleep_until(deadline) => {}
            }

            self.reserve_slot(progress, summary).await;
            self.publish_next(progress, summary);
            scheduled += 1;
        }
    }

    /// Records finished deliveries and waits until another one may start.
    async fn reserve_slot(&mut self, progress: Progress, summary: &mut Summary) {
        while let Some(joined) = self.deliveries.try_join_next() {
            record(joined, summary, progress);
        }

        while self.deliveries.len() >= self.sink.max_in_flight().max(1) {
            match self.deliveries.join_next().await {
                Some(joined) => record(joined, summary, progress),
                None => break
            }
        }
    }

    fn publish_next(&mut self, progress: Progress, summary: &mut Summary) {
        let transaction = self.generator.generate();

        let payload = match serde_json::to_vec(&transaction) {
            Ok(payload) => payload,
            Err(error) => {
                summary.failed += 1;
                warn!("Transaction [{}] could not be serialized: {error}", transaction.transaction_id);
                report_progress(summary, progress);
                return;
            }
        };

        let sink = Arc::clone(&self.sink);
        let topic = Arc::clone(&self.topic);

        self.deliveries.spawn(async move {
            let result = sink.publish(&topic, transaction.account_id.as_str(), &payload).await;

            Delivery {
                transaction_id: transaction.transaction_id,
                transaction_type: transaction.transaction_type(),
                account_id: transaction.account_id,
                result
            }
        });
    }
}

fn record(joined: Result<Delivery, JoinError>, summary: &mut Summary, progress: Progress) {
    match joined {
        Ok(Delivery { transaction_id, transaction_type, account_id, result: Ok(()) }) => {
            summary.sent += 1;
            debug!("Transaction [{transaction_id}]:[{transaction_type}] published for account [{account_id}]");
        }
        Ok(Delivery { transaction_id, account_id, result: Err(error), .. }) => {
            summary.failed += 1;
            warn!("Transaction [{transaction_id}] for account [{account_id}] was not published: {error}");
        }
        Err(error) => {
            summary.failed += 1;
            warn!("A publish did not complete: {error}");
        }
    }

    report_progress(summary, progress);
}

fn report_progress(summary: &Summary, progress: Progress) {
    if summary.attempted() % progress.interval != 0 {
        return;
    }

    match progress.total {
        Some(total) => info!("Sent {}/{total} transactions ({} failed)", summary.attempted(), summary.failed),
        None => info!("Produced {} transactions ({} failed)", summary.sent, summary.failed)
    }
}

/// Due time of the `scheduled`-th message, or `None` if it lies beyond what the clock can
/// represent.
fn deadline(origin: Instant, scheduled: u64, rate: f64) -> Option<Instant> {
    let offset = Duration::try_from_secs_f64(scheduled as f64 / rate).ok()?;
    origin.checked_add(offset)
}
