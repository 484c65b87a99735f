use super::{Escalation, Mode, Publisher, Shutdown, ShutdownTrigger, Summary};

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::generator::{GeneratorConfig, TransactionGenerator};
use crate::sink::{Sink, SinkError};
use crate::types::ConfigError;

const TOPIC: &str = "financial_transactions";

#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<(String, String, Vec<u8>)>>
}

impl RecordingSink {
    fn records(&self) -> Vec<(String, String, Vec<u8>)> {
        self.records.lock().map(|records| records.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn publish(&self, topic: &str, key: &str, value: &[u8]) -> Result<(), SinkError> {
        let mut records = self.records.lock().map_err(|_| SinkError::rejected("poisoned"))?;
        records.push((topic.to_string(), key.to_string(), value.to_vec()));
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl Sink for FailingSink {
    async fn publish(&self, _topic: &str, _key: &str, _value: &[u8]) -> Result<(), SinkError> {
        Err(SinkError::rejected("broker unavailable"))
    }
}

/// Rejects every third message.
#[derive(Default)]
struct FlakySink {
    calls: AtomicU64
}

#[async_trait]
impl Sink for FlakySink {
    async fn publish(&self, _topic: &str, _key: &str, _value: &[u8]) -> Result<(), SinkError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if call % 3 == 0 {
            Err(SinkError::rejected("queue full"))
        } else {
            Ok(())
        }
    }
}

struct SlowSink {
    latency: Duration,
    published: AtomicU64
}

#[async_trait]
impl Sink for SlowSink {
    async fn publish(&self, _topic: &str, _key: &str, _value: &[u8]) -> Result<(), SinkError> {
        sleep(self.latency).await;
        self.published.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Holds each message for `latency` and lets up to `window` of them overlap.
struct PipelinedSink {
    latency: Duration,
    window: usize,
    in_flight: AtomicU64,
    peak: AtomicU64
}

impl PipelinedSink {
    fn new(latency: Duration, window: usize) -> Self {
        Self { latency, window, in_flight: AtomicU64::new(0), peak: AtomicU64::new(0) }
    }
}

#[async_trait]
impl Sink for PipelinedSink {
    async fn publish(&self, _topic: &str, _key: &str, _value: &[u8]) -> Result<(), SinkError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        sleep(self.latency).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn max_in_flight(&self) -> usize {
        self.window
    }
}

/// Requests shutdown from inside the sink once `after` messages were accepted.
struct TriggeringSink {
    trigger: ShutdownTrigger,
    after: u64,
    published: AtomicU64
}

#[async_trait]
impl Sink for TriggeringSink {
    async fn publish(&self, _topic: &str, _key: &str, _value: &[u8]) -> Result<(), SinkError> {
        let published = self.published.fetch_add(1, Ordering::SeqCst) + 1;

        if published == self.after {
            self.trigger.trigger();
        }

        Ok(())
    }
}

fn generator() -> Result<TransactionGenerator> {
    Ok(TransactionGenerator::new(&GeneratorConfig::default(), Some(42))?)
}

fn publisher<S: Sink + 'static>(sink: S, shutdown: Shutdown) -> Result<Publisher<S>> {
    Ok(Publisher::new(sink, generator()?, TOPIC, shutdown))
}

fn trigger_after(trigger: ShutdownTrigger, delay: Duration) {
    tokio::spawn(async move {
        sleep(delay).await;
        trigger.trigger();
    });
}

#[tokio::test]
async fn test_burst_of_zero_publishes_nothing() -> Result<()> {
    let (_trigger, shutdown) = Shutdown::channel();
    let mut publisher = publisher(RecordingSink::default(), shutdown)?;

    let summary = publisher.run(Mode::Burst { count: 0 }).await?;

    assert_eq!(summary.sent, 0);
    assert_eq!(summary.failed, 0);
    assert!(!summary.cancelled);
    assert!(publisher.sink().records().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_burst_publishes_every_record_keyed_by_account() -> Result<()> {
    let (_trigger, shutdown) = Shutdown::channel();
    let mut publisher = publisher(RecordingSink::default(), shutdown)?;

    let summary = publisher.run(Mode::Burst { count: 100 }).await?;

    assert_eq!(summary.sent, 100);
    assert_eq!(summary.failed, 0);
    assert!(!summary.cancelled);

    let records = publisher.sink().records();
    assert_eq!(records.len(), 100);

    for (topic, key, value) in &records {
        let record: Value = serde_json::from_slice(value)?;
        let account_id = record["account_id"].as_str().ok_or_else(|| anyhow!("account_id missing"))?;

        assert_eq!(topic, TOPIC);
        assert_eq!(key, account_id);
    }

    Ok(())
}

#[tokio::test]
async fn test_burst_counts_every_failed_publish_and_keeps_going() -> Result<()> {
    let (_trigger, shutdown) = Shutdown::channel();
    let mut publisher = publisher(FailingSink, shutdown)?;

    let summary = publisher.run(Mode::Burst { count: 20 }).await?;

    assert_eq!(summary.sent, 0);
    assert_eq!(summary.failed, 20);
    assert_eq!(summary.attempted(), 20);

    Ok(())
}

#[tokio::test]
async fn test_intermittent_failures_do_not_affect_other_messages() -> Result<()> {
    let (_trigger, shutdown) = Shutdown::channel();
    let mut publisher = publisher(FlakySink::default(), shutdown)?;

    let summary = publisher.run(Mode::Burst { count: 30 }).await?;

    assert_eq!(summary.sent, 20);
    assert_eq!(summary.failed, 10);

    Ok(())
}

#[tokio::test]
async fn test_burst_stops_between_messages_when_shutdown_is_requested() -> Result<()> {
    let (trigger, shutdown) = Shutdown::channel();
    let sink = TriggeringSink { trigger, after: 5, published: AtomicU64::new(0) };
    let mut publisher = publisher(sink, shutdown)?;

    let summary = publisher.run(Mode::Burst { count: 100 }).await?;

    assert_eq!(summary.sent, 5);
    assert_eq!(summary.failed, 0);
    assert!(summary.cancelled);
    assert_eq!(publisher.sink().published.load(Ordering::SeqCst), 5);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_burst_overlaps_deliveries_up_to_the_sink_window() -> Result<()> {
    let (_trigger, shutdown) = Shutdown::channel();
    let mut publisher = publisher(PipelinedSink::new(Duration::from_millis(50), 8), shutdown)?;

    let summary = publisher.run(Mode::Burst { count: 80 }).await?;

    // One delivery at a time would take 80 x 50ms = 4s.
    assert_eq!(summary.sent, 80);
    assert!(summary.elapsed < Duration::from_secs(1), "elapsed {:?}", summary.elapsed);
    assert_eq!(publisher.sink().peak.load(Ordering::SeqCst), 8);
    assert_eq!(publisher.sink().in_flight.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_continuous_rate_is_reached_when_latency_exceeds_the_interval() -> Result<()> {
    let (_trigger, shutdown) = Shutdown::channel();
    let mut publisher = publisher(PipelinedSink::new(Duration::from_millis(50), 8), shutdown)?;

    let summary = publisher.run(Mode::Continuous { rate: 100.0, max_messages: Some(200) }).await?;

    assert_eq!(summary.sent, 200);
    assert!(summary.elapsed < Duration::from_millis(2100), "elapsed {:?}", summary.elapsed);
    assert!(publisher.sink().peak.load(Ordering::SeqCst) <= 8);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_continuous_rate_is_held_until_shutdown() -> Result<()> {
    let (trigger, shutdown) = Shutdown::channel();
    let mut publisher = publisher(RecordingSink::default(), shutdown)?;

    trigger_after(trigger, Duration::from_secs(5));
    let summary = publisher.run(Mode::Continuous { rate: 10.0, max_messages: None }).await?;

    assert!((49..=51).contains(&summary.sent), "sent {} messages", summary.sent);
    assert_eq!(summary.failed, 0);
    assert!(summary.cancelled);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_continuous_rate_absorbs_sink_latency() -> Result<()> {
    let (trigger, shutdown) = Shutdown::channel();
    let sink = SlowSink { latency: Duration::from_millis(30), published: AtomicU64::new(0) };
    let mut publisher = publisher(sink, shutdown)?;

    trigger_after(trigger, Duration::from_secs(5));
    let summary = publisher.run(Mode::Continuous { rate: 10.0, max_messages: None }).await?;

    // Sleeping a full interval after each 30ms send would only reach ~38 messages.
    assert!((49..=51).contains(&summary.sent), "sent {} messages", summary.sent);
    assert_eq!(publisher.sink().published.load(Ordering::SeqCst), summary.sent);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_continuous_first_message_is_immediate() -> Result<()> {
    let (_trigger, shutdown) = Shutdown::channel();
    let mut publisher = publisher(RecordingSink::default(), shutdown)?;

    let summary = publisher.run(Mode::Continuous { rate: 10.0, max_messages: Some(11) }).await?;

    assert_eq!(summary.sent, 11);
    assert!(summary.elapsed >= Duration::from_secs(1));
    assert!(summary.elapsed < Duration::from_millis(1010), "elapsed {:?}", summary.elapsed);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_continuous_stops_at_max_messages() -> Result<()> {
    let (_trigger, shutdown) = Shutdown::channel();
    let mut publisher = publisher(RecordingSink::default(), shutdown)?;

    let summary = publisher.run(Mode::Continuous { rate: 1000.0, max_messages: Some(25) }).await?;

    assert_eq!(summary.sent, 25);
    assert!(!summary.cancelled);
    assert_eq!(publisher.sink().records().len(), 25);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_continuous_returns_immediately_when_already_shut_down() -> Result<()> {
    let (trigger, shutdown) = Shutdown::channel();
    let mut publisher = publisher(RecordingSink::default(), shutdown)?;

    trigger.trigger();
    let summary = publisher.run(Mode::Continuous { rate: 1.0, max_messages: None }).await?;

    assert_eq!(summary.attempted(), 0);
    assert!(summary.cancelled);

    Ok(())
}

#[tokio::test]
async fn test_invalid_rates_are_rejected_before_publishing() -> Result<()> {
    let (_trigger, shutdown) = Shutdown::channel();
    let mut publisher = publisher(RecordingSink::default(), shutdown)?;

    for rate in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-300] {
        let result = publisher.run(Mode::Continuous { rate, max_messages: Some(1) }).await;

        assert!(matches!(result, Err(ConfigError::InvalidRate(_))), "rate {rate} was accepted");
    }

    assert!(publisher.sink().records().is_empty());

    Ok(())
}

type Request = Pin<Box<dyn Future<Output = io::Result<()>> + Send>>;

/// Turns a channel of unit messages into a source of shutdown requests.
fn requests() -> (mpsc::UnboundedSender<()>, impl FnMut() -> Request + Send + 'static) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

    let next_request = move || {
        let receiver = Arc::clone(&receiver);

        Box::pin(async move {
            receiver.lock().await.recv().await.ok_or_else(|| io::Error::other("request source closed"))
        }) as Request
    };

    (sender, next_request)
}

#[tokio::test]
async fn test_first_request_triggers_shutdown_and_second_forces_exit() -> Result<()> {
    let (trigger, mut shutdown) = Shutdown::channel();
    let (sender, next_request) = requests();
    let forwarding = tokio::spawn(trigger.forward(next_request));

    sender.send(())?;
    shutdown.triggered().await;

    assert!(shutdown.is_triggered());
    assert!(!forwarding.is_finished());

    sender.send(())?;

    assert_eq!(forwarding.await?, Escalation::Forced);

    Ok(())
}

#[tokio::test]
async fn test_failed_request_source_does_not_trigger_shutdown() -> Result<()> {
    let (trigger, shutdown) = Shutdown::channel();
    let (sender, next_request) = requests();
    drop(sender);

    assert_eq!(trigger.forward(next_request).await, Escalation::Unavailable);
    assert!(!shutdown.is_triggered());

    Ok(())
}

#[test]
fn test_summary_reports_effective_rate() {
    let summary = Summary { sent: 50, failed: 2, elapsed: Duration::from_secs(5), cancelled: true };

    assert_eq!(summary.attempted(), 52);
    assert!((summary.effective_rate() - 10.0).abs() < f64::EPSILON);
    assert_eq!(summary.to_string(), "Sent 50 transactions (2 failed) in 5.00s (10.00 msg/sec), stopped early");
}

#[test]
fn test_summary_of_instant_run_has_zero_rate() {
    let summary = Summary::default();

    assert_eq!(summary.effective_rate(), 0.0);
    assert!(!summary.to_string().contains("stopped early"));
}
