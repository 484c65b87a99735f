use std::time::Duration;

use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use rdkafka::ClientConfig;
use tokio::task::spawn_blocking;
use tracing::{debug, info};

use crate::sink::{Sink, SinkError};

#[derive(Debug, Clone)]
pub struct KafkaSettings {
    /// Comma-separated `host:port` list.
    pub bootstrap_servers: String,
    /// Upper bound on the startup reachability probe.
    pub connect_timeout: Duration,
    /// How long the client may spend delivering one message, retries included.
    pub message_timeout: Duration,
    /// Messages enqueued in the producer and awaiting their delivery report.
    pub max_in_flight: usize
}

/// Publishes records to Kafka through a single shared producer.
pub struct KafkaSink {
    producer: FutureProducer,
    message_timeout: Duration,
    max_in_flight: usize
}

impl KafkaSink {
    /// Creates the producer and fetches cluster metadata once, so an unreachable cluster
    /// is reported at startup rather than as a stream of per-message failures.
    pub async fn connect(settings: &KafkaSettings) -> Result<Self, SinkError> {
        info!("Connecting to Kafka at [{}]", settings.bootstrap_servers);

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &settings.bootstrap_servers)
            .set("message.timeout.ms", settings.message_timeout.as_millis().to_string())
            .set("acks", "all")
            .set("linger.ms", "5")
            .set("queue.buffering.max.messages", "100000")
            .set("queue.buffering.max.kbytes", "1048576")
            .create()?;

        let probe = producer.clone();
        let connect_timeout = settings.connect_timeout;
        let brokers = spawn_blocking(move || {
            probe.client()
                .fetch_metadata(None, connect_timeout)
                .map(|metadata| metadata.brokers().len())
        })
            .await
            .map_err(|error| SinkError::rejected(format!("metadata probe did not complete: {error}")))?
            .map_err(|source| SinkError::Unreachable {
                servers: settings.bootstrap_servers.clone(),
                source
            })?;

        info!("Connected to Kafka, {brokers} broker(s) available");

        Ok(Self {
            producer,
            message_timeout: settings.message_timeout,
            max_in_flight: settings.max_in_flight.max(1)
        })
    }
}

#[async_trait]
impl Sink for KafkaSink {
    async fn publish(&self, topic: &str, key: &str, value: &[u8]) -> Result<(), SinkError> {
        let record = FutureRecord::to(topic).key(key).payload(value);

        self.producer.send(record, Timeout::After(self.message_timeout))
            .await
            .map(|_| ())
            .map_err(|(error, _)| SinkError::Kafka(error))
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    async fn flush(&self) -> Result<(), SinkError> {
        debug!("Flushing Kafka producer");

        let producer = self.producer.clone();
        let timeout = self.message_timeout;

        spawn_blocking(move || producer.flush(timeout))
            .await
            .map_err(|error| SinkError::rejected(format!("flush did not complete: {error}")))??;

        Ok(())
    }
}
