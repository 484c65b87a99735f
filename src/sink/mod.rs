mod errors;
mod kafka_sink;
#[cfg(test)]
mod tests;
mod writer_sink;

use async_trait::async_trait;

pub use errors::SinkError;
pub use kafka_sink::{KafkaSettings, KafkaSink};
pub use writer_sink::WriterSink;

/// Destination for serialized transactions.
///
/// A failed publish affects only that message; callers count it and move on.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, value: &[u8]) -> Result<(), SinkError>;

    /// How many publishes may be awaiting delivery at the same time. One keeps records in
    /// generation order.
    fn max_in_flight(&self) -> usize {
        1
    }

    /// Waits for anything buffered by the sink to be delivered.
    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
