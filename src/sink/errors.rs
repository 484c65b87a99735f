use rdkafka::error::KafkaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink error: unable to reach brokers [{servers}]: {source}")]
    Unreachable {
        servers: String,
        #[source]
        source: KafkaError
    },
    #[error("Sink error: {0}")]
    Kafka(#[from] KafkaError),
    #[error("Sink error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sink error: {0}")]
    Rejected(String)
}

impl SinkError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}
