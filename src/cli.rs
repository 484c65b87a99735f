use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::engine::Mode;
use crate::sink::KafkaSettings;

/// Generates synthetic financial transactions and publishes them to a Kafka topic.
#[derive(Parser, Clone, Debug)]
#[command(name = "transaction-producer", version)]
pub struct Cli {
    /// Kafka bootstrap servers (comma-separated, e.g. "localhost:9092")
    #[arg(short = 'b', long, env = "KAFKA_BOOTSTRAP_SERVERS", default_value = "localhost:9092")]
    pub bootstrap_servers: String,

    /// Topic the transactions are published to
    #[arg(short = 't', long, env = "KAFKA_TOPIC", default_value = "financial_transactions")]
    pub topic: String,

    /// Messages per second in continuous mode
    #[arg(short = 'r', long, default_value_t = 1.0)]
    pub rate: f64,

    /// Stop continuous mode after this many messages
    #[arg(short = 'm', long)]
    pub max_messages: Option<u64>,

    /// Send this many messages as fast as possible, then exit
    #[arg(long, value_name = "COUNT")]
    pub burst: Option<u64>,

    /// Random seed for reproducible data (same seed = same records, timestamps aside)
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML profile overriding the generator defaults
    #[arg(long, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Where records are written
    #[arg(long, value_enum, default_value_t = SinkKind::Kafka)]
    pub sink: SinkKind,

    /// Log progress every N messages (default: 100 in burst mode, 10 in continuous mode)
    #[arg(long, value_name = "N")]
    pub progress_every: Option<u64>,

    /// How long to wait for the brokers at startup
    #[arg(long, default_value_t = 5000)]
    pub connect_timeout_ms: u64,

    /// Delivery timeout for a single message
    #[arg(long, default_value_t = 30000)]
    pub message_timeout_ms: u64,

    /// Kafka messages awaiting delivery at once
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_in_flight: u64,

    /// One of: error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    pub log_level: String
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkKind {
    Kafka,
    /// One JSON document per line on standard output
    Stdout
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match self.burst {
            Some(count) => Mode::Burst { count },
            None => Mode::Continuous { rate: self.rate, max_messages: self.max_messages }
        }
    }

    pub fn kafka_settings(&self) -> KafkaSettings {
        KafkaSettings {
            bootstrap_servers: self.bootstrap_servers.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            message_timeout: Duration::from_millis(self.message_timeout_ms),
            max_in_flight: usize::try_from(self.max_in_flight).unwrap_or(usize::MAX)
        }
    }
}
