use super::{KafkaSettings, KafkaSink, Sink, SinkError, WriterSink};

use std::time::Duration;

use anyhow::Result;

#[tokio::test]
async fn test_writer_sink_writes_one_line_per_record() -> Result<()> {
    let sink = WriterSink::new(Vec::new());

    sink.publish("financial_transactions", "ACC-100000-A", br#"{"id":1}"#).await?;
    sink.publish("financial_transactions", "ACC-100000-B", br#"{"id":2}"#).await?;
    sink.flush().await?;

    let output = String::from_utf8(sink.into_inner()?)?;

    assert_eq!(output, "{\"id\":1}\n{\"id\":2}\n");

    Ok(())
}

#[tokio::test]
async fn test_writer_sink_surfaces_io_failures() {
    struct BrokenWriter;

    impl std::io::Write for BrokenWriter {
        fn write(&mut self, _buffer: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let sink = WriterSink::new(BrokenWriter);
    let result = sink.publish("topic", "key", b"value").await;

    assert!(matches!(result, Err(SinkError::Io(_))));
}

#[tokio::test]
async fn test_kafka_sink_reports_unreachable_brokers_at_startup() {
    let settings = KafkaSettings {
        bootstrap_servers: "127.0.0.1:1".to_string(),
        connect_timeout: Duration::from_millis(500),
        message_timeout: Duration::from_secs(1),
        max_in_flight: 100
    };

    let result = KafkaSink::connect(&settings).await;

    assert!(matches!(result, Err(SinkError::Unreachable { ref servers, .. }) if servers == "127.0.0.1:1"));
}
