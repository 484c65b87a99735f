use std::io::{stdout, Stdout, Write};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::sink::{Sink, SinkError};

/// Writes each record as one line of JSON to a local writer.
///
/// Used for dry runs and piping (`--sink stdout`). Topic and key are not part of the
/// output; the key is the record's own `account_id`.
pub struct WriterSink<W> {
    writer: Mutex<W>
}

impl WriterSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(stdout())
    }
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer)
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer.into_inner().map_err(|_| SinkError::rejected("writer lock poisoned"))
    }
}

#[async_trait]
impl<W: Write + Send> Sink for WriterSink<W> {
    async fn publish(&self, _topic: &str, _key: &str, value: &[u8]) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::rejected("writer lock poisoned"))?;

        writer.write_all(value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        Ok(())
    }

    async fn flush(&self) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::rejected("writer lock poisoned"))?;
        writer.flush()?;

        Ok(())
    }
}
