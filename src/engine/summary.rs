use std::fmt;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Outcome of one publication run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// Records the sink accepted.
    pub sent: u64,
    /// Records that failed to serialize or publish.
    pub failed: u64,
    pub elapsed: Duration,
    /// Whether the run ended on a shutdown request.
    pub cancelled: bool
}

impl Summary {
    pub fn attempted(&self) -> u64 {
        self.sent + self.failed
    }

    /// Accepted records per second over the whole run.
    pub fn effective_rate(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();

        if seconds > 0.0 {
            self.sent as f64 / seconds
        } else {
            0.0
        }
    }
}

impl Display for Summary {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "Sent {} transactions ({} failed) in {:.2?} ({:.2} msg/sec)",
            self.sent,
            self.failed,
            self.elapsed,
            self.effective_rate()
        )?;

        if self.cancelled {
            write!(formatter, ", stopped early")?;
        }

        Ok(())
    }
}
