mod publisher;
mod shutdown;
mod summary;
#[cfg(test)]
mod tests;

pub use publisher::{Mode, Publisher};
pub use shutdown::{Escalation, Shutdown, ShutdownTrigger};
pub use summary::Summary;
