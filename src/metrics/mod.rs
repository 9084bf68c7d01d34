//! Per-probe metric records and the timer that produces them.
mod record;
mod timer;


pub use record::{MetadataValue, MetricRecord};
pub use timer::{ProbeTimer, now_unix_ms};
