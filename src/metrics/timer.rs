use tokio::time::Instant;

use super::MetricRecord;

/// Current wall-clock time in Unix milliseconds (0 if the clock is before
/// the epoch).
#[must_use]
pub fn now_unix_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Captures a probe's start and turns its outcome into a [`MetricRecord`].
///
/// The start is taken from the wall clock for reporting, the duration from
/// a monotonic clock so it can never be negative.
#[derive(Debug)]
pub struct ProbeTimer {
    test_name: String,
    start_time_ms: u64,
    started: Instant,
}

impl ProbeTimer {
    #[must_use]
    pub fn start(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            start_time_ms: now_unix_ms(),
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn succeed(self) -> MetricRecord {
        self.finish(Ok(()))
    }

    #[must_use]
    pub fn fail(self, error: impl Into<String>) -> MetricRecord {
        self.finish(Err(error.into()))
    }

    #[must_use]
    pub fn finish(self, outcome: Result<(), String>) -> MetricRecord {
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        MetricRecord::completed(self.test_name, self.start_time_ms, elapsed_ms, outcome)
    }
}
