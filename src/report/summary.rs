use serde::Serialize;

use crate::metrics::MetricRecord;

/// Every probe should finish below this.
pub const TARGET_DURATION_MS: u64 = 3_000;
/// Average above this suggests caching is not doing its job.
pub const SLOW_THRESHOLD_MS: u64 = 1_000;

pub const EXCEEDS_TARGET_ADVISORY: &str =
    "Average response time exceeds the 3 second target; optimize the slowest queries first.";
pub const CACHING_ADVISORY: &str =
    "Average response time is above 1 second; consider more aggressive caching.";
pub const ALL_CLEAR_ADVISORY: &str =
    "All tests passed in under 3 seconds; performance targets are met.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    /// Mean duration, rounded down; 0 when there are no records.
    pub average_duration_ms: u64,
    pub total_duration_ms: u64,
    /// True when every record finished below the target (vacuously true
    /// for an empty run).
    pub under_3_seconds: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestReport {
    pub summary: ReportSummary,
    pub metrics: Vec<MetricRecord>,
    pub recommendations: Vec<String>,
}

/// Pure reduction of the records into a report.
#[must_use]
pub fn generate_report(metrics: &[MetricRecord]) -> TestReport {
    let total_tests = metrics.len();
    let passed_tests = metrics.iter().filter(|record| record.success()).count();
    let failed_tests = total_tests.saturating_sub(passed_tests);
    let total_duration_ms = metrics
        .iter()
        .fold(0u64, |sum, record| sum.saturating_add(record.duration_ms()));
    let count = u64::try_from(total_tests).unwrap_or(u64::MAX);
    let average_duration_ms = total_duration_ms.checked_div(count).unwrap_or(0);
    let under_3_seconds = metrics
        .iter()
        .all(|record| record.duration_ms() < TARGET_DURATION_MS);

    let summary = ReportSummary {
        total_tests,
        passed_tests,
        failed_tests,
        average_duration_ms,
        total_duration_ms,
        under_3_seconds,
    };
    let recommendations = recommendations(&summary);

    TestReport {
        summary,
        metrics: metrics.to_vec(),
        recommendations,
    }
}

fn recommendations(summary: &ReportSummary) -> Vec<String> {
    let mut advice = Vec::new();

    if average_exceeds(summary, TARGET_DURATION_MS) {
        advice.push(EXCEEDS_TARGET_ADVISORY.to_owned());
    } else if average_exceeds(summary, SLOW_THRESHOLD_MS) {
        advice.push(CACHING_ADVISORY.to_owned());
    }

    if summary.failed_tests > 0 {
        advice.push(format!(
            "{} test(s) failed; resolve the failures before relying on these timings.",
            summary.failed_tests
        ));
    }

    if summary.under_3_seconds && summary.failed_tests == 0 {
        advice.push(ALL_CLEAR_ADVISORY.to_owned());
    }

    advice
}

/// `average > threshold`, compared on the exact sum so the rounded
/// average cannot hide a fractional excess.
fn average_exceeds(summary: &ReportSummary, threshold_ms: u64) -> bool {
    if summary.total_tests == 0 {
        return false;
    }
    let count = u128::try_from(summary.total_tests).unwrap_or(u128::MAX);
    u128::from(summary.total_duration_ms) > u128::from(threshold_ms).saturating_mul(count)
}
