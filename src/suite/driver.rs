use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::metrics::{MetricRecord, now_unix_ms};
use crate::remote::RemoteApi;
use crate::report::{TestReport, generate_report};
use crate::validation::{self, ValidationResult};

use super::{LocalCache, SuiteSettings};

/// Everything one suite run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteOutcome {
    pub started_at_ms: u64,
    pub total_duration_ms: u64,
    pub report: TestReport,
    pub validation: ValidationResult,
}

/// Runs the fixed, ordered probe sequence against one backend.
pub struct TestSuite<A> {
    pub(super) api: A,
    pub(super) settings: SuiteSettings,
    pub(super) cache: LocalCache,
    metrics: Vec<MetricRecord>,
    pub(super) started_at_ms: u64,
}

impl<A: RemoteApi> TestSuite<A> {
    #[must_use]
    pub fn new(api: A, settings: SuiteSettings) -> Self {
        let cache = LocalCache::new(settings.cache_path.clone(), settings.cache_ttl);
        Self {
            api,
            settings,
            cache,
            metrics: Vec::new(),
            started_at_ms: 0,
        }
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub const fn settings(&self) -> &SuiteSettings {
        &self.settings
    }

    /// Records from the current (or last) run, in execution order.
    #[must_use]
    pub fn metrics(&self) -> &[MetricRecord] {
        &self.metrics
    }

    pub fn start_testing(&mut self) {
        self.metrics.clear();
        self.started_at_ms = now_unix_ms();
    }

    /// Runs every probe in order, then validates the stats payload once.
    ///
    /// Failures land in the records and the validation result; the run
    /// itself cannot fail.
    pub async fn run_complete_test_suite(&mut self) -> SuiteOutcome {
        self.start_testing();
        let started = Instant::now();
        info!(
            "Starting test suite: {}, {}, {}",
            self.settings.stats_function,
            self.settings.legacy_stats_function,
            self.settings.volume_function
        );

        let record = self.test_basic_rpc().await;
        self.push(record);
        let record = self.test_cache_path().await;
        self.push(record);
        let record = self.test_data_consistency().await;
        self.push(record);
        let record = self.test_realistic_volume().await;
        self.push(record);

        let validation = self.validate_data_accuracy().await;
        if validation.is_valid() {
            info!(
                "Data validation passed with {} warning(s)",
                validation.warnings().len()
            );
        } else {
            warn!(
                "Data validation failed: {}",
                validation.errors().join("; ")
            );
        }

        let report = generate_report(&self.metrics);
        let total_duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            "Test suite finished in {}ms: {}/{} passed",
            total_duration_ms, report.summary.passed_tests, report.summary.total_tests
        );

        SuiteOutcome {
            started_at_ms: self.started_at_ms,
            total_duration_ms,
            report,
            validation,
        }
    }

    /// Validates the stats payload against the configured contract.
    pub async fn validate_data_accuracy(&self) -> ValidationResult {
        let call = self.settings.stats_call();
        validation::validate_data_accuracy(&self.api, &call, &self.settings.contract).await
    }

    fn push(&mut self, record: MetricRecord) {
        if record.success() {
            info!(
                "{} passed in {}ms",
                record.test_name(),
                record.duration_ms()
            );
        } else {
            warn!(
                "{} failed in {}ms: {}",
                record.test_name(),
                record.duration_ms(),
                record.error().unwrap_or_default()
            );
        }
        self.metrics.push(record);
    }
}
