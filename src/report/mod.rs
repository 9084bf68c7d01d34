//! Reduction of probe results into a pass/fail report.
mod export;
mod output;
mod summary;


pub use export::export_json;
pub use output::{print_report, print_validation};
pub use summary::{
    ALL_CLEAR_ADVISORY, CACHING_ADVISORY, EXCEEDS_TARGET_ADVISORY, ReportSummary,
    SLOW_THRESHOLD_MS, TARGET_DURATION_MS, TestReport, generate_report,
};
