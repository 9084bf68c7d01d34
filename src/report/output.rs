use crate::metrics::MetricRecord;
use crate::validation::ValidationResult;

use super::TestReport;

pub fn print_report(title: &str, report: &TestReport) {
    let summary = &report.summary;

    println!("{}", title);
    println!("Total Tests: {}", summary.total_tests);
    println!("Passed: {}", summary.passed_tests);
    println!("Failed: {}", summary.failed_tests);
    println!("Avg Duration: {}ms", summary.average_duration_ms);
    println!(
        "Under 3s: {}",
        if summary.under_3_seconds { "yes" } else { "no" }
    );

    for record in &report.metrics {
        print_record(record);
    }

    if !report.recommendations.is_empty() {
        println!("Recommendations:");
        for advice in &report.recommendations {
            println!("- {}", advice);
        }
    }
}

pub fn print_validation(validation: &ValidationResult) {
    println!(
        "Data Validation: {}",
        if validation.is_valid() {
            "valid"
        } else {
            "invalid"
        }
    );
    for error in validation.errors() {
        println!("  error: {}", error);
    }
    for warning in validation.warnings() {
        println!("  warning: {}", warning);
    }
}

fn print_record(record: &MetricRecord) {
    let status = if record.success() { "PASS" } else { "FAIL" };
    let mut details = vec![format!("{}ms", record.duration_ms())];
    if let Some(bytes) = record.data_size() {
        details.push(format!("{} bytes", bytes));
    }
    if let Some(hit) = record.cache_hit() {
        details.push(if hit { "cache hit" } else { "cache miss" }.to_owned());
    }
    println!(
        "[{}] {} ({})",
        status,
        record.test_name(),
        details.join(", ")
    );

    if let Some(error) = record.error() {
        println!("  error: {}", error);
    }
    for (key, value) in record.metadata() {
        println!("  {}: {}", key, value);
    }
}
