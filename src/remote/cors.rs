//! CORS preflight checks for edge functions.
use std::time::Duration;

use tracing::{info, warn};

use crate::metrics::{MetricRecord, ProbeTimer};

use super::{RemoteClient, RemoteResponse, Transport};

const ALLOW_ORIGIN: &str = "access-control-allow-origin";
const ALLOW_METHODS: &str = "access-control-allow-methods";
const ALLOW_HEADERS: &str = "access-control-allow-headers";

/// Runs one preflight per function, in order, and records each as a probe.
pub async fn check_cors<T: Transport>(
    client: &RemoteClient<T>,
    origin: &str,
    functions: &[String],
    request_timeout: Duration,
) -> Vec<MetricRecord> {
    let mut records = Vec::with_capacity(functions.len());
    for function in functions {
        let timer = ProbeTimer::start(format!("CORS Preflight: {}", function));
        let record = match client.preflight(function, origin, request_timeout).await {
            Ok(response) => {
                let outcome = evaluate_preflight(&response, origin);
                let record = timer
                    .finish(outcome)
                    .with_metadata("function", function.as_str())
                    .with_metadata("status", response.status)
                    .with_metadata(
                        "allow_origin",
                        response.header(ALLOW_ORIGIN).unwrap_or_default(),
                    )
                    .with_metadata(
                        "allow_methods",
                        response.header(ALLOW_METHODS).unwrap_or_default(),
                    );
                match response.header(ALLOW_HEADERS) {
                    Some(headers) => record.with_metadata("allow_headers", headers),
                    None => record,
                }
            }
            Err(err) => timer
                .fail(err.to_string())
                .with_metadata("function", function.as_str()),
        };

        if record.success() {
            info!("CORS preflight for {} passed", function);
        } else {
            warn!(
                "CORS preflight for {} failed: {}",
                function,
                record.error().unwrap_or_default()
            );
        }
        records.push(record);
    }
    records
}

/// A preflight passes when it answers 2xx and allows the origin, either
/// explicitly or through the `*` wildcard.
///
/// # Errors
///
/// Returns a description of the first problem found.
pub fn evaluate_preflight(response: &RemoteResponse, origin: &str) -> Result<(), String> {
    if !response.is_success() {
        return Err(format!(
            "Preflight returned HTTP {}: {}",
            response.status,
            super::extract_error_message(response.status, &response.body)
        ));
    }

    match response.header(ALLOW_ORIGIN).map(str::trim) {
        None | Some("") => Err("Missing Access-Control-Allow-Origin header".to_owned()),
        Some("*") => Ok(()),
        Some(allowed) if allowed.eq_ignore_ascii_case(origin.trim_end_matches('/')) => Ok(()),
        Some(allowed) => Err(format!(
            "Origin '{}' is not allowed (Access-Control-Allow-Origin: {})",
            origin, allowed
        )),
    }
}
