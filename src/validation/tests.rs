use serde_json::{Value, json};

use super::*;
use crate::remote::FunctionCall;
use crate::test_support::{ScriptedApi, run_async_test};

fn healthy_payload() -> Value {
    json!({
        "total_documents": 120,
        "documents_this_month": 14,
        "total_claims": 30,
        "claims_this_month": 2,
        "storage_used_bytes": 1_048_576,
        "limits": {
            "max_documents": 1000,
            "max_claims": 100,
            "max_storage_bytes": 1_073_741_824_u64
        }
    })
}

fn check_exclusivity(result: &ValidationResult) -> Result<(), String> {
    if result.is_valid() != result.errors().is_empty() {
        return Err(format!("is_valid out of sync with errors: {:?}", result));
    }
    Ok(())
}

#[test]
fn healthy_payload_is_valid() -> Result<(), String> {
    let result = validate_payload(&healthy_payload(), &DataContract::default());
    check_exclusivity(&result)?;
    if !result.is_valid() || !result.warnings().is_empty() {
        return Err(format!("Unexpected result: {:?}", result));
    }
    if result.data() != Some(&healthy_payload()) {
        return Err("Payload should be kept for diagnostics".to_owned());
    }
    Ok(())
}

#[test]
fn missing_fields_are_errors() -> Result<(), String> {
    let mut payload = healthy_payload();
    if let Some(object) = payload.as_object_mut() {
        object.remove("total_claims");
        object.remove("limits");
    }
    let result = validate_payload(&payload, &DataContract::default());
    check_exclusivity(&result)?;
    let expected = [
        "Missing required field: total_claims",
        "Missing required field: limits",
    ];
    if result.errors() != expected {
        return Err(format!("Unexpected errors: {:?}", result.errors()));
    }
    Ok(())
}

#[test]
fn wrong_type_and_negative_numbers_are_errors() -> Result<(), String> {
    let mut payload = healthy_payload();
    if let Some(object) = payload.as_object_mut() {
        object.insert("total_documents".to_owned(), json!("120"));
        object.insert("storage_used_bytes".to_owned(), json!(-5));
    }
    let result = validate_payload(&payload, &DataContract::default());
    check_exclusivity(&result)?;
    let [type_error, range_error] = result.errors() else {
        return Err(format!("Expected 2 errors: {:?}", result.errors()));
    };
    if !type_error.contains("total_documents must be a number") {
        return Err(format!("Unexpected type error: {}", type_error));
    }
    if !range_error.contains("storage_used_bytes must be non-negative") {
        return Err(format!("Unexpected range error: {}", range_error));
    }
    Ok(())
}

#[test]
fn inconsistent_counts_only_warn() -> Result<(), String> {
    let mut payload = healthy_payload();
    if let Some(object) = payload.as_object_mut() {
        object.insert("documents_this_month".to_owned(), json!(500));
    }
    let result = validate_payload(&payload, &DataContract::default());
    check_exclusivity(&result)?;
    if !result.is_valid() {
        return Err(format!("Warnings must not invalidate: {:?}", result));
    }
    let [warning] = result.warnings() else {
        return Err(format!("Expected one warning: {:?}", result.warnings()));
    };
    if !warning.starts_with("documents_this_month (500) exceeds total_documents") {
        return Err(format!("Unexpected warning: {}", warning));
    }
    Ok(())
}

#[test]
fn limits_are_required_even_when_not_listed() -> Result<(), String> {
    let mut contract = DataContract::default();
    contract.required_fields.retain(|field| field != "limits");
    let mut payload = healthy_payload();
    if let Some(object) = payload.as_object_mut() {
        object.remove("limits");
    }
    let result = validate_payload(&payload, &contract);
    check_exclusivity(&result)?;
    if result.errors() != ["Missing required field: limits"] {
        return Err(format!("Unexpected errors: {:?}", result.errors()));
    }
    Ok(())
}

#[test]
fn limits_fields_are_checked() -> Result<(), String> {
    let mut payload = healthy_payload();
    if let Some(object) = payload.as_object_mut() {
        object.insert("limits".to_owned(), json!({"max_documents": 10}));
    }
    let result = validate_payload(&payload, &DataContract::default());
    check_exclusivity(&result)?;
    let expected = [
        "Missing limits field: max_claims",
        "Missing limits field: max_storage_bytes",
    ];
    if result.errors() != expected {
        return Err(format!("Unexpected errors: {:?}", result.errors()));
    }

    if let Some(object) = payload.as_object_mut() {
        object.insert("limits".to_owned(), json!([1, 2]));
    }
    let result = validate_payload(&payload, &DataContract::default());
    if result.errors() != ["Field limits must be an object, got array"] {
        return Err(format!("Unexpected errors: {:?}", result.errors()));
    }
    Ok(())
}

#[test]
fn single_row_array_is_unwrapped() -> Result<(), String> {
    let payload = json!([healthy_payload()]);
    let result = validate_payload(&payload, &DataContract::default());
    if !result.is_valid() {
        return Err(format!("Expected valid: {:?}", result));
    }
    Ok(())
}

#[test]
fn non_object_payload_is_one_error() -> Result<(), String> {
    let result = validate_payload(&json!("oops"), &DataContract::default());
    check_exclusivity(&result)?;
    if result.errors() != ["Expected a JSON object, got string"] {
        return Err(format!("Unexpected errors: {:?}", result.errors()));
    }
    Ok(())
}

#[test]
fn remote_failure_becomes_single_error() -> Result<(), String> {
    run_async_test(async {
        let api = ScriptedApi::default();
        let call = FunctionCall::rpc("get_usage_stats");
        let result = validate_data_accuracy(&api, &call, &DataContract::default()).await;
        check_exclusivity(&result)?;
        let [error] = result.errors() else {
            return Err(format!("Expected one error: {:?}", result.errors()));
        };
        if !error.starts_with("Validation request failed:") {
            return Err(format!("Unexpected error: {}", error));
        }
        if result.data().is_some() {
            return Err("No payload was received".to_owned());
        }
        Ok(())
    })
}

#[test]
fn remote_payload_is_validated_once() -> Result<(), String> {
    run_async_test(async {
        let api = ScriptedApi::default().reply("get_usage_stats", Ok(healthy_payload()));
        let call = FunctionCall::rpc("get_usage_stats");
        let result = validate_data_accuracy(&api, &call, &DataContract::default()).await;
        if !result.is_valid() {
            return Err(format!("Expected valid: {:?}", result));
        }
        if api.calls() != ["get_usage_stats"] {
            return Err(format!("Unexpected calls: {:?}", api.calls()));
        }
        Ok(())
    })
}

#[test]
fn consistency_rule_parsing() -> Result<(), String> {
    let rule: ConsistencyRule = "claims_this_month <= total_claims"
        .parse()
        .map_err(|err: crate::error::ConfigError| err.to_string())?;
    if rule != ConsistencyRule::new("claims_this_month", "total_claims") {
        return Err(format!("Unexpected rule: {:?}", rule));
    }
    for invalid in ["claims_this_month", "<= total", "a <= "] {
        if invalid.parse::<ConsistencyRule>().is_ok() {
            return Err(format!("Expected '{}' to be rejected", invalid));
        }
    }
    Ok(())
}
