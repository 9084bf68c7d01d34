//! Structural and logical checks on a payload returned by the backend.
mod contract;
mod result;

#[cfg(test)]
mod tests;

use serde_json::Value;
use tracing::{debug, warn};

use crate::remote::{FunctionCall, RemoteApi};

pub use contract::{ConsistencyRule, DataContract};
pub use result::ValidationResult;

/// Checks one payload against a contract.
///
/// Missing fields, wrong types and negative numbers are errors. A part
/// count larger than its whole is only a warning: the rule is a heuristic
/// and the backend may legitimately lag between the two counters.
///
/// A single-row array (how table-returning RPCs answer) is validated as
/// that row.
#[must_use]
pub fn validate_payload(payload: &Value, contract: &DataContract) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let Some(object) = single_row(payload).as_object() else {
        errors.push(format!(
            "Expected a JSON object, got {}",
            json_type_name(payload)
        ));
        return ValidationResult::new(errors, warnings, Some(payload.clone()));
    };

    for field in &contract.required_fields {
        if !object.contains_key(field) {
            errors.push(format!("Missing required field: {}", field));
        }
    }

    for field in &contract.numeric_fields {
        let Some(value) = object.get(field) else {
            continue;
        };
        match value.as_f64() {
            None => errors.push(format!(
                "Field {} must be a number, got {}",
                field,
                json_type_name(value)
            )),
            Some(number) if number < 0.0 => {
                errors.push(format!("Field {} must be non-negative, got {}", field, value));
            }
            Some(_) => {}
        }
    }

    for rule in &contract.consistency {
        let part = object.get(&rule.part).and_then(Value::as_f64);
        let whole = object.get(&rule.whole).and_then(Value::as_f64);
        if let (Some(part), Some(whole)) = (part, whole)
            && part > whole
        {
            warnings.push(format!(
                "{} ({}) exceeds {} ({})",
                rule.part, part, rule.whole, whole
            ));
        }
    }

    match object.get(&contract.limits_field) {
        None if contract.required_fields.contains(&contract.limits_field) => {}
        None => errors.push(format!("Missing required field: {}", contract.limits_field)),
        Some(Value::Object(limits)) => {
            for field in &contract.limit_fields {
                if !limits.contains_key(field) {
                    errors.push(format!(
                        "Missing {} field: {}",
                        contract.limits_field, field
                    ));
                }
            }
        }
        Some(other) => errors.push(format!(
            "Field {} must be an object, got {}",
            contract.limits_field,
            json_type_name(other)
        )),
    }

    ValidationResult::new(errors, warnings, Some(payload.clone()))
}

/// Fetches one payload and validates it. Never fails: a remote error
/// becomes a single-error result.
pub async fn validate_data_accuracy<A>(
    api: &A,
    call: &FunctionCall,
    contract: &DataContract,
) -> ValidationResult
where
    A: RemoteApi + ?Sized,
{
    match api.invoke(call).await {
        Ok(payload) => {
            let result = validate_payload(&payload, contract);
            debug!(
                "Validated {}: {} error(s), {} warning(s)",
                call.name,
                result.errors().len(),
                result.warnings().len()
            );
            result
        }
        Err(err) => {
            warn!("Validation request to {} failed: {}", call.name, err);
            ValidationResult::failed(format!("Validation request failed: {}", err))
        }
    }
}

pub(crate) fn single_row(payload: &Value) -> &Value {
    match payload {
        Value::Array(rows) if rows.len() == 1 => rows.first().unwrap_or(payload),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_)
        | Value::Object(_) => payload,
    }
}

pub(crate) const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
