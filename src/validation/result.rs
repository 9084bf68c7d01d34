use serde::Serialize;
use serde_json::Value;

/// Outcome of validating one payload. `is_valid` is derived from `errors`
/// at construction and cannot drift from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl ValidationResult {
    #[must_use]
    pub fn new(errors: Vec<String>, warnings: Vec<String>, data: Option<Value>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            data,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self::new(vec![error.into()], Vec::new(), None)
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}
