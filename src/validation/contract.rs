use std::str::FromStr;

use crate::error::ConfigError;

/// `part` is expected not to exceed `whole` (e.g. documents this month vs.
/// total documents).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyRule {
    pub part: String,
    pub whole: String,
}

impl ConsistencyRule {
    #[must_use]
    pub fn new(part: &str, whole: &str) -> Self {
        Self {
            part: part.to_owned(),
            whole: whole.to_owned(),
        }
    }
}

impl FromStr for ConsistencyRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("<=") {
            Some((part, whole)) if !part.trim().is_empty() && !whole.trim().is_empty() => {
                Ok(Self::new(part.trim(), whole.trim()))
            }
            Some(_) | None => Err(ConfigError::InvalidConsistencyRule {
                value: s.to_owned(),
            }),
        }
    }
}

/// Shape and range expectations for the usage-stats payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataContract {
    pub required_fields: Vec<String>,
    pub numeric_fields: Vec<String>,
    pub consistency: Vec<ConsistencyRule>,
    pub limits_field: String,
    pub limit_fields: Vec<String>,
}

impl Default for DataContract {
    fn default() -> Self {
        let counters = [
            "total_documents",
            "documents_this_month",
            "total_claims",
            "claims_this_month",
            "storage_used_bytes",
        ];
        let mut required_fields: Vec<String> =
            counters.iter().map(|field| (*field).to_owned()).collect();
        required_fields.push("limits".to_owned());

        Self {
            required_fields,
            numeric_fields: counters.iter().map(|field| (*field).to_owned()).collect(),
            consistency: vec![
                ConsistencyRule::new("documents_this_month", "total_documents"),
                ConsistencyRule::new("claims_this_month", "total_claims"),
            ],
            limits_field: "limits".to_owned(),
            limit_fields: vec![
                "max_documents".to_owned(),
                "max_claims".to_owned(),
                "max_storage_bytes".to_owned(),
            ],
        }
    }
}
