use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::args::parse_duration_value;
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub anon_key: Option<String>,
    pub session_token: Option<String>,
    pub timeout: Option<DurationValue>,
    pub retries: Option<u32>,
    pub backoff_ms: Option<u64>,
    pub export_json: Option<String>,
    pub cache_path: Option<String>,
    pub cache_ttl: Option<DurationValue>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
    pub suite: Option<SuiteConfig>,
    pub contract: Option<ContractConfig>,
    pub cors: Option<CorsConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuiteConfig {
    pub stats_function: Option<String>,
    pub legacy_stats_function: Option<String>,
    pub stats_params: Option<Map<String, Value>>,
    pub volume_function: Option<String>,
    pub volume_limit: Option<u64>,
    pub volume_limit_param: Option<String>,
    pub count_field: Option<String>,
    pub consistency_slack: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContractConfig {
    pub required_fields: Option<Vec<String>>,
    pub numeric_fields: Option<Vec<String>>,
    /// Rules written as `"part <= whole"`.
    pub consistency: Option<Vec<String>>,
    pub limits_field: Option<String>,
    pub limit_fields: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CorsConfig {
    pub origin: Option<String>,
    pub functions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }
}
