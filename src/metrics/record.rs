use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Scalar diagnostic value attached to a probe result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::Int(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for MetadataValue {
    fn from(value: u64) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u16> for MetadataValue {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Result of one probe.
///
/// `end_time_ms` is always `start_time_ms + duration_ms` and `error` is
/// present exactly when `success` is false; both hold because
/// [`MetricRecord::completed`] is the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    test_name: String,
    start_time_ms: u64,
    end_time_ms: u64,
    duration_ms: u64,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_hit: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, MetadataValue>,
}

impl MetricRecord {
    #[must_use]
    pub fn completed(
        test_name: impl Into<String>,
        start_time_ms: u64,
        duration_ms: u64,
        outcome: Result<(), String>,
    ) -> Self {
        let (success, error) = match outcome {
            Ok(()) => (true, None),
            Err(message) if message.trim().is_empty() => {
                (false, Some("unknown error".to_owned()))
            }
            Err(message) => (false, Some(message)),
        };
        let end_time_ms = start_time_ms.saturating_add(duration_ms);
        Self {
            test_name: test_name.into(),
            start_time_ms,
            end_time_ms,
            duration_ms: end_time_ms.saturating_sub(start_time_ms),
            success,
            error,
            data_size: None,
            cache_hit: None,
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn with_data_size(mut self, bytes: u64) -> Self {
        self.data_size = Some(bytes);
        self
    }

    #[must_use]
    pub const fn with_cache_hit(mut self, hit: bool) -> Self {
        self.cache_hit = Some(hit);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    #[must_use]
    pub const fn start_time_ms(&self) -> u64 {
        self.start_time_ms
    }

    #[must_use]
    pub const fn end_time_ms(&self) -> u64 {
        self.end_time_ms
    }

    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn data_size(&self) -> Option<u64> {
        self.data_size
    }

    #[must_use]
    pub const fn cache_hit(&self) -> Option<bool> {
        self.cache_hit
    }

    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, MetadataValue> {
        &self.metadata
    }
}
