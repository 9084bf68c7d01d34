use std::path::PathBuf;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::remote::{DEFAULT_RETRIES, DEFAULT_TIMEOUT, FunctionCall};
use crate::validation::DataContract;

pub const DEFAULT_STATS_FUNCTION: &str = "get_usage_stats";
pub const DEFAULT_LEGACY_STATS_FUNCTION: &str = "get_usage_stats_legacy";
pub const DEFAULT_VOLUME_FUNCTION: &str = "get_recent_documents";
pub const DEFAULT_VOLUME_LIMIT: u64 = 100;
pub const DEFAULT_VOLUME_LIMIT_PARAM: &str = "p_limit";
pub const DEFAULT_COUNT_FIELD: &str = "total_documents";
pub const DEFAULT_CONSISTENCY_SLACK: u64 = 1;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Which functions the suite calls and how it judges them.
#[derive(Debug, Clone)]
pub struct SuiteSettings {
    /// Optimized usage-stats RPC, also the payload the validator checks.
    pub stats_function: String,
    /// Slower reference query the optimized one is compared against.
    pub legacy_stats_function: String,
    /// Arguments sent to both stats RPCs.
    pub stats_params: Map<String, Value>,
    pub volume_function: String,
    pub volume_limit: u64,
    pub volume_limit_param: String,
    /// Counter compared between the optimized and legacy stats.
    pub count_field: String,
    /// Largest tolerated difference between the two counters.
    pub consistency_slack: u64,
    pub retries: u32,
    pub request_timeout: Duration,
    pub cache_path: PathBuf,
    pub cache_ttl: Duration,
    pub contract: DataContract,
}

impl SuiteSettings {
    /// Defaults for everything except where the cache file lives.
    #[must_use]
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            stats_function: DEFAULT_STATS_FUNCTION.to_owned(),
            legacy_stats_function: DEFAULT_LEGACY_STATS_FUNCTION.to_owned(),
            stats_params: Map::new(),
            volume_function: DEFAULT_VOLUME_FUNCTION.to_owned(),
            volume_limit: DEFAULT_VOLUME_LIMIT,
            volume_limit_param: DEFAULT_VOLUME_LIMIT_PARAM.to_owned(),
            count_field: DEFAULT_COUNT_FIELD.to_owned(),
            consistency_slack: DEFAULT_CONSISTENCY_SLACK,
            retries: DEFAULT_RETRIES,
            request_timeout: DEFAULT_TIMEOUT,
            cache_path: cache_path.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            contract: DataContract::default(),
        }
    }

    #[must_use]
    pub fn stats_call(&self) -> FunctionCall {
        self.rpc(&self.stats_function)
            .with_body(Value::Object(self.stats_params.clone()))
    }

    #[must_use]
    pub fn legacy_stats_call(&self) -> FunctionCall {
        self.rpc(&self.legacy_stats_function)
            .with_body(Value::Object(self.stats_params.clone()))
    }

    #[must_use]
    pub fn volume_call(&self) -> FunctionCall {
        let mut params = Map::new();
        params.insert(
            self.volume_limit_param.clone(),
            Value::from(self.volume_limit),
        );
        self.rpc(&self.volume_function)
            .with_body(Value::Object(params))
    }

    fn rpc(&self, name: &str) -> FunctionCall {
        FunctionCall::rpc(name)
            .with_retries(self.retries)
            .with_timeout(self.request_timeout)
    }
}
