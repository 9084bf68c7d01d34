use serde_json::Value;
use tracing::{debug, warn};

use crate::metrics::{MetricRecord, ProbeTimer};
use crate::remote::{FunctionCall, RemoteApi};
use crate::validation::{json_type_name, single_row};

use super::TestSuite;

pub const BASIC_RPC_TEST: &str = "Basic RPC Performance";
pub const CACHE_PATH_TEST: &str = "Cache Path Performance";
pub const DATA_CONSISTENCY_TEST: &str = "Data Consistency";
pub const REALISTIC_VOLUME_TEST: &str = "Realistic Data Volume";

impl<A: RemoteApi> TestSuite<A> {
    /// Times one call to the optimized stats RPC.
    pub async fn test_basic_rpc(&self) -> MetricRecord {
        let call = self.settings.stats_call();
        let timer = ProbeTimer::start(BASIC_RPC_TEST);
        let record = match self.api.invoke(&call).await {
            Ok(value) => timer.succeed().with_data_size(data_size(&value)),
            Err(err) => timer.fail(err.to_string()),
        };
        record.with_metadata("function", call.name.as_str())
    }

    /// Serves the stats from the local cache when fresh, otherwise fetches
    /// and stores them.
    ///
    /// Only entries written since [`TestSuite::start_testing`] count as
    /// hits, so a cache left behind by an earlier run cannot mask a backend
    /// that is down now.
    pub async fn test_cache_path(&self) -> MetricRecord {
        let call = self.settings.stats_call();
        let key = format!("rpc:{}", call.name);
        let timer = ProbeTimer::start(CACHE_PATH_TEST);

        let cached = self
            .cache
            .lookup(&key)
            .await
            .filter(|hit| hit.stored_at_ms >= self.started_at_ms);
        if let Some(hit) = cached {
            debug!("Cache hit for {} ({}ms old)", key, hit.age_ms);
            return timer
                .succeed()
                .with_cache_hit(true)
                .with_data_size(data_size(&hit.value))
                .with_metadata("cache_key", key)
                .with_metadata("cache_age_ms", hit.age_ms);
        }

        let record = match self.api.invoke(&call).await {
            Ok(value) => {
                if let Err(err) = self.cache.store(&key, &value).await {
                    warn!(
                        "Failed to write cache file {}: {}",
                        self.cache.path().display(),
                        err
                    );
                }
                timer.succeed().with_data_size(data_size(&value))
            }
            Err(err) => timer.fail(err.to_string()),
        };
        record.with_cache_hit(false).with_metadata("cache_key", key)
    }

    /// Compares one counter between the optimized and legacy stats RPCs.
    pub async fn test_data_consistency(&self) -> MetricRecord {
        let field = self.settings.count_field.as_str();
        let timer = ProbeTimer::start(DATA_CONSISTENCY_TEST);

        let optimized = match self.fetch_count(&self.settings.stats_call(), field).await {
            Ok(count) => count,
            Err(message) => return timer.fail(message),
        };
        let legacy = match self
            .fetch_count(&self.settings.legacy_stats_call(), field)
            .await
        {
            Ok(count) => count,
            Err(message) => {
                return timer
                    .fail(message)
                    .with_metadata("optimized_count", optimized);
            }
        };

        let difference = optimized.abs_diff(legacy);
        let outcome = if difference <= self.settings.consistency_slack {
            Ok(())
        } else {
            Err(format!(
                "{} differs by {} (optimized {}, legacy {}), more than the allowed {}",
                field, difference, optimized, legacy, self.settings.consistency_slack
            ))
        };
        timer
            .finish(outcome)
            .with_metadata("optimized_count", optimized)
            .with_metadata("legacy_count", legacy)
            .with_metadata("difference", difference)
    }

    /// Fetches one page of the listing RPC and checks it honours the limit.
    pub async fn test_realistic_volume(&self) -> MetricRecord {
        let call = self.settings.volume_call();
        let limit = self.settings.volume_limit;
        let timer = ProbeTimer::start(REALISTIC_VOLUME_TEST);

        let value = match self.api.invoke(&call).await {
            Ok(value) => value,
            Err(err) => {
                return timer
                    .fail(err.to_string())
                    .with_metadata("requested_limit", limit);
            }
        };
        let size = data_size(&value);

        let Value::Array(rows) = &value else {
            return timer
                .fail(format!(
                    "Expected a JSON array of rows, got {}",
                    json_type_name(&value)
                ))
                .with_data_size(size)
                .with_metadata("requested_limit", limit);
        };

        let row_count = u64::try_from(rows.len()).unwrap_or(u64::MAX);
        let outcome = if row_count <= limit {
            Ok(())
        } else {
            Err(format!(
                "Returned {} rows, more than the requested limit of {}",
                row_count, limit
            ))
        };
        timer
            .finish(outcome)
            .with_data_size(size)
            .with_metadata("row_count", row_count)
            .with_metadata("requested_limit", limit)
    }

    async fn fetch_count(&self, call: &FunctionCall, field: &str) -> Result<i64, String> {
        let value = self
            .api
            .invoke(call)
            .await
            .map_err(|err| err.to_string())?;
        let row = single_row(&value);
        match row.get(field) {
            Some(count) => count
                .as_i64()
                .ok_or_else(|| format!("{} returned a non-integer {}: {}", call.name, field, count)),
            None => Err(format!("{} returned no {} field", call.name, field)),
        }
    }
}

fn data_size(value: &Value) -> u64 {
    serde_json::to_vec(value)
        .map(|bytes| u64::try_from(bytes.len()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
