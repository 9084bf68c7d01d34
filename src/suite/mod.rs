//! Ordered performance probes against one backend plus a final payload
//! validation.
mod cache;
mod driver;
mod probes;
mod settings;


pub use cache::{CacheEntry, CacheHit, LocalCache};
pub use driver::{SuiteOutcome, TestSuite};
pub use probes::{BASIC_RPC_TEST, CACHE_PATH_TEST, DATA_CONSISTENCY_TEST, REALISTIC_VOLUME_TEST};
pub use settings::{
    DEFAULT_CACHE_TTL, DEFAULT_CONSISTENCY_SLACK, DEFAULT_COUNT_FIELD,
    DEFAULT_LEGACY_STATS_FUNCTION, DEFAULT_STATS_FUNCTION, DEFAULT_VOLUME_FUNCTION,
    DEFAULT_VOLUME_LIMIT, DEFAULT_VOLUME_LIMIT_PARAM, SuiteSettings,
};
