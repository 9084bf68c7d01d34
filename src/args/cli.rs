use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use super::defaults::{DEFAULT_CORS_ORIGIN, default_cache_path};
use super::parsers::{parse_bool_env, parse_duration_arg, parse_json_body, parse_query_pair};
use super::types::HttpMethod;

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the probe suite and print the report (default)
    Run,
    /// Check CORS preflight responses of edge functions
    Cors(CorsArgs),
    /// Invoke one RPC or edge function and print its JSON result
    Call(CallArgs),
}

#[derive(Debug, Args, Clone)]
pub struct CorsArgs {
    /// Origin sent with the preflight request
    #[arg(long, default_value = DEFAULT_CORS_ORIGIN)]
    pub origin: String,

    /// Edge function to check (repeatable)
    #[arg(long = "function", short = 'f')]
    pub functions: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CallArgs {
    /// Function or RPC name
    pub name: String,

    /// Call an edge function instead of a database RPC
    #[arg(long)]
    pub edge: bool,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "post", ignore_case = true)]
    pub method: HttpMethod,

    /// JSON request body
    #[arg(long, short = 'd', value_parser = parse_json_body)]
    pub data: Option<serde_json::Value>,

    /// Query parameter in 'key=value' format (repeatable)
    #[arg(long = "query", short = 'q', value_parser = parse_query_pair)]
    pub query: Vec<(String, String)>,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Performance and data-validation probes for backend RPC endpoints and edge functions."
)]
pub struct ProbeArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project base URL (e.g. https://project.example.co)
    #[arg(long = "base-url", short = 'u', env = "EDGEPROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Anonymous API key, also used as the bearer token when no session token is set
    #[arg(long = "anon-key", env = "EDGEPROBE_ANON_KEY", hide_env_values = true)]
    pub anon_key: Option<String>,

    /// User session access token
    #[arg(
        long = "session-token",
        env = "EDGEPROBE_SESSION_TOKEN",
        hide_env_values = true
    )]
    pub session_token: Option<String>,

    /// Per-attempt request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = "60s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Retries after a timeout or network failure
    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Delay before retrying after a network failure, in milliseconds
    #[arg(long = "backoff-ms", default_value_t = 1000)]
    pub backoff_ms: u64,

    /// Path to config file (TOML/JSON). Defaults to ./edgeprobe.toml or ./edgeprobe.json if present.
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Write the report as JSON to this path
    #[arg(long = "export-json")]
    pub export_json: Option<String>,

    /// File used as the local cache stand-in by the cache-path probe
    #[arg(long = "cache-path", default_value_t = default_cache_path())]
    pub cache_path: String,

    /// Age after which a local cache entry counts as stale (supports ms/s/m/h)
    #[arg(
        long = "cache-ttl",
        default_value = "5m",
        value_parser = parse_duration_arg
    )]
    pub cache_ttl: Duration,

    /// Enable verbose logging (sets log level to debug unless overridden by EDGEPROBE_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
