use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{Command, CorsArgs, ProbeArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, CorsConfig, DurationValue};

/// Applies configuration values to CLI arguments. Anything given on the
/// command line or through the environment wins over the file.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut ProbeArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "base_url")
        && let Some(url) = config.base_url.clone()
    {
        args.base_url = Some(url);
    }

    if !is_cli(matches, "anon_key")
        && let Some(key) = config.anon_key.clone()
    {
        args.anon_key = Some(key);
    }

    if !is_cli(matches, "session_token")
        && let Some(token) = config.session_token.clone()
    {
        args.session_token = Some(token);
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = config_duration(timeout, "timeout")?;
    }

    if !is_cli(matches, "retries")
        && let Some(retries) = config.retries
    {
        args.retries = retries;
    }

    if !is_cli(matches, "backoff_ms")
        && let Some(backoff_ms) = config.backoff_ms
    {
        args.backoff_ms = backoff_ms;
    }

    if !is_cli(matches, "export_json")
        && let Some(path) = config.export_json.clone()
    {
        args.export_json = Some(path);
    }

    if !is_cli(matches, "cache_path")
        && let Some(path) = config.cache_path.clone()
    {
        args.cache_path = path;
    }

    if !is_cli(matches, "cache_ttl")
        && let Some(ttl) = config.cache_ttl.as_ref()
    {
        args.cache_ttl = config_duration(ttl, "cache_ttl")?;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    if let Some(cors) = config.cors.as_ref()
        && let Some(Command::Cors(cors_args)) = args.command.as_mut()
        && let Some(cors_matches) = matches.subcommand_matches("cors")
    {
        apply_cors_config(cors_args, cors_matches, cors)?;
    }

    Ok(())
}

fn apply_cors_config(
    args: &mut CorsArgs,
    matches: &ArgMatches,
    config: &CorsConfig,
) -> AppResult<()> {
    if !is_cli(matches, "origin")
        && let Some(origin) = config.origin.as_ref()
    {
        if origin.trim().is_empty() {
            return Err(AppError::config(ConfigError::EmptyField {
                field: "cors.origin",
            }));
        }
        args.origin = origin.trim().to_owned();
    }

    if !is_cli(matches, "functions")
        && let Some(functions) = config.functions.as_ref()
    {
        args.functions = functions
            .iter()
            .map(|function| function.trim())
            .filter(|function| !function.is_empty())
            .map(str::to_owned)
            .collect();
    }

    Ok(())
}

fn config_duration(
    value: &DurationValue,
    field: &'static str,
) -> AppResult<std::time::Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}
