use crate::args::ProbeArgs;
use crate::error::{AppError, AppResult, ConfigError};
use crate::suite::SuiteSettings;
use crate::validation::{ConsistencyRule, DataContract};

use super::types::{ContractConfig, SuiteConfig};

/// Builds the suite settings from the resolved arguments plus the optional
/// `[suite]` and `[contract]` sections.
///
/// # Errors
///
/// Returns an error when a configured name is empty or a consistency rule
/// is malformed.
pub fn suite_settings(
    args: &ProbeArgs,
    suite: Option<&SuiteConfig>,
    contract: Option<&ContractConfig>,
) -> AppResult<SuiteSettings> {
    let mut settings = SuiteSettings::new(&args.cache_path);
    settings.retries = args.retries;
    settings.request_timeout = args.request_timeout;
    settings.cache_ttl = args.cache_ttl;

    if let Some(suite) = suite {
        apply_suite(&mut settings, suite)?;
    }
    if let Some(contract) = contract {
        settings.contract = resolve_contract(contract)?;
    }

    Ok(settings)
}

fn apply_suite(settings: &mut SuiteSettings, config: &SuiteConfig) -> AppResult<()> {
    if let Some(name) = config.stats_function.as_deref() {
        settings.stats_function = non_empty(name, "suite.stats_function")?;
    }
    if let Some(name) = config.legacy_stats_function.as_deref() {
        settings.legacy_stats_function = non_empty(name, "suite.legacy_stats_function")?;
    }
    if let Some(params) = config.stats_params.as_ref() {
        settings.stats_params = params.clone();
    }
    if let Some(name) = config.volume_function.as_deref() {
        settings.volume_function = non_empty(name, "suite.volume_function")?;
    }
    if let Some(limit) = config.volume_limit {
        settings.volume_limit = limit;
    }
    if let Some(param) = config.volume_limit_param.as_deref() {
        settings.volume_limit_param = non_empty(param, "suite.volume_limit_param")?;
    }
    if let Some(field) = config.count_field.as_deref() {
        settings.count_field = non_empty(field, "suite.count_field")?;
    }
    if let Some(slack) = config.consistency_slack {
        settings.consistency_slack = slack;
    }
    Ok(())
}

/// Unset lists keep their defaults; a set list replaces the default
/// entirely.
fn resolve_contract(config: &ContractConfig) -> AppResult<DataContract> {
    let mut contract = DataContract::default();

    if let Some(fields) = config.required_fields.as_ref() {
        contract.required_fields = fields.clone();
    }
    if let Some(fields) = config.numeric_fields.as_ref() {
        contract.numeric_fields = fields.clone();
    }
    if let Some(rules) = config.consistency.as_ref() {
        contract.consistency = rules
            .iter()
            .map(|rule| rule.parse::<ConsistencyRule>())
            .collect::<Result<Vec<_>, ConfigError>>()?;
    }
    if let Some(field) = config.limits_field.as_deref() {
        contract.limits_field = non_empty(field, "contract.limits_field")?;
    }
    if let Some(fields) = config.limit_fields.as_ref() {
        contract.limit_fields = fields.clone();
    }

    Ok(contract)
}

fn non_empty(value: &str, field: &'static str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::config(ConfigError::EmptyField { field }));
    }
    Ok(value.to_owned())
}
