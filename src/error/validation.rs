use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid boolean '{value}'. Expected true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Invalid query parameter '{value}'. Expected 'key=value'.")]
    InvalidQueryFormat { value: String },
    #[error("Query parameter name must not be empty in '{value}'.")]
    QueryNameEmpty { value: String },
    #[error("Invalid JSON body: {source}")]
    InvalidJsonBody {
        #[source]
        source: serde_json::Error,
    },
    #[error("Missing base URL (set --base-url or provide base_url in config).")]
    MissingBaseUrl,
    #[error("Missing anon key (set --anon-key or provide anon_key in config).")]
    MissingAnonKey,
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Base URL '{url}' cannot carry a path.")]
    BaseUrlCannotBeABase { url: String },
    #[error("No functions to check (use --function or cors.functions in config).")]
    NoCorsFunctions,
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
