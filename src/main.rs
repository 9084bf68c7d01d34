mod args;
mod config;
mod entry;
mod error;
mod logger;
mod metrics;
mod remote;
mod report;
mod suite;
#[cfg(test)]
mod test_support;
mod validation;

use std::process::ExitCode;

use error::AppResult;

fn main() -> AppResult<ExitCode> {
    entry::run()
}
