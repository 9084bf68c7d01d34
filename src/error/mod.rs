mod app;
mod config;
mod remote;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use remote::{RemoteError, TransportError};
pub use validation::ValidationError;
