use thiserror::Error;

/// Failure below HTTP: the request never produced a complete response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {message}")]
    Connect { message: String },
    #[error("failed to read response body: {message}")]
    Body { message: String },
    #[error("failed to build request: {message}")]
    Build { message: String },
}

impl TransportError {
    /// Connection and body failures are worth another attempt; a request
    /// that could not be built will fail the same way again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Body { .. })
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(
        "Request to '{function}' timed out after {timeout_ms}ms ({attempts} attempt(s)). The \
function may be cold-starting or overloaded."
    )]
    Timeout {
        function: String,
        timeout_ms: u64,
        attempts: u32,
    },
    #[error(
        "Network error calling '{function}' after {attempts} attempt(s): {source}. Likely causes: \
the function's CORS policy rejected the request, the network is unreachable, the function \
crashed before responding, or the credential is invalid."
    )]
    Network {
        function: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },
    #[error("'{function}' returned HTTP {status}: {message}")]
    Http {
        function: String,
        status: u16,
        message: String,
    },
    #[error("Could not send request to '{function}': {source}")]
    Request {
        function: String,
        #[source]
        source: TransportError,
    },
    #[error("Invalid JSON from '{function}': {source}")]
    Decode {
        function: String,
        #[source]
        source: serde_json::Error,
    },
}
