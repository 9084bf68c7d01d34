use std::time::Duration;

use serde_json::Value;

use crate::args::HttpMethod;

pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where a function lives on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Database procedure exposed under `rest/v1/rpc/<name>`.
    Rpc,
    /// Serverless function exposed under `functions/v1/<name>`.
    EdgeFunction,
}

impl Endpoint {
    #[must_use]
    pub const fn path_prefix(self) -> &'static [&'static str] {
        match self {
            Endpoint::Rpc => &["rest", "v1", "rpc"],
            Endpoint::EdgeFunction => &["functions", "v1"],
        }
    }
}

/// One invocation of a remote function.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub name: String,
    pub endpoint: Endpoint,
    pub method: HttpMethod,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    pub retries: u32,
    pub timeout: Duration,
}

impl FunctionCall {
    /// RPCs are POSTed with an (initially empty) JSON argument object.
    #[must_use]
    pub fn rpc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: Endpoint::Rpc,
            method: HttpMethod::Post,
            body: Some(Value::Object(serde_json::Map::new())),
            query: Vec::new(),
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn edge(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: Endpoint::EdgeFunction,
            method: HttpMethod::Post,
            body: None,
            query: Vec::new(),
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub const fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Initial attempt plus retries.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}
