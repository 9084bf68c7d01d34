use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::args::HttpMethod;
use crate::error::{RemoteError, TransportError, ValidationError};
use crate::metrics::now_unix_ms;

use super::response::decode_response;
use super::{Credentials, FunctionCall, RemoteRequest, RemoteResponse, Transport};

/// Query parameter appended to every call so intermediaries never serve a
/// cached response.
pub(crate) const CACHE_BUST_PARAM: &str = "_t";

const PREFLIGHT_REQUEST_HEADERS: &str = "authorization, apikey, content-type";

/// What the probes and the validator see of the backend.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn invoke(&self, call: &FunctionCall) -> Result<Value, RemoteError>;
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    base_url: Url,
    credentials: Credentials,
    network_backoff: Duration,
}

impl ClientSettings {
    /// Validates the project base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot be parsed or cannot carry
    /// a path.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        network_backoff: Duration,
    ) -> Result<Self, ValidationError> {
        let base_url = Url::parse(base_url.trim()).map_err(|err| ValidationError::InvalidBaseUrl {
            url: base_url.to_owned(),
            source: err,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ValidationError::BaseUrlCannotBeABase {
                url: base_url.to_string(),
            });
        }
        Ok(Self {
            base_url,
            credentials,
            network_backoff,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

pub struct RemoteClient<T> {
    pub(super) transport: T,
    settings: ClientSettings,
}

impl<T: Transport> RemoteClient<T> {
    #[must_use]
    pub const fn new(transport: T, settings: ClientSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Calls a remote function, retrying timeouts and network failures.
    ///
    /// Each attempt gets its own timeout and a fresh cache-busting
    /// parameter. Network failures wait the configured backoff before the
    /// next attempt; timeouts retry immediately. HTTP error responses are
    /// returned at once.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Timeout`] or [`RemoteError::Network`] once
    /// the retry budget is spent, [`RemoteError::Http`] for non-2xx
    /// responses, and [`RemoteError::Decode`] for invalid JSON.
    pub async fn call(&self, call: &FunctionCall) -> Result<Value, RemoteError> {
        let max_attempts = call.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            let request = self.prepare(call)?;
            debug!(
                "Calling {} {} (attempt {}/{})",
                call.method.as_str(),
                call.name,
                attempt,
                max_attempts
            );

            match timeout(call.timeout, self.transport.send(request)).await {
                Ok(Ok(response)) => return decode_response(&call.name, &response),
                Ok(Err(err)) if err.is_retryable() => {
                    if attempt >= max_attempts {
                        return Err(RemoteError::Network {
                            function: call.name.clone(),
                            attempts: attempt,
                            source: err,
                        });
                    }
                    warn!(
                        "Network error calling {} ({}), retrying in {}ms",
                        call.name,
                        err,
                        self.settings.network_backoff.as_millis()
                    );
                    sleep(self.settings.network_backoff).await;
                }
                Ok(Err(err)) => {
                    return Err(RemoteError::Request {
                        function: call.name.clone(),
                        source: err,
                    });
                }
                Err(_elapsed) => {
                    if attempt >= max_attempts {
                        return Err(RemoteError::Timeout {
                            function: call.name.clone(),
                            timeout_ms: u64::try_from(call.timeout.as_millis())
                                .unwrap_or(u64::MAX),
                            attempts: attempt,
                        });
                    }
                    warn!(
                        "Call to {} timed out after {}ms, retrying",
                        call.name,
                        call.timeout.as_millis()
                    );
                }
            }
        }
    }

    /// Sends one CORS preflight for an edge function, the way a browser
    /// would before a credentialed POST. Not retried.
    ///
    /// # Errors
    ///
    /// Returns an error when the request times out or fails below HTTP.
    pub async fn preflight(
        &self,
        function: &str,
        origin: &str,
        request_timeout: Duration,
    ) -> Result<RemoteResponse, RemoteError> {
        let url = self.function_url(super::Endpoint::EdgeFunction, function)?;
        let request = RemoteRequest {
            method: HttpMethod::Options,
            url,
            headers: vec![
                ("Origin".to_owned(), origin.to_owned()),
                (
                    "Access-Control-Request-Method".to_owned(),
                    HttpMethod::Post.as_str().to_owned(),
                ),
                (
                    "Access-Control-Request-Headers".to_owned(),
                    PREFLIGHT_REQUEST_HEADERS.to_owned(),
                ),
            ],
            body: None,
        };

        match timeout(request_timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) if err.is_retryable() => Err(RemoteError::Network {
                function: function.to_owned(),
                attempts: 1,
                source: err,
            }),
            Ok(Err(err)) => Err(RemoteError::Request {
                function: function.to_owned(),
                source: err,
            }),
            Err(_elapsed) => Err(RemoteError::Timeout {
                function: function.to_owned(),
                timeout_ms: u64::try_from(request_timeout.as_millis()).unwrap_or(u64::MAX),
                attempts: 1,
            }),
        }
    }

    fn prepare(&self, call: &FunctionCall) -> Result<RemoteRequest, RemoteError> {
        let mut url = self.function_url(call.endpoint, &call.name)?;
        url.query_pairs_mut()
            .extend_pairs(call.query.iter())
            .append_pair(CACHE_BUST_PARAM, &now_unix_ms().to_string());

        let credentials = &self.settings.credentials;
        let mut headers = vec![
            ("apikey".to_owned(), credentials.anon_key().to_owned()),
            (
                "Authorization".to_owned(),
                format!("Bearer {}", credentials.bearer()),
            ),
            ("Accept".to_owned(), "application/json".to_owned()),
        ];

        let body = match call.body.as_ref() {
            Some(body) => {
                headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
                Some(serde_json::to_vec(body).map_err(|err| RemoteError::Request {
                    function: call.name.clone(),
                    source: TransportError::Build {
                        message: err.to_string(),
                    },
                })?)
            }
            None => None,
        };

        Ok(RemoteRequest {
            method: call.method,
            url,
            headers,
            body,
        })
    }

    fn function_url(&self, endpoint: super::Endpoint, name: &str) -> Result<Url, RemoteError> {
        let mut url = self.settings.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        // ClientSettings::new rejects cannot-be-a-base URLs, so this only
        // fails if that check is bypassed.
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidUrl {
                url: self.settings.base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .extend(endpoint.path_prefix())
            .push(name);
        Ok(url)
    }
}

#[async_trait]
impl<T: Transport> RemoteApi for RemoteClient<T> {
    async fn invoke(&self, call: &FunctionCall) -> Result<Value, RemoteError> {
        self.call(call).await
    }
}
