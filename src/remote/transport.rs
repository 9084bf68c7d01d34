use std::collections::BTreeMap;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Url};
use tracing::debug;

use crate::args::{DEFAULT_USER_AGENT, HttpMethod};
use crate::error::{RemoteError, TransportError};

/// Fully prepared request: URL, headers and body are final.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl RemoteRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response with lower-cased header names and the drained body.
#[derive(Debug, Clone, Default)]
pub struct RemoteResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl RemoteResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Sends one request. Implementations do not retry and do not time out on
/// their own; [`super::RemoteClient`] owns both policies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds the reqwest-backed transport.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new() -> Result<Self, RemoteError> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|err| RemoteError::BuildClient { source: err })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, TransportError> {
        let mut builder = self
            .client
            .request(reqwest::Method::from(request.method), request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| classify_send_error(&err))?;
        let status = response.status().as_u16();
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), value.to_owned());
            }
        }
        let body = read_body(response).await?;
        debug!("HTTP {} with {} body bytes", status, body.len());

        Ok(RemoteResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify_send_error(err: &reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Build {
            message: err.to_string(),
        }
    } else {
        TransportError::Connect {
            message: err.to_string(),
        }
    }
}

async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, TransportError> {
    let mut stream = response.bytes_stream();
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|err| TransportError::Body {
            message: err.to_string(),
        })?;
        body.extend_from_slice(&bytes);
    }
    Ok(body)
}
