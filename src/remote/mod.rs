//! Generic remote-call primitive for database RPCs and edge functions.
//!
//! Every probe reaches the backend through [`RemoteApi`]; [`RemoteClient`]
//! is the production implementation and layers credentials, cache busting,
//! per-attempt timeouts and bounded retries over a [`Transport`].
mod call;
mod client;
pub mod cors;
mod credentials;
mod response;
mod transport;


pub use call::{DEFAULT_RETRIES, DEFAULT_TIMEOUT, Endpoint, FunctionCall};
pub use client::{ClientSettings, RemoteApi, RemoteClient};
pub use credentials::Credentials;
pub use transport::{HttpTransport, RemoteRequest, RemoteResponse, Transport};

pub(crate) use response::extract_error_message;
