//! Transport binding: one authenticated HTTPS request per call

mod certificates;
mod https_transport;

pub use https_transport::MutualTlsTransport;

use url::Url;
use crate::Qkd014Error;

/// Raw KME answer, before any data format check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status_code: u16,
    /// HTTP body, expected to be JSON
    pub body: String,
}

/// Sends requests to a KME REST API
/// # Note
/// Implementations must not keep per-request state, a single transport is shared by concurrent calls
pub trait KmeTransport: Send + Sync {
    /// Perform a GET request
    /// # Errors
    /// A transport failure if no HTTP response could be received
    fn get(&self, url: &Url) -> Result<RawResponse, Qkd014Error>;

    /// Perform a POST request with a JSON body
    /// # Errors
    /// A transport failure if no HTTP response could be received
    fn post(&self, url: &Url, json_body: &serde_json::Value) -> Result<RawResponse, Qkd014Error>;
}
