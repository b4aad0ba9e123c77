//! Errors returned by the client
//!
//! A non-200 answer from the KME is not an error here: it is decoded into
//! [ProtocolError](crate::qkd014_data::response_obj::ProtocolError) and returned as a normal reply.

use std::fmt;

/// Everything that can prevent an operation from producing a `(status code, payload)` reply
#[derive(thiserror::Error, Debug)]
pub enum Qkd014Error {
    /// Missing or invalid connection parameter, or unusable certificate material.
    /// Detected before any network access.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTPS exchange did not complete (DNS, TCP, TLS handshake, timeout...)
    #[error("Transport failure ({kind}): {message}")]
    Transport {
        kind: TransportFailureKind,
        message: String,
    },

    /// The KME answered with a body not matching the expected data format
    #[error("Data does not meet the ETSI QKD 014 specifications for {schema} Data (version {}): {reason}", crate::ETSI_QKD_014_PROTOCOL_VERSION)]
    SchemaViolation {
        /// Name of the expected data format, eg "Status" or "Key Container"
        schema: &'static str,
        reason: String,
    },

    /// Request parameters given by the caller cannot be encoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A reply could not be rendered or written for presentation
    #[error("Output error: {0}")]
    Output(String),
}

impl Qkd014Error {
    pub(crate) fn config(message: &str) -> Self {
        Qkd014Error::Config(message.to_string())
    }

    pub(crate) fn schema_violation(schema: &'static str, reason: impl fmt::Display) -> Self {
        Qkd014Error::SchemaViolation {
            schema,
            reason: reason.to_string(),
        }
    }

    /// True if the request was aborted because the configured timeout expired
    pub fn is_timeout(&self) -> bool {
        matches!(self, Qkd014Error::Transport { kind: TransportFailureKind::Timeout, .. })
    }

    /// True if the KME never produced a parsable HTTP response, the caller may want to retry
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Qkd014Error::Transport { .. })
    }
}

/// Why an HTTPS exchange failed
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportFailureKind {
    /// Request timeout expired
    Timeout,
    /// Name resolution, TCP connection or TLS handshake failed
    Connection,
    /// Any other failure while sending the request or reading the response
    Other,
}

impl fmt::Display for TransportFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailureKind::Timeout => write!(f, "timeout"),
            TransportFailureKind::Connection => write!(f, "connection"),
            TransportFailureKind::Other => write!(f, "other"),
        }
    }
}

impl From<reqwest::Error> for Qkd014Error {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportFailureKind::Timeout
        } else if e.is_connect() {
            TransportFailureKind::Connection
        } else {
            TransportFailureKind::Other
        };
        Qkd014Error::Transport {
            kind,
            message: format!("{:?}", e),
        }
    }
}
