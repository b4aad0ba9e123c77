//! SAE side client for the ETSI GS QKD 014 REST API
//!
//! An SAE retrieves QKD keys from its local KME through three operations (key status,
//! get key, get key with key IDs), each one a single mutually authenticated HTTPS request.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod qkd014_data;
pub mod transport;

pub use client::Qkd014Client;
pub use config::ConnectionConfig;
pub use error::{Qkd014Error, TransportFailureKind};
pub use qkd014_data::Qkd014Data;

/// Version of the ETSI GS QKD 014 specification this client implements
pub const ETSI_QKD_014_PROTOCOL_VERSION: &'static str = "1.1.1";

/// Path segments prepended to every REST route, ie `https://{hostname}/api/v1/keys/...`
pub const API_ROOT_PATH_SEGMENTS: [&'static str; 3] = ["api", "v1", "keys"];

/// Request timeout applied when the configuration does not override it, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// HTTP status code of a successful ETSI QKD 014 request, any other code carries an error body
pub const HTTP_STATUS_OK: u16 = 200;

/// Status code and decoded payload returned by every operation
pub type KmeReply = (u16, Qkd014Data);
