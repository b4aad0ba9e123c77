//! ETSI QKD 014 data formats, serialized to HTTP request body or deserialized from HTTP response body

pub mod request_obj;
pub mod response_obj;

use std::fmt;
use serde::de::DeserializeOwned;
use crate::qkd014_data::response_obj::{KeyContainer, ProtocolError, StatusInfo};
use crate::transport::RawResponse;
use crate::{KmeReply, Qkd014Error, HTTP_STATUS_OK};

/// Trait to be implemented by objects sent as JSON in HTTP request body
pub trait HttpRequestBody where Self: serde::Serialize {
    fn to_json(&self) -> Result<serde_json::Value, Qkd014Error> {
        serde_json::to_value(self).map_err(|e| {
            Qkd014Error::InvalidRequest(format!("Error serializing HTTP request body: {}", e))
        })
    }
}

/// Trait to be implemented by objects received as JSON in HTTP response body
pub trait HttpResponseBody where Self: DeserializeOwned {
    /// Data format name, as in the ETSI QKD 014 document
    const SCHEMA_NAME: &'static str;

    /// Deserialize the object, all required fields must be present
    /// # Errors
    /// A schema violation if the body isn't JSON or does not match the data format
    fn from_json(body: &str) -> Result<Self, Qkd014Error> {
        serde_json::from_str(body).map_err(|e| {
            Qkd014Error::schema_violation(Self::SCHEMA_NAME, e)
        })
    }
}

/// Any payload a KME can answer with
#[derive(Debug, Clone, PartialEq)]
pub enum Qkd014Data {
    /// Answer to a successful "Get status" request
    Status(StatusInfo),
    /// Answer to a successful "Get key" or "Get key with key IDs" request
    KeyContainer(KeyContainer),
    /// Answer to any request that failed on KME side
    Error(ProtocolError),
}

impl Qkd014Data {
    pub fn is_error(&self) -> bool {
        matches!(self, Qkd014Data::Error(_))
    }

    /// Serialize the payload back to JSON, for display purposes
    pub fn to_json_pretty(&self) -> Result<String, Qkd014Error> {
        let json = match self {
            Qkd014Data::Status(status) => serde_json::to_string_pretty(status),
            Qkd014Data::KeyContainer(keys) => serde_json::to_string_pretty(keys),
            Qkd014Data::Error(error) => serde_json::to_string_pretty(error),
        };
        json.map_err(|e| Qkd014Error::Output(format!("Error serializing payload: {}", e)))
    }
}

impl fmt::Display for Qkd014Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qkd014Data::Status(status) => write!(f, "{}", status),
            Qkd014Data::KeyContainer(keys) => write!(f, "{}", keys),
            Qkd014Data::Error(error) => write!(f, "{}", error),
        }
    }
}

/// Decode a KME answer: `T` on 200, [ProtocolError] for any other status code
pub(crate) fn decode_reply<T: HttpResponseBody>(response: RawResponse, wrap: fn(T) -> Qkd014Data) -> Result<KmeReply, Qkd014Error> {
    if response.status_code == HTTP_STATUS_OK {
        let payload = T::from_json(&response.body)?;
        return Ok((HTTP_STATUS_OK, wrap(payload)));
    }
    let error = ProtocolError::from_json(&response.body)?;
    Ok((response.status_code, Qkd014Data::Error(error)))
}
