//! Objects deserialized from HTTP response body

use std::fmt;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::qkd014_data::HttpResponseBody;
use crate::Qkd014Error;

/// Status of the QKD keys (how many available etc.) between the calling master SAE and a slave SAE
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct StatusInfo {
    /// KME ID of the KME
    pub source_KME_ID: String,

    /// KME ID of the target KME
    pub target_KME_ID: String,

    /// SAE ID of the calling master SAE
    pub master_SAE_ID: String,

    /// SAE ID of the specified slave SAE
    pub slave_SAE_ID: String,

    /// Default size of key the KME can deliver to the SAE (in bit)
    pub key_size: u64,

    /// Number of stored keys KME can deliver to the SAE
    pub stored_key_count: u64,

    /// Maximum number of stored_key_count
    pub max_key_count: u64,

    /// Maximum number of keys per request
    pub max_key_per_request: u64,

    /// Maximum size of key the KME can deliver to the SAE (in bit)
    pub max_key_size: u64,

    /// Minimum size of key the KME can deliver to the SAE (in bit)
    pub min_key_size: u64,

    /// Maximum number of additional_slave_SAE_IDs the KME allows. "0" when the KME does not support key multicast
    pub max_SAE_ID_count: u64,

    /// (Option) for future use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_extension: Option<Value>,
}
impl HttpResponseBody for StatusInfo {
    const SCHEMA_NAME: &'static str = "Status";
}

impl fmt::Display for StatusInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "source_KME_ID : {}", self.source_KME_ID)?;
        writeln!(f, "target_KME_ID : {}", self.target_KME_ID)?;
        writeln!(f, "master_SAE_ID : {}", self.master_SAE_ID)?;
        writeln!(f, "slave_SAE_ID : {}", self.slave_SAE_ID)?;
        writeln!(f, "key_size : {}", self.key_size)?;
        writeln!(f, "stored_key_count : {}", self.stored_key_count)?;
        writeln!(f, "max_key_count : {}", self.max_key_count)?;
        writeln!(f, "max_key_per_request : {}", self.max_key_per_request)?;
        writeln!(f, "max_key_size : {}", self.max_key_size)?;
        writeln!(f, "min_key_size : {}", self.min_key_size)?;
        writeln!(f, "max_SAE_ID_count : {}", self.max_SAE_ID_count)?;
        if let Some(extension) = &self.status_extension {
            writeln!(f, "status_extension : {}", extension)?;
        }
        Ok(())
    }
}

/// Key data
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct KeyMaterial {
    /// ID of the key: UUID format (example: "550e8400-e29b-41d4-a716-446655440000").
    pub key_ID: String,

    /// (Option) for future use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ID_extension: Option<Value>,

    /// Key data encoded by base64 [7]. The key size is specified by the "size"
    /// parameter in "Get key". If not specified, the "key_size" value in Status data model is used as the default size.
    pub key: String,

    /// (Option) for future use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_extension: Option<Value>,
}

impl KeyMaterial {
    /// Decode the base64 key data
    /// # Errors
    /// A schema violation if the key isn't valid base64
    pub fn decode_key(&self) -> Result<Vec<u8>, Qkd014Error> {
        general_purpose::STANDARD.decode(&self.key).map_err(|e| {
            Qkd014Error::schema_violation("Key", format!("key {} is not valid base64: {}", self.key_ID, e))
        })
    }

    /// Parse the key ID, KMEs are expected to use UUIDs
    /// # Errors
    /// A schema violation if the key ID isn't an UUID
    pub fn key_uuid(&self) -> Result<uuid::Uuid, Qkd014Error> {
        uuid::Uuid::parse_str(&self.key_ID).map_err(|e| {
            Qkd014Error::schema_violation("Key", format!("key ID {} is not an UUID: {}", self.key_ID, e))
        })
    }
}

impl fmt::Display for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Key id : {}", self.key_ID)?;
        writeln!(f, "Key : {}", self.key)?;
        if let Some(extension) = &self.key_ID_extension {
            writeln!(f, "Key ID extension : {}", extension)?;
        }
        if let Some(extension) = &self.key_extension {
            writeln!(f, "Key extension : {}", extension)?;
        }
        Ok(())
    }
}

/// List of keys
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KeyContainer {
    /// Array of keys. The number of keys is specified by the "number" parameter in "Get key". If not specified, the default number of keys is 1.
    pub keys: Vec<KeyMaterial>,

    /// (Option) for future use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_container_extension: Option<Value>,
}
impl HttpResponseBody for KeyContainer {
    const SCHEMA_NAME: &'static str = "Key Container";
}

impl fmt::Display for KeyContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.keys {
            writeln!(f, "{}", key)?;
        }
        if let Some(extension) = &self.key_container_extension {
            writeln!(f, "Key container extension : {}", extension)?;
        }
        Ok(())
    }
}

/// Error returned by the KME, along with a non-200 status code
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProtocolError {
    /// Error message
    pub message: String,

    /// (Option) Additional detailed error information, normally an array of name/value objects.
    /// Kept as received, whatever its JSON type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
impl HttpResponseBody for ProtocolError {
    const SCHEMA_NAME: &'static str = "Error";
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Message : {}", self.message)?;
        match &self.details {
            Some(Value::Array(details)) => {
                for detail in details {
                    writeln!(f, "Details : {}", detail)?;
                }
            }
            Some(details) => writeln!(f, "Details : {}", details)?,
            None => {}
        }
        Ok(())
    }
}
