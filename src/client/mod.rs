//! QKD 014 client, the SAE side of the ETSI QKD 014 REST API

use std::fmt;
use log::{debug, error};
use serde_json::Value;
use url::Url;
use crate::config::ConnectionConfig;
use crate::qkd014_data::request_obj::{KeyIdRequest, KeyRequest};
use crate::qkd014_data::response_obj::{KeyContainer, StatusInfo};
use crate::qkd014_data::{decode_reply, HttpRequestBody, Qkd014Data};
use crate::transport::{KmeTransport, MutualTlsTransport};
use crate::{KmeReply, Qkd014Error, API_ROOT_PATH_SEGMENTS};

/// Client for the ETSI QKD 014 REST API of one KME
/// # Type parameters
/// * `T` - The transport used to reach the KME, mutually authenticated HTTPS by default
/// # Note
/// * Every operation is a single independent request, nothing is cached nor retried
/// * Operations return the HTTP status code along with the decoded payload, a non-200 code comes with [Qkd014Data::Error]
pub struct Qkd014Client<T: KmeTransport = MutualTlsTransport> {
    config: ConnectionConfig,
    base_url: Url,
    transport: T,
}

impl Qkd014Client<MutualTlsTransport> {
    /// Create a new client over mutually authenticated HTTPS
    /// # Arguments
    /// * `config` - Connection parameters for the KME
    /// # Errors
    /// A configuration error if certificate material can't be loaded
    pub fn new(config: ConnectionConfig) -> Result<Self, Qkd014Error> {
        let transport = MutualTlsTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: KmeTransport> Qkd014Client<T> {
    /// Create a new client using a custom transport
    pub fn with_transport(config: ConnectionConfig, transport: T) -> Result<Self, Qkd014Error> {
        let base_url = config.base_url()?;
        Ok(Self {
            config,
            base_url,
            transport,
        })
    }

    /// Connection parameters this client was built with
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Get status command, called by master SAE
    /// eg `GET /api/v1/keys/{slave SAE id}/status`
    /// # Arguments
    /// * `slave_sae_id` - SAE ID of the slave SAE, raw (percent-encoded by the client, not by the caller)
    /// # Returns
    /// The response code (200, 400, 401, 503...), along with [Qkd014Data::Status] on 200 or [Qkd014Data::Error] otherwise
    /// # Errors
    /// A transport failure, a schema violation if the KME answer does not match the expected data format,
    /// or an invalid request error if the SAE ID is empty, `.` or `..`
    pub fn get_status(&self, slave_sae_id: &str) -> Result<KmeReply, Qkd014Error> {
        let url = self.route_url(slave_sae_id, "status")?;
        let response = self.transport.get(&url)?;
        Self::log_schema_violation(decode_reply::<StatusInfo>(response, Qkd014Data::Status))
    }

    /// Get key command, called by master SAE
    /// eg `GET /api/v1/keys/{slave SAE id}/enc_keys` if no parameter is set, `POST` with a JSON body otherwise
    /// # Arguments
    /// * `slave_sae_id` - SAE ID of the slave SAE, raw (percent-encoded by the client, not by the caller)
    /// * `number` - Number of keys requested, KME default value is 1
    /// * `size` - Size of each key in bits, KME default value is key_size in Status data format
    /// * `additional_slave_sae_ids` - IDs of other slave SAEs that will share the same keys
    /// * `extension_mandatory` - Extension parameters that KME shall handle or return an error
    /// * `extension_optional` - Extension parameters that KME may ignore
    /// # Returns
    /// The response code, along with [Qkd014Data::KeyContainer] on 200 or [Qkd014Data::Error] otherwise
    pub fn get_key(
        &self,
        slave_sae_id: &str,
        number: Option<u64>,
        size: Option<u64>,
        additional_slave_sae_ids: Option<Vec<String>>,
        extension_mandatory: Option<Value>,
        extension_optional: Option<Value>,
    ) -> Result<KmeReply, Qkd014Error> {
        let key_request = KeyRequest {
            number,
            size,
            additional_slave_SAE_IDs: additional_slave_sae_ids,
            extension_mandatory,
            extension_optional,
        };
        self.get_key_with_request(slave_sae_id, &key_request)
    }

    /// Same as [get_key](Self::get_key), with parameters already gathered in a [KeyRequest]
    pub fn get_key_with_request(&self, slave_sae_id: &str, key_request: &KeyRequest) -> Result<KmeReply, Qkd014Error> {
        let url = self.route_url(slave_sae_id, "enc_keys")?;
        let response = if key_request.is_empty() {
            // Simplified request, KME applies its default values
            self.transport.get(&url)?
        } else {
            let body = key_request.to_json()?;
            debug!("Key request body: {}", body);
            self.transport.post(&url, &body)?
        };
        Self::log_schema_violation(decode_reply::<KeyContainer>(response, Qkd014Data::KeyContainer))
    }

    /// Get key with key IDs command, called by slave SAE
    /// eg `POST /api/v1/keys/{master SAE id}/dec_keys`
    /// # Arguments
    /// * `master_sae_id` - SAE ID of the master SAE, raw (percent-encoded by the client, not by the caller)
    /// * `key_ids` - Key IDs provided by the master SAE, UUID format (eg "550e8400-e29b-41d4-a716-446655440000")
    /// * `key_id_extensions` - Optional extension for each key ID, same length as `key_ids`
    /// * `key_ids_extension` - Optional extension for the whole request
    /// # Returns
    /// The response code, along with [Qkd014Data::KeyContainer] on 200 or [Qkd014Data::Error] otherwise
    /// # Errors
    /// An invalid request error if `key_id_extensions` length doesn't match `key_ids` one, nothing is sent in this case
    pub fn get_key_with_key_ids(
        &self,
        master_sae_id: &str,
        key_ids: Vec<String>,
        key_id_extensions: Option<Vec<Value>>,
        key_ids_extension: Option<Value>,
    ) -> Result<KmeReply, Qkd014Error> {
        let key_id_request = KeyIdRequest::new(key_ids, key_id_extensions, key_ids_extension)?;
        self.get_key_with_key_id_request(master_sae_id, &key_id_request)
    }

    /// Same as [get_key_with_key_ids](Self::get_key_with_key_ids), with parameters already gathered in a [KeyIdRequest]
    pub fn get_key_with_key_id_request(&self, master_sae_id: &str, key_id_request: &KeyIdRequest) -> Result<KmeReply, Qkd014Error> {
        let url = self.route_url(master_sae_id, "dec_keys")?;
        let body = key_id_request.to_request_body().to_json()?;
        debug!("Key IDs request body: {}", body);
        let response = self.transport.post(&url, &body)?;
        Self::log_schema_violation(decode_reply::<KeyContainer>(response, Qkd014Data::KeyContainer))
    }

    /// `https://{hostname}/api/v1/keys/{sae_id}/{route}`
    /// # Note
    /// The SAE ID is taken raw, not URL-encoded: it is percent-encoded here as a single path segment,
    /// so `%` itself is escaped. Empty, `.` and `..` IDs can't be sent as a path segment and are rejected
    fn route_url(&self, sae_id: &str, route: &str) -> Result<Url, Qkd014Error> {
        match sae_id {
            "" => return Err(Qkd014Error::InvalidRequest("SAE ID is empty".to_string())),
            "." | ".." => return Err(Qkd014Error::InvalidRequest(format!("SAE ID \"{}\" is a relative path segment", sae_id))),
            _ => {}
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Qkd014Error::config("KME URL cannot be a base"))?
            .pop_if_empty()
            .extend(API_ROOT_PATH_SEGMENTS)
            .push(sae_id)
            .push(route);
        Ok(url)
    }

    fn log_schema_violation(reply: Result<KmeReply, Qkd014Error>) -> Result<KmeReply, Qkd014Error> {
        if let Err(e @ Qkd014Error::SchemaViolation { .. }) = &reply {
            error!("Unexpected KME answer, check KME ETSI QKD 014 version: {}", e);
        }
        reply
    }
}

impl<T: KmeTransport> fmt::Display for Qkd014Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QKD014Client")?;
        writeln!(f, "\t KME : {}", self.config.kme_hostname())?;
        writeln!(f, "\t Client certificate : {}", self.config.cert_path())?;
        writeln!(f, "\t Client key : {}", self.config.key_path())?;
        writeln!(f, "\t Root CA for server : {}", self.config.ca_path())?;
        write!(f, "\t Force insecure : {}", self.config.force_insecure())
    }
}
