//! Configuration module, contains the connection parameters for one KME and the JSON configuration file format

use std::time::Duration;
use serde::{Deserialize, Serialize};
use url::Url;
use crate::{Qkd014Error, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Identity and trust material used to reach one KME
/// # Note
/// Validated at construction and never mutated afterwards, so it can be shared between threads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Hostname or IP address of the KME, optionally followed by `:port`
    kme_hostname: String,
    /// Path to the SAE client certificate, PEM format
    cert_path: String,
    /// Path to the private key associated to the client certificate, PEM format
    key_path: String,
    /// Path to the root CA used to check the KME server certificate, PEM format
    ca_path: String,
    /// If true, the KME server certificate is not checked at all
    force_insecure: bool,
    request_timeout: Duration,
}

impl ConnectionConfig {
    /// Create a new connection configuration
    /// # Arguments
    /// * `kme_hostname` - Hostname or IP address of the KME, eg "localhost:3000"
    /// * `cert_path` - Path to the SAE client certificate
    /// * `key_path` - Path to the SAE client private key
    /// * `ca_path` - Path to the root CA certificate of the KME, may be empty only if `force_insecure` is set
    /// * `force_insecure` - Disable KME server certificate verification, this breaks the whole protocol security
    /// # Errors
    /// A configuration error if a required parameter is empty or the hostname is not usable in an URL
    pub fn new(kme_hostname: &str, cert_path: &str, key_path: &str, ca_path: &str, force_insecure: bool) -> Result<Self, Qkd014Error> {
        let kme_hostname = kme_hostname.trim();
        if kme_hostname.is_empty() {
            return Err(Qkd014Error::config("KME hostname is empty"));
        }
        if cert_path.is_empty() {
            return Err(Qkd014Error::config("Client certificate path is empty"));
        }
        if key_path.is_empty() {
            return Err(Qkd014Error::config("Client private key path is empty"));
        }
        if ca_path.is_empty() && !force_insecure {
            return Err(Qkd014Error::config("Root CA path is empty, it is required unless insecure mode is forced"));
        }
        let config = Self {
            kme_hostname: kme_hostname.to_string(),
            cert_path: cert_path.to_string(),
            key_path: key_path.to_string(),
            ca_path: ca_path.to_string(),
            force_insecure,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };
        config.base_url()?;
        Ok(config)
    }

    /// Override the default request timeout
    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// KME root URL, ie `https://{hostname}/`
    /// # Errors
    /// If the hostname contains something else than a host and an optional port
    pub fn base_url(&self) -> Result<Url, Qkd014Error> {
        let url = Url::parse(&format!("https://{}/", self.kme_hostname)).map_err(|e| {
            Qkd014Error::Config(format!("Invalid KME hostname {:?}: {}", self.kme_hostname, e))
        })?;
        if url.host_str().is_none() || url.path() != "/" || url.query().is_some() || url.fragment().is_some() || !url.username().is_empty() {
            return Err(Qkd014Error::Config(format!("Invalid KME hostname {:?}: expected host[:port]", self.kme_hostname)));
        }
        Ok(url)
    }

    pub fn kme_hostname(&self) -> &str {
        &self.kme_hostname
    }

    pub fn cert_path(&self) -> &str {
        &self.cert_path
    }

    pub fn key_path(&self) -> &str {
        &self.key_path
    }

    pub fn ca_path(&self) -> &str {
        &self.ca_path
    }

    pub fn force_insecure(&self) -> bool {
        self.force_insecure
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Whole client configuration file, to be extracted from JSON
#[derive(Serialize, Deserialize, Debug)]
pub struct ConfigFile {
    #[serde(rename = "etsi_qkd_014_client")]
    pub client_config: ClientConfigSection,
}

/// Connection parameters section of the configuration file
#[derive(Serialize, Deserialize, Debug)]
pub struct ClientConfigSection {
    /// Hostname or IP address of the KME
    pub hostname: String,
    /// Path to the SAE client certificate
    pub cert: String,
    /// Path to the SAE client private key
    pub key: String,
    /// Path to the KME root CA certificate
    pub ca: String,
    /// Disable KME server certificate verification
    pub force: bool,
    /// Request timeout in seconds, default is [DEFAULT_REQUEST_TIMEOUT_SECS](crate::DEFAULT_REQUEST_TIMEOUT_SECS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Extract configuration from JSON file
    pub fn from_json_path(json_config_file_path: &str) -> Result<Self, Qkd014Error> {
        let json = std::fs::read_to_string(json_config_file_path).map_err(|e| {
            Qkd014Error::Config(format!("Error reading configuration file {}: {}", json_config_file_path, e))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            Qkd014Error::Config(format!("Error deserializing configuration file {}: {}", json_config_file_path, e))
        })
    }

    /// Validate the file content and turn it into connection parameters
    pub fn to_connection_config(&self) -> Result<ConnectionConfig, Qkd014Error> {
        let section = &self.client_config;
        let config = ConnectionConfig::new(&section.hostname, &section.cert, &section.key, &section.ca, section.force)?;
        Ok(match section.timeout_secs {
            Some(timeout_secs) => config.with_timeout(Duration::from_secs(timeout_secs)),
            None => config,
        })
    }
}
