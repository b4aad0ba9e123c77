//! Mutually authenticated HTTPS transport, on top of reqwest blocking client and RusTLS

use log::{error, info, warn};
use reqwest::blocking::{Client, RequestBuilder};
use url::Url;
use crate::config::ConnectionConfig;
use crate::transport::certificates::{load_cert, load_pkey, log_client_certificate, read_checked_pem_file};
use crate::transport::{KmeTransport, RawResponse};
use crate::Qkd014Error;

/// HTTPS transport presenting the SAE client certificate on every request
/// # Note
/// * The KME server certificate must be signed by the configured root CA, system root certificates are not trusted
/// * If insecure mode is forced, the KME server certificate is not checked at all
#[derive(Debug, Clone)]
pub struct MutualTlsTransport {
    client: Client,
}

impl MutualTlsTransport {
    /// Build the transport from the connection parameters
    /// # Errors
    /// A configuration error if the certificate, private key or root CA file can't be used
    pub fn new(config: &ConnectionConfig) -> Result<Self, Qkd014Error> {
        let identity = Self::load_client_identity(config.cert_path(), config.key_path())?;

        let client_builder = Client::builder()
            .use_rustls_tls()
            .identity(identity)
            .timeout(config.request_timeout());

        let client_builder = if config.force_insecure() {
            warn!("Insecure mode is forced, KME server certificate check is disabled. This is a dangerous setting, it breaks the whole protocol security");
            client_builder.danger_accept_invalid_certs(true)
        } else {
            info!("KME server certificate will be checked against root CA {}", config.ca_path());
            let (_, ca_pem) = read_checked_pem_file(config.ca_path(), load_cert)?;
            let ca_cert = reqwest::Certificate::from_pem(&ca_pem).map_err(|e| {
                Qkd014Error::Config(format!("Invalid root CA certificate {}: {}", config.ca_path(), e))
            })?;
            client_builder
                .tls_built_in_root_certs(false)
                .add_root_certificate(ca_cert)
        };

        let client = client_builder.build().map_err(|e| {
            Qkd014Error::Config(format!("Error building HTTPS client: {}", e))
        })?;
        Ok(Self { client })
    }

    /// Client certificate chain and private key, as a reqwest identity
    fn load_client_identity(cert_path: &str, key_path: &str) -> Result<reqwest::Identity, Qkd014Error> {
        let (client_certs, cert_pem) = read_checked_pem_file(cert_path, load_cert)?;
        log_client_certificate(&client_certs[0])?;
        let (_, key_pem) = read_checked_pem_file(key_path, load_pkey)?;

        let mut identity_pem = key_pem;
        if !identity_pem.ends_with(b"\n") {
            identity_pem.push(b'\n');
        }
        identity_pem.extend_from_slice(&cert_pem);
        reqwest::Identity::from_pem(&identity_pem).map_err(|e| {
            Qkd014Error::Config(format!("Cannot create client certificate identity: {}", e))
        })
    }

    fn send(request: RequestBuilder, method: &str, url: &Url) -> Result<RawResponse, Qkd014Error> {
        info!("{} {}", method, url);
        let response = request.send().map_err(|http_error| {
            error!("Error sending HTTP request to KME: {}", http_error);
            Qkd014Error::from(http_error)
        })?;
        let status_code = response.status().as_u16();
        let body = response.text().map_err(|http_error| {
            error!("Error reading KME response body: {}", http_error);
            Qkd014Error::from(http_error)
        })?;
        info!("KME answered {} to {} {}", status_code, method, url);
        Ok(RawResponse {
            status_code,
            body,
        })
    }
}

impl KmeTransport for MutualTlsTransport {
    fn get(&self, url: &Url) -> Result<RawResponse, Qkd014Error> {
        Self::send(self.client.get(url.clone()), "GET", url)
    }

    fn post(&self, url: &Url, json_body: &serde_json::Value) -> Result<RawResponse, Qkd014Error> {
        Self::send(self.client.post(url.clone()).json(json_body), "POST", url)
    }
}
