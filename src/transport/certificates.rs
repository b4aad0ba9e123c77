use std::fs::File;
use std::io::BufReader;
use log::debug;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;
use crate::Qkd014Error;

/// Load a PEM certificate chain, at least one certificate is expected
pub(super) fn load_cert(filename: &str) -> Result<Vec<CertificateDer<'static>>, Qkd014Error> {
    let certfile = File::open(filename).map_err(|e| {
        Qkd014Error::Config(format!("Cannot open certificate file {}: {}", filename, e))
    })?;
    let mut reader = BufReader::new(certfile);
    let certs = rustls_pemfile::certs(&mut reader)
        .map(|cert| cert.map(|cert| cert.into_owned()))
        .collect::<Result<Vec<CertificateDer>, _>>()
        .map_err(|e| {
            Qkd014Error::Config(format!("Invalid PEM certificate file {}: {}", filename, e))
        })?;
    if certs.is_empty() {
        return Err(Qkd014Error::Config(format!("No certificate found in {}", filename)));
    }
    Ok(certs)
}

/// Load a PEM private key (PKCS#8, PKCS#1 or SEC1)
pub(super) fn load_pkey(filename: &str) -> Result<PrivateKeyDer<'static>, Qkd014Error> {
    let keyfile = File::open(filename).map_err(|e| {
        Qkd014Error::Config(format!("Cannot open private key file {}: {}", filename, e))
    })?;
    let mut reader = BufReader::new(keyfile);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| {
            Qkd014Error::Config(format!("Invalid PEM private key file {}: {}", filename, e))
        })?
        .ok_or_else(|| Qkd014Error::Config(format!("No private key found in {}", filename)))
}

/// Read a whole PEM file, after checking it contains what `check` expects
pub(super) fn read_checked_pem_file<T>(filename: &str, check: fn(&str) -> Result<T, Qkd014Error>) -> Result<(T, Vec<u8>), Qkd014Error> {
    let checked = check(filename)?;
    let pem = std::fs::read(filename).map_err(|e| {
        Qkd014Error::Config(format!("Cannot read file {}: {}", filename, e))
    })?;
    Ok((checked, pem))
}

/// Log the client certificate subject common name and serial number
/// # Errors
/// If the certificate isn't a valid X509 certificate
pub(super) fn log_client_certificate(cert: &CertificateDer) -> Result<(), Qkd014Error> {
    let (_, cert) = X509Certificate::from_der(cert.as_ref()).map_err(|e| {
        Qkd014Error::Config(format!("Invalid client certificate: {}", e))
    })?;
    let common_name = cert.subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .unwrap_or("<no common name>");
    debug!("Client certificate: CN={}, serial={}", common_name, cert.raw_serial_as_string());
    Ok(())
}
