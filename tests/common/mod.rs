#![allow(dead_code)]

pub mod util;

use std::convert::Infallible;
use std::fs::File;
use std::io::BufReader;
use std::sync::{Arc, Mutex};
use std::thread;
use const_format::concatcp;
use etsi_qkd_014_client::{ConnectionConfig, Qkd014Client};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio_rustls::TlsAcceptor;

pub const CERTS_DIR: &'static str = "certs";
pub const CA_CERT_PATH: &'static str = concatcp!(CERTS_DIR, "/CA-zone1.crt");
pub const ROGUE_CA_CERT_PATH: &'static str = concatcp!(CERTS_DIR, "/CA-rogue.crt");
pub const KME_CERT_PATH: &'static str = concatcp!(CERTS_DIR, "/kme1.crt");
pub const KME_KEY_PATH: &'static str = concatcp!(CERTS_DIR, "/kme1.key");
pub const SAE_CERT_PATH: &'static str = concatcp!(CERTS_DIR, "/sae1.crt");
pub const SAE_KEY_PATH: &'static str = concatcp!(CERTS_DIR, "/sae1.key");

/// Request received by the mock KME
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
    /// The SAE presented a client certificate signed by the KME CA
    pub client_authenticated: bool,
}

impl ReceivedRequest {
    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Status code and JSON body the mock KME answers to a request
pub type MockAnswer = fn(&ReceivedRequest) -> (u16, String);

/// Mutually authenticated HTTPS KME, answering on 127.0.0.1 on a random port
pub struct MockKme {
    pub port: u16,
    received_requests: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl MockKme {
    /// Launch the mock KME in a separate thread, with its own tokio runtime
    pub fn launch(answer: MockAnswer) -> Self {
        let received_requests = Arc::new(Mutex::new(Vec::new()));
        let (port_tx, port_rx) = std::sync::mpsc::channel();
        let server_received_requests = Arc::clone(&received_requests);

        thread::spawn(move || {
            let rt = Runtime::new().unwrap();
            rt.block_on(async move {
                let tls_acceptor = TlsAcceptor::from(Arc::new(get_ssl_config()));
                let socket = TcpListener::bind("127.0.0.1:0").await.unwrap();
                port_tx.send(socket.local_addr().unwrap().port()).unwrap();

                loop {
                    let Ok((tcp_stream, _)) = socket.accept().await else {
                        continue;
                    };
                    let tls_acceptor = tls_acceptor.clone();
                    let received_requests = Arc::clone(&server_received_requests);

                    tokio::task::spawn(async move {
                        // Fails if the client has no certificate signed by the CA
                        let Ok(stream) = tls_acceptor.accept(tcp_stream).await else {
                            return;
                        };
                        let client_authenticated = stream.get_ref().1.peer_certificates().map_or(false, |certs| !certs.is_empty());
                        let io = TokioIo::new(stream);

                        let response_service = service_fn(move |req: Request<Incoming>| {
                            let received_requests = Arc::clone(&received_requests);
                            async move {
                                let method = req.method().to_string();
                                let path = req.uri().path().to_string();
                                let content_type = req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(String::from);
                                let body = match req.into_body().collect().await {
                                    Ok(bytes) => String::from_utf8_lossy(&bytes.to_bytes()).to_string(),
                                    Err(_) => String::new(),
                                };
                                let request = ReceivedRequest {
                                    method,
                                    path,
                                    content_type,
                                    body,
                                    client_authenticated,
                                };
                                let (status_code, response_body) = answer(&request);
                                received_requests.lock().unwrap().push(request);
                                Ok::<_, Infallible>(Response::builder()
                                    .status(status_code)
                                    .header(CONTENT_TYPE, "application/json")
                                    .body(Full::new(Bytes::from(response_body)))
                                    .unwrap())
                            }
                        });
                        let _ = http1::Builder::new().serve_connection(io, response_service).await;
                    });
                }
            });
        });

        let port = port_rx.recv().unwrap();
        Self {
            port,
            received_requests,
        }
    }

    pub fn hostname(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    pub fn received_requests(&self) -> Vec<ReceivedRequest> {
        self.received_requests.lock().unwrap().clone()
    }
}

/// Client trusting the KME CA
pub fn setup_client(kme: &MockKme) -> Qkd014Client {
    let config = ConnectionConfig::new(&kme.hostname(), SAE_CERT_PATH, SAE_KEY_PATH, CA_CERT_PATH, false).unwrap();
    Qkd014Client::new(config).unwrap()
}

fn get_ssl_config() -> ServerConfig {
    let _ = rustls::crypto::ring::default_provider().install_default();

    // Trusted CA for client certificates
    let mut roots = RootCertStore::empty();
    roots.add(load_cert(CA_CERT_PATH).remove(0)).unwrap();
    let client_verifier = WebPkiClientVerifier::builder(roots.into()).build().unwrap();

    ServerConfig::builder()
        .with_client_cert_verifier(client_verifier)
        .with_single_cert(load_cert(KME_CERT_PATH), load_pkey(KME_KEY_PATH))
        .unwrap()
}

fn load_cert(filename: &str) -> Vec<CertificateDer<'static>> {
    let mut reader = BufReader::new(File::open(filename).unwrap());
    rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn load_pkey(filename: &str) -> PrivateKeyDer<'static> {
    let mut reader = BufReader::new(File::open(filename).unwrap());
    rustls_pemfile::private_key(&mut reader).unwrap().unwrap()
}
