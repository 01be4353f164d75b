//! TLS adapter with client certificate.
//!
//! The adapter presents a client certificate chain and private key loaded
//! from PEM files. Server certificates are verified against the bundled web
//! PKI roots plus an optional extra CA file, which is how self-signed mock
//! servers are trusted.

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::connection::{Dialer, Link};
use super::{Adapter, Connection, Endpoint, release};

// ============================================================================
// TlsFiles
// ============================================================================

/// PEM files used to secure a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    /// Client certificate chain.
    pub cert: PathBuf,
    /// Client private key.
    pub key: PathBuf,
    /// Extra CA certificates to trust.
    pub ca: Option<PathBuf>,
}

impl TlsFiles {
    /// Creates TLS material from a certificate and key path.
    #[inline]
    #[must_use]
    pub fn new(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        Self {
            cert: cert.into(),
            key: key.into(),
            ca: None,
        }
    }

    /// Trusts the CA certificates in `path` in addition to the web PKI roots.
    #[inline]
    #[must_use]
    pub fn with_ca(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca = Some(path.into());
        self
    }

    /// Reads the files and builds a rustls client configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Tls`] if a file is missing, empty or not valid PEM
    pub fn client_config(&self) -> Result<ClientConfig> {
        let cert_pem = read_pem(&self.cert)?;
        let key_pem = read_pem(&self.key)?;

        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        if let Some(ca) = &self.ca {
            for cert in parse_certs(&read_pem(ca)?, ca)? {
                roots
                    .add(cert)
                    .map_err(|e| Error::tls(format!("{}: {e}", ca.display())))?;
            }
        }

        let certs = parse_certs(&cert_pem, &self.cert)?;
        let key = PrivateKeyDer::from_pem_slice(&key_pem)
            .map_err(|e| Error::tls(format!("{}: {e}", self.key.display())))?;

        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(|e| Error::tls(e.to_string()))?
            .with_root_certificates(roots)
            .with_client_auth_cert(certs, key)
            .map_err(|e| Error::tls(e.to_string()))
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::tls(format!("{}: {e}", path.display())))
}

fn parse_certs(pem: &[u8], path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let certs = CertificateDer::pem_slice_iter(pem)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::tls(format!("{}: {e}", path.display())))?;

    if certs.is_empty() {
        return Err(Error::tls(format!("{}: no certificates found", path.display())));
    }
    Ok(certs)
}

// ============================================================================
// HttpsAdapter
// ============================================================================

/// Adapter speaking HTTP/1.1 over TLS.
#[derive(Debug)]
pub struct HttpsAdapter {
    /// Where to dial.
    endpoint: Endpoint,
    /// Certificate material.
    files: TlsFiles,
    /// Live connection.
    conn: Option<Connection>,
}

impl HttpsAdapter {
    /// Creates a TLS adapter for `host:port` with the default 10s timeout.
    #[inline]
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        cert: impl Into<PathBuf>,
        key: impl Into<PathBuf>,
    ) -> Self {
        Self::from_parts(Endpoint::new(host, port), TlsFiles::new(cert, key))
    }

    /// Creates a TLS adapter from a prepared endpoint and TLS files.
    #[inline]
    #[must_use]
    pub fn from_parts(endpoint: Endpoint, files: TlsFiles) -> Self {
        Self {
            endpoint,
            files,
            conn: None,
        }
    }

    /// Trusts the CA certificates in `path`.
    #[inline]
    #[must_use]
    pub fn with_ca(mut self, path: impl Into<PathBuf>) -> Self {
        self.files = self.files.with_ca(path);
        self
    }

    /// Returns the certificate material.
    #[inline]
    #[must_use]
    pub fn files(&self) -> &TlsFiles {
        &self.files
    }

    /// Builds the dialer that opens a TLS link to the endpoint.
    fn dialer(&self) -> Result<Dialer> {
        let connector = TlsConnector::from(Arc::new(self.files.client_config()?));
        let host = self.endpoint.host.trim_start_matches('[').trim_end_matches(']');
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| Error::invalid_argument(format!("{host}: {e}")))?;
        let endpoint = self.endpoint.clone();

        Ok(Arc::new(move || {
            let endpoint = endpoint.clone();
            let connector = connector.clone();
            let server_name = server_name.clone();
            async move {
                endpoint
                    .within(async {
                        let stream = endpoint.dial().await?;
                        let stream = connector
                            .connect(server_name.clone(), stream)
                            .await
                            .map_err(|e| {
                                Error::connect(format!(
                                    "TLS handshake with {} failed: {e}",
                                    endpoint.authority()
                                ))
                            })?;
                        debug!(endpoint = %endpoint, "TLS session established");
                        Link::handshake(stream, endpoint.authority()).await
                    })
                    .await
            }
            .boxed()
        }))
    }
}

#[async_trait]
impl Adapter for HttpsAdapter {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn connect(&mut self) -> Result<Connection> {
        if let Some(conn) = &self.conn {
            debug!(endpoint = %self.endpoint, "Already connected, reusing connection");
            return Ok(conn.clone());
        }

        let conn = Connection::open(self.endpoint.authority(), self.dialer()?).await?;
        info!(
            host = %self.endpoint.host,
            port = self.endpoint.port,
            cert = %self.files.cert.display(),
            "Connected to control server over TLS"
        );

        self.conn = Some(conn.clone());
        Ok(conn)
    }

    async fn disconnect(&mut self) -> Result<()> {
        release(&mut self.conn, &self.endpoint).await
    }

    fn conn(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    fn temp_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_missing_cert_file() {
        let files = TlsFiles::new("/nonexistent/cert.pem", "/nonexistent/key.pem");
        let err = files.client_config().unwrap_err();
        assert!(matches!(err, Error::Tls { .. }));
        assert!(err.to_string().contains("cert.pem"));
    }

    #[test]
    fn test_cert_file_without_certificates() {
        let cert = temp_file("not a pem file\n");
        let key = temp_file("not a key either\n");

        let err = TlsFiles::new(cert.path(), key.path())
            .client_config()
            .unwrap_err();
        assert!(matches!(err, Error::Tls { .. }));
        assert!(err.to_string().contains("no certificates found"));
    }

    #[test]
    fn test_with_ca_sets_path() {
        let files = TlsFiles::new("cert.pem", "key.pem").with_ca("ca.pem");
        assert_eq!(files.ca, Some(PathBuf::from("ca.pem")));
    }

    #[tokio::test]
    async fn test_connect_with_bad_material_fails_before_dialing() {
        let mut adapter =
            HttpsAdapter::new("127.0.0.1", 1, "/nonexistent/c.pem", "/nonexistent/k.pem");
        let err = adapter.connect().await.unwrap_err();
        assert!(matches!(err, Error::Tls { .. }));
        assert!(!adapter.is_connected());
    }
}
