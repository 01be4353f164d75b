//! Builder pattern for client configuration.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use httpmocker::Client;
//!
//! # fn example() -> httpmocker::Result<()> {
//! let client = Client::builder()
//!     .host("mock.internal")
//!     .port(8443)
//!     .timeout(Duration::from_secs(5))
//!     .tls("/etc/mock/client.pem", "/etc/mock/client.key")
//!     .ca("/etc/mock/ca.pem")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::AdapterConfig;

use super::core::Client;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`].
///
/// Use [`Client::builder()`] to create one. Unset fields keep the
/// [`AdapterConfig`] defaults.
#[derive(Debug, Default, Clone)]
pub struct ClientBuilder {
    /// Base configuration.
    config: AdapterConfig,
    /// Sub-second timeouts are rejected at build time.
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the control server host.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the control server port.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the connect timeout, in whole seconds.
    #[inline]
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Connects over TLS with a client certificate and key.
    #[inline]
    #[must_use]
    pub fn tls(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.config.enable_ssl = true;
        self.config.ssl_cert = Some(cert.into());
        self.config.ssl_key = Some(key.into());
        self
    }

    /// Trusts an extra CA file when connecting over TLS.
    #[inline]
    #[must_use]
    pub fn ca(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ssl_ca = Some(path.into());
        self
    }

    /// Replaces every setting with `config`.
    #[inline]
    #[must_use]
    pub fn config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self.timeout = None;
        self
    }

    /// Validates the settings and builds the client.
    ///
    /// No connection is opened.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for an invalid host, port 0, a timeout under one
    ///   second, or missing TLS files
    pub fn build(self) -> Result<Client> {
        let mut config = self.config;

        if let Some(timeout) = self.timeout {
            if timeout.as_secs() == 0 {
                return Err(Error::config(format!(
                    "Connect timeout must be at least one second, got {timeout:?}"
                )));
            }
            config.timeout_secs = timeout.as_secs();
        }

        debug!(host = %config.host, port = config.port, tls = config.enable_ssl, "Building client");
        Ok(Client::from_boxed(config.into_adapter()?))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let client = ClientBuilder::new().build().expect("build");
        let endpoint = client.adapter().endpoint();
        assert_eq!(endpoint.authority(), "0.0.0.0:8080");
        assert_eq!(endpoint.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_host_port_timeout() {
        let client = Client::builder()
            .host("127.0.0.1")
            .port(9000)
            .timeout(Duration::from_secs(3))
            .build()
            .expect("build");

        let endpoint = client.adapter().endpoint();
        assert_eq!(endpoint.authority(), "127.0.0.1:9000");
        assert_eq!(endpoint.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_rejects_subsecond_timeout() {
        let err = Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_rejects_bad_host() {
        let err = Client::builder().host("not a host").build().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_tls_requires_existing_files() {
        let err = Client::builder()
            .tls("/nonexistent/client.pem", "/nonexistent/client.key")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_tls_builds_https_adapter() {
        let cert = NamedTempFile::new().expect("cert");
        let key = NamedTempFile::new().expect("key");

        let client = Client::builder()
            .host("127.0.0.1")
            .port(8443)
            .tls(cert.path(), key.path())
            .build()
            .expect("build");

        assert!(format!("{:?}", client.adapter()).starts_with("HttpsAdapter"));
    }

    #[test]
    fn test_config_replaces_settings() {
        let client = Client::builder()
            .port(1234)
            .timeout(Duration::from_secs(2))
            .config(AdapterConfig::new("127.0.0.1", 7000))
            .build()
            .expect("build");

        let endpoint = client.adapter().endpoint();
        assert_eq!(endpoint.port, 7000);
        assert_eq!(endpoint.timeout, Duration::from_secs(10));
    }
}
