//! Serializable adapter configuration.
//!
//! # Format
//!
//! ```json
//! {
//!   "host": "0.0.0.0",
//!   "port": 8080,
//!   "timeout_secs": 10,
//!   "enable_ssl": true,
//!   "ssl_cert": "/etc/mock/client.pem",
//!   "ssl_key": "/etc/mock/client.key",
//!   "ssl_ca": "/etc/mock/ca.pem"
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults shown by
//! [`AdapterConfig::default`].

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::{
    Adapter, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT, Endpoint, HttpAdapter,
    HttpsAdapter, TlsFiles,
};

// ============================================================================
// AdapterConfig
// ============================================================================

/// Connection settings for a control endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Host name or IP address.
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Connect-phase timeout in seconds.
    pub timeout_secs: u64,

    /// Use TLS.
    pub enable_ssl: bool,

    /// Client certificate chain (PEM), required with TLS.
    pub ssl_cert: Option<PathBuf>,

    /// Client private key (PEM), required with TLS.
    pub ssl_key: Option<PathBuf>,

    /// Extra CA certificates to trust (PEM).
    pub ssl_ca: Option<PathBuf>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            enable_ssl: false,
            ssl_cert: None,
            ssl_key: None,
            ssl_ca: None,
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl AdapterConfig {
    /// Creates a plain configuration for `host:port`.
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the text is not a valid configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read
    /// - [`Error::Json`] if the contents are not a valid configuration
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "Loaded adapter config");
        Self::from_json_str(&text)
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl AdapterConfig {
    /// Returns the connect timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the endpoint described by this configuration.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port).with_timeout(self.timeout())
    }
}

// ============================================================================
// Validation
// ============================================================================

impl AdapterConfig {
    /// Checks the configuration without touching the network.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for an unparsable host, port 0, zero timeout,
    ///   or TLS enabled without an existing certificate and key
    pub fn validate(&self) -> Result<()> {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        url::Host::parse(&host)
            .map_err(|e| Error::config(format!("Invalid host {:?}: {e}", self.host)))?;

        if self.port == 0 {
            return Err(Error::config("Port must be nonzero"));
        }

        if self.timeout_secs == 0 {
            return Err(Error::config("Connect timeout must be at least one second"));
        }

        if self.enable_ssl {
            for (field, path) in [("ssl_cert", &self.ssl_cert), ("ssl_key", &self.ssl_key)] {
                let path = path.as_ref().ok_or_else(|| {
                    Error::config(format!("{field} is required when enable_ssl is set"))
                })?;
                if !path.exists() {
                    return Err(Error::config(format!(
                        "{field} not found at: {}",
                        path.display()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validates and builds the matching adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if validation fails.
    pub fn into_adapter(self) -> Result<Box<dyn Adapter>> {
        self.validate()?;
        let endpoint = self.endpoint();

        match (self.enable_ssl, self.ssl_cert, self.ssl_key) {
            (true, Some(cert), Some(key)) => {
                let mut files = TlsFiles::new(cert, key);
                if let Some(ca) = self.ssl_ca {
                    files = files.with_ca(ca);
                }
                Ok(Box::new(HttpsAdapter::from_parts(endpoint, files)))
            }
            _ => Ok(Box::new(HttpAdapter::from_endpoint(endpoint))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
