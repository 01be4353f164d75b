//! Per-application and per-handler options.
//!
//! # Example
//!
//! ```ignore
//! use httpmocker::{AppOptions, HandlerOptions, HttpAdapter};
//!
//! let options = AppOptions::new()
//!     .with_ssl(true)
//!     .with_ssl_cert("/etc/mock/server.pem")
//!     .with_ssl_key("/etc/mock/server.key");
//!
//! let handler_options = HandlerOptions::new()
//!     .with_adapter(HttpAdapter::new("127.0.0.1", 9001));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;

use serde_json::Value;

use crate::transport::Adapter;

// ============================================================================
// AppOptions
// ============================================================================

/// How a mock application should be served.
///
/// The certificate paths are forwarded to the control server, which reads
/// them on its side; they are not opened locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppOptions {
    /// Serve the application over TLS.
    pub enable_ssl: bool,

    /// Server certificate for the application.
    pub ssl_cert: Option<PathBuf>,

    /// Server private key for the application.
    pub ssl_key: Option<PathBuf>,
}

// ============================================================================
// Constructors
// ============================================================================

impl AppOptions {
    /// Creates plain-HTTP options.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enable_ssl: false,
            ssl_cert: None,
            ssl_key: None,
        }
    }

    /// Creates TLS options with the given certificate and key.
    #[inline]
    #[must_use]
    pub fn ssl(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        Self {
            enable_ssl: true,
            ssl_cert: Some(cert.into()),
            ssl_key: Some(key.into()),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl AppOptions {
    /// Turns TLS on or off.
    #[inline]
    #[must_use]
    pub fn with_ssl(mut self, enable: bool) -> Self {
        self.enable_ssl = enable;
        self
    }

    /// Sets the server certificate path.
    #[inline]
    #[must_use]
    pub fn with_ssl_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssl_cert = Some(path.into());
        self
    }

    /// Sets the server key path.
    #[inline]
    #[must_use]
    pub fn with_ssl_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssl_key = Some(path.into());
        self
    }
}

// ============================================================================
// Wire Conversion
// ============================================================================

impl AppOptions {
    /// Returns the certificate path as a JSON value, `null` when unset.
    #[must_use]
    pub(crate) fn ssl_cert_value(&self) -> Value {
        path_value(self.ssl_cert.as_ref())
    }

    /// Returns the key path as a JSON value, `null` when unset.
    #[must_use]
    pub(crate) fn ssl_key_value(&self) -> Value {
        path_value(self.ssl_key.as_ref())
    }
}

fn path_value(path: Option<&PathBuf>) -> Value {
    path.map_or(Value::Null, |p| {
        Value::String(p.to_string_lossy().into_owned())
    })
}

// ============================================================================
// HandlerOptions
// ============================================================================

/// How a handler reaches its application.
///
/// Without an adapter the handler dials `0.0.0.0` on the application port.
#[derive(Debug, Default)]
pub struct HandlerOptions {
    /// Adapter the handler takes ownership of.
    pub adapter: Option<Box<dyn Adapter>>,
}

impl HandlerOptions {
    /// Creates options that use the default adapter.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `adapter` instead of the default one.
    ///
    /// An adapter that is already connected keeps its connection.
    #[inline]
    #[must_use]
    pub fn with_adapter(mut self, adapter: impl Adapter + 'static) -> Self {
        self.adapter = Some(Box::new(adapter));
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::transport::HttpAdapter;

    #[test]
    fn test_default_is_plain() {
        let options = AppOptions::default();
        assert_eq!(options, AppOptions::new());
        assert!(!options.enable_ssl);
        assert_eq!(options.ssl_cert_value(), Value::Null);
        assert_eq!(options.ssl_key_value(), Value::Null);
    }

    #[test]
    fn test_ssl_constructor() {
        let options = AppOptions::ssl("/certs/app.pem", "/certs/app.key");
        assert!(options.enable_ssl);
        assert_eq!(options.ssl_cert_value(), Value::from("/certs/app.pem"));
        assert_eq!(options.ssl_key_value(), Value::from("/certs/app.key"));
    }

    #[test]
    fn test_builder_methods() {
        let options = AppOptions::new().with_ssl(true).with_ssl_cert("c.pem");
        assert!(options.enable_ssl);
        assert_eq!(options.ssl_cert, Some(PathBuf::from("c.pem")));
        assert!(options.ssl_key.is_none());
    }

    #[test]
    fn test_handler_options_adapter() {
        assert!(HandlerOptions::new().adapter.is_none());

        let options = HandlerOptions::new().with_adapter(HttpAdapter::new("127.0.0.1", 9001));
        let adapter = options.adapter.expect("adapter");
        assert_eq!(adapter.endpoint().port, 9001);
    }
}
