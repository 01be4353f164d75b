//! HTTP transport layer.
//!
//! This module owns the network connection between the client and the mock
//! control server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Client / App   │                              │  Mock server    │
//! │                 │        HTTP/1.1 (TLS)        │  control API    │
//! │  Adapter        │◄────────────────────────────►│                 │
//! │  → Connection   │        host:PORT             │  /mock/app/...  │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Adapter::connect` - TCP connect, optional TLS, HTTP handshake
//! 2. `Connection::exchange` - One request, one fully-read response
//! 3. `Adapter::disconnect` - Close the link; every clone sees it closed
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | Serializable adapter configuration |
//! | `connection` | Connection and exchange primitive |
//! | `http` | Plain TCP adapter |
//! | `tls` | TLS adapter with client certificate |

// ============================================================================
// Submodules
// ============================================================================

/// Adapter configuration.
pub mod config;

/// HTTP/1.1 connection and exchange primitive.
pub mod connection;

/// Plain TCP adapter.
pub mod http;

/// TLS adapter.
pub mod tls;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::AdapterConfig;
pub use connection::Connection;
pub use http::HttpAdapter;
pub use tls::{HttpsAdapter, TlsFiles};

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Connect-phase timeout applied to every adapter (10s).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Host the mock server binds and clients dial by default.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default control server port.
pub const DEFAULT_PORT: u16 = 8080;

// ============================================================================
// Adapter
// ============================================================================

/// Capability set shared by every transport adapter.
///
/// An adapter owns at most one live [`Connection`]. Higher-level handles
/// hold clones of it and never close it themselves.
#[async_trait]
pub trait Adapter: fmt::Debug + Send + Sync {
    /// Returns the endpoint this adapter dials.
    fn endpoint(&self) -> &Endpoint;

    /// Opens the connection, or returns the live one if already connected.
    ///
    /// # Errors
    ///
    /// - [`Error::Connect`] if the transport cannot be established
    /// - [`Error::ConnectTimeout`] if the connect phase exceeds the timeout
    /// - [`Error::Tls`] if TLS material cannot be loaded
    async fn connect(&mut self) -> Result<Connection>;

    /// Closes the connection. A no-op when not connected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the close itself fails.
    async fn disconnect(&mut self) -> Result<()>;

    /// Returns the live connection, if any.
    fn conn(&self) -> Option<&Connection>;

    /// Returns `true` while a connection is held.
    fn is_connected(&self) -> bool {
        self.conn().is_some()
    }
}

#[async_trait]
impl<A: Adapter + ?Sized> Adapter for Box<A> {
    fn endpoint(&self) -> &Endpoint {
        (**self).endpoint()
    }

    async fn connect(&mut self) -> Result<Connection> {
        (**self).connect().await
    }

    async fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect().await
    }

    fn conn(&self) -> Option<&Connection> {
        (**self).conn()
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// Address and connect timeout of a control endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Connect-phase timeout.
    pub timeout: Duration,
}

impl Endpoint {
    /// Creates an endpoint with the default 10s timeout.
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns `host:port`, bracketing IPv6 literals.
    #[must_use]
    pub fn authority(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Opens a TCP stream to the endpoint.
    pub(crate) async fn dial(&self) -> Result<TcpStream> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        let stream = TcpStream::connect((host, self.port))
            .await
            .map_err(|e| Error::connect(format!("Could not connect to {}: {e}", self.authority())))?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    /// Runs a connect-phase future under the endpoint timeout.
    pub(crate) async fn within<T>(&self, future: impl Future<Output = Result<T>>) -> Result<T> {
        timeout(self.timeout, future)
            .await
            .map_err(|_| Error::connect_timeout(self.timeout.as_millis() as u64))?
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority())
    }
}

// ============================================================================
// Shared Adapter Plumbing
// ============================================================================

/// Closes and clears the connection held in `slot`.
pub(crate) async fn release(slot: &mut Option<Connection>, endpoint: &Endpoint) -> Result<()> {
    let Some(conn) = slot.take() else {
        debug!(endpoint = %endpoint, "Disconnect on idle adapter, nothing to close");
        return Ok(());
    };

    conn.close(endpoint.timeout).await?;
    info!(host = %endpoint.host, port = endpoint.port, "Disconnected from control server");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
