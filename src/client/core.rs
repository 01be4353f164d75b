//! Control session entry point.
//!
//! A [`Client`] owns one transport adapter. Apps created from it borrow the
//! adapter's connection; the client is the only thing that closes it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::mock::App;
use crate::transport::{Adapter, Connection, DEFAULT_HOST, DEFAULT_PORT, HttpAdapter};

use super::builder::ClientBuilder;
use super::options::AppOptions;

// ============================================================================
// Client
// ============================================================================

/// Session with a mock control server.
///
/// # Example
///
/// ```no_run
/// use httpmocker::{AppOptions, Client, Result};
///
/// # async fn example() -> Result<()> {
/// let mut client = Client::builder().host("127.0.0.1").port(8080).build()?;
///
/// let status = client
///     .session(async |client: &Client| -> Result<serde_json::Value> {
///         let mut app = client.app("sanic", 9001, AppOptions::new())?;
///         app.start().await?;
///         let status = app.status().await?;
///         app.stop().await?;
///         Ok(status)
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    /// Transport to the control server.
    adapter: Box<dyn Adapter>,
}

impl Default for Client {
    /// Plain adapter to `0.0.0.0:8080`.
    fn default() -> Self {
        Self::new(HttpAdapter::new(DEFAULT_HOST, DEFAULT_PORT))
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("adapter", &self.adapter)
            .finish()
    }
}

// ============================================================================
// Client - Construction
// ============================================================================

impl Client {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client over `adapter`.
    #[inline]
    #[must_use]
    pub fn new(adapter: impl Adapter + 'static) -> Self {
        Self::from_boxed(Box::new(adapter))
    }

    /// Creates a client over an already boxed adapter.
    #[inline]
    #[must_use]
    pub fn from_boxed(adapter: Box<dyn Adapter>) -> Self {
        Self { adapter }
    }

    /// Returns the adapter.
    #[inline]
    #[must_use]
    pub fn adapter(&self) -> &dyn Adapter {
        &*self.adapter
    }

    /// Returns `true` while the adapter holds a connection.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.adapter.is_connected()
    }
}

// ============================================================================
// Client - Connection
// ============================================================================

impl Client {
    /// Connects the adapter.
    ///
    /// # Errors
    ///
    /// Connection errors from the adapter.
    pub async fn connect(&mut self) -> Result<Connection> {
        self.adapter.connect().await
    }

    /// Disconnects the adapter. A no-op when not connected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the close fails.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.adapter.disconnect().await
    }

    /// Runs `f` inside a connected session.
    ///
    /// Connects, awaits `f`, then disconnects exactly once whatever `f`
    /// returned. An error from `f` wins over a disconnect error, which is
    /// then only logged. If connecting fails, `f` is not run.
    ///
    /// # Errors
    ///
    /// The connect error, the error of `f`, or the disconnect error.
    pub async fn session<T, F>(&mut self, f: F) -> Result<T>
    where
        F: AsyncFnOnce(&Client) -> Result<T>,
    {
        self.connect().await?;
        debug!(endpoint = %self.adapter.endpoint(), "Session opened");

        let outcome = f(&*self).await;
        let closed = self.disconnect().await;

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!(error = %close_err, "Disconnect after failed session also failed");
                Err(e)
            }
        }
    }
}

// ============================================================================
// Client - Apps
// ============================================================================

impl Client {
    /// Creates a stopped [`App`] bound to the live connection.
    ///
    /// No request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the client is not connected.
    pub fn app(&self, name: impl Into<String>, port: u16, options: AppOptions) -> Result<App> {
        let conn = self.adapter.conn().ok_or(Error::NotConnected)?;
        Ok(App::new(name, port, options, conn.clone()))
    }
}

// ============================================================================
// Tests
// ============================================================================
