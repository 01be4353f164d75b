//! Plain TCP adapter.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{debug, info};

use crate::error::Result;

use super::connection::{Dialer, Link};
use super::{Adapter, Connection, Endpoint, release};

// ============================================================================
// HttpAdapter
// ============================================================================

/// Adapter speaking plain HTTP/1.1 over TCP.
///
/// # Example
///
/// ```no_run
/// use httpmocker::transport::{Adapter, HttpAdapter};
///
/// # async fn example() -> httpmocker::Result<()> {
/// let mut adapter = HttpAdapter::new("0.0.0.0", 8080);
/// let conn = adapter.connect().await?;
/// println!("connected to {}", conn.authority());
/// adapter.disconnect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpAdapter {
    /// Where to dial.
    endpoint: Endpoint,
    /// Live connection.
    conn: Option<Connection>,
}

impl HttpAdapter {
    /// Creates an adapter for `host:port` with the default 10s timeout.
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::from_endpoint(Endpoint::new(host, port))
    }

    /// Creates an adapter for a prepared endpoint.
    #[inline]
    #[must_use]
    pub fn from_endpoint(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            conn: None,
        }
    }

    /// Builds the dialer that opens a plain link to the endpoint.
    fn dialer(&self) -> Dialer {
        let endpoint = self.endpoint.clone();
        Arc::new(move || {
            let endpoint = endpoint.clone();
            async move {
                endpoint
                    .within(async {
                        let stream = endpoint.dial().await?;
                        Link::handshake(stream, endpoint.authority()).await
                    })
                    .await
            }
            .boxed()
        })
    }
}

#[async_trait]
impl Adapter for HttpAdapter {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn connect(&mut self) -> Result<Connection> {
        if let Some(conn) = &self.conn {
            debug!(endpoint = %self.endpoint, "Already connected, reusing connection");
            return Ok(conn.clone());
        }

        let conn = Connection::open(self.endpoint.authority(), self.dialer()).await?;
        info!(host = %self.endpoint.host, port = self.endpoint.port, "Connected to control server");

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
