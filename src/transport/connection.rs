//! HTTP/1.1 control connection.
//!
//! A [`Connection`] wraps one hyper client connection to the control server
//! and exposes the raw exchange primitive used by every app and handler
//! operation.
//!
//! # Driver Task
//!
//! hyper splits a client connection into a request sender and a connection
//! future that performs the socket I/O. The future is spawned as a tokio
//! task and ends once the sender is dropped and the connection is idle.
//!
//! # Sharing
//!
//! Cloning a `Connection` yields another handle onto the same link. The
//! sender sits behind an async lock held for a full round trip, so requests
//! from different clones are serialized, never interleaved.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1::{self, SendRequest};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{ControlRequest, ControlResponse};

// ============================================================================
// Types
// ============================================================================

/// Re-opens the underlying link.
///
/// Adapters supply one so a connection the server closed while idle can be
/// dialed again before the next request.
pub(crate) type Dialer = Arc<dyn Fn() -> BoxFuture<'static, Result<Link>> + Send + Sync>;

/// An established HTTP/1.1 link: request sender plus its driver task.
pub(crate) struct Link {
    /// hyper request sender.
    sender: SendRequest<Full<Bytes>>,
    /// Task polling the hyper connection future.
    driver: JoinHandle<()>,
}

impl Link {
    /// Performs the HTTP/1.1 handshake over an established stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the handshake fails.
    pub(crate) async fn handshake<S>(io: S, peer: String) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (sender, connection) = http1::handshake(TokioIo::new(io))
            .await
            .map_err(|e| Error::connect(format!("HTTP handshake with {peer} failed: {e}")))?;

        let driver = tokio::spawn(async move {
            match connection.await {
                Ok(()) => trace!(peer = %peer, "Connection driver finished"),
                Err(e) => debug!(peer = %peer, error = %e, "Connection driver ended with error"),
            }
        });

        Ok(Self { sender, driver })
    }
}

/// Internal shared state for a connection.
struct ConnectionInner {
    /// `host:port` of the peer, sent as the `Host` header.
    authority: String,
    /// Current link; `None` once closed.
    link: AsyncMutex<Option<Link>>,
    /// Dials a replacement link.
    dialer: Dialer,
    /// Set by `close`; a closed connection is never re-dialed.
    closed: AtomicBool,
}

// ============================================================================
// Connection
// ============================================================================

/// Control connection to a mock server endpoint.
///
/// Owned by one adapter; app and handler handles hold clones.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("authority", &self.inner.authority)
            .field("closed", &self.inner.closed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Dials the first link and wraps it.
    pub(crate) async fn open(authority: String, dialer: Dialer) -> Result<Self> {
        let link = dialer().await?;

        debug!(authority = %authority, "Control connection opened");

        Ok(Self {
            inner: Arc::new(ConnectionInner {
                authority,
                link: AsyncMutex::new(Some(link)),
                dialer,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Returns the `host:port` this connection talks to.
    #[inline]
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.inner.authority
    }

    /// Returns `false` once the owning adapter disconnected.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.inner.closed.load(Ordering::Acquire)
    }

    /// Returns `true` if both handles refer to the same underlying link.
    #[inline]
    #[must_use]
    pub fn same_link(&self, other: &Connection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Sends one request and reads the complete response.
    ///
    /// If the server dropped the link while it sat idle, a fresh link is
    /// dialed before sending. A request is never sent twice.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection was closed
    /// - [`Error::InvalidArgument`] if a header cannot be encoded
    /// - [`Error::Http`] if the exchange fails mid-flight
    pub async fn exchange(&self, request: ControlRequest) -> Result<ControlResponse> {
        let method = request.method.clone();
        let path = request.path;
        let http_request = request.into_http(&self.inner.authority)?;

        let mut guard = self.inner.link.lock().await;
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(Error::ConnectionClosed);
        }

        let stale = guard.as_ref().is_none_or(|link| link.sender.is_closed());
        if stale {
            debug!(authority = %self.inner.authority, "Link went away while idle, re-dialing");
            if let Some(old) = guard.take() {
                old.driver.abort();
            }
            *guard = Some((self.inner.dialer)().await?);
        }

        let link = guard.as_mut().ok_or(Error::ConnectionClosed)?;
        link.sender.ready().await?;

        trace!(%method, path, "Sending control request");
        let response = link.sender.send_request(http_request).await?;

        let (parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();
        drop(guard);

        debug!(%method, path, status = parts.status.as_u16(), "Control response received");

        Ok(ControlResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Closes the link and waits up to `grace` for its driver to finish.
    ///
    /// Every clone observes the close. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the driver task panicked.
    pub(crate) async fn close(&self, grace: Duration) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let link = self.inner.link.lock().await.take();
        let Some(Link { sender, mut driver }) = link else {
            return Ok(());
        };
        drop(sender);

        match timeout(grace, &mut driver).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.is_cancelled() => {}
            Ok(Err(e)) => {
                return Err(Error::connect(format!(
                    "Could not disconnect from {}: {e}",
                    self.inner.authority
                )));
            }
            Err(_) => {
                warn!(authority = %self.inner.authority, "Connection driver did not stop in time, aborting");
                driver.abort();
            }
        }

        debug!(authority = %self.inner.authority, "Control connection closed");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{StubReply, StubServer};
    use crate::transport::{Adapter, HttpAdapter};
    use hyper::Method;

    #[test]
    fn test_connection_is_clone_and_debug() {
        fn assert_traits<T: Clone + fmt::Debug + Send + Sync>() {}
        assert_traits::<Connection>();
    }

    #[tokio::test]
    async fn test_exchange_round_trip() {
        let server = StubServer::start().await;
        server.push(StubReply::ok(r#"{"status":"running"}"#).with_header("m-app-id", "abc"));

        let mut adapter = server.adapter();
        let conn = adapter.connect().await.expect("connect");

        let response = conn
            .exchange(ControlRequest::new(Method::GET, "/mock/app/").header("m-app-id", "abc"))
            .await
            .expect("exchange");

        assert!(response.is_success());
        assert_eq!(response.header("m-app-id"), Some("abc"));

        let seen = server.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, Method::GET);
        assert_eq!(seen[0].path, "/mock/app/");
        assert_eq!(seen[0].header("m-app-id"), Some("abc"));
        assert_eq!(seen[0].header("host"), Some(conn.authority()));

        adapter.disconnect().await.expect("disconnect");
    }

    #[tokio::test]
    async fn test_clones_share_one_link() {
        let server = StubServer::start().await;
        let mut adapter = server.adapter();
        let conn = adapter.connect().await.expect("connect");
        let clone = conn.clone();

        for handle in [&conn, &clone] {
            handle
                .exchange(ControlRequest::new(Method::GET, "/mock/app/"))
                .await
                .expect("exchange");
        }

        assert!(conn.same_link(&clone));
        assert_eq!(server.connections(), 1);
        adapter.disconnect().await.expect("disconnect");
    }

    #[tokio::test]
    async fn test_exchange_after_close_fails() {
        let server = StubServer::start().await;
        let mut adapter = server.adapter();
        let conn = adapter.connect().await.expect("connect");

        adapter.disconnect().await.expect("disconnect");

        assert!(!conn.is_open());
        let err = conn
            .exchange(ControlRequest::new(Method::GET, "/mock/app/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let server = StubServer::start().await;
        let mut adapter = server.adapter();
        let conn = adapter.connect().await.expect("connect");

        conn.close(Duration::from_secs(1)).await.expect("first close");
        conn.close(Duration::from_secs(1)).await.expect("second close");
    }

    #[tokio::test]
    async fn test_redials_after_server_hangup() {
        let server = StubServer::start().await;
        server.push(StubReply::ok("{}").closing());

        let mut adapter = server.adapter();
        let conn = adapter.connect().await.expect("connect");

        conn.exchange(ControlRequest::new(Method::GET, "/mock/app/"))
            .await
            .expect("first exchange");

        // Let the driver observe the hangup.
        tokio::time::sleep(Duration::from_millis(100)).await;

        conn.exchange(ControlRequest::new(Method::GET, "/mock/app/"))
            .await
            .expect("second exchange");

        assert_eq!(server.requests().len(), 2);
        assert_eq!(server.connections(), 2);
        adapter.disconnect().await.expect("disconnect");
    }
}
