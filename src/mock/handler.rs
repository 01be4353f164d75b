//! Request handler attached to a running mock application.
//!
//! A [`Handler`] owns the adapter it talks through, normally a plain
//! connection to the application port. Attaching uploads the handler
//! definition; once attached, per-url response data can be stored and
//! removed.
//!
//! # State Machine
//!
//! ```text
//!             attach(data)            detach()
//! Detached ───────────────► Attached ──────────► Detached
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::protocol::{Command, HandlerCommand, Scope};
use crate::transport::{Adapter, Connection};

// ============================================================================
// Constants
// ============================================================================

const NOT_SET: &str = "Handler is not set.";
const ALREADY_ATTACHED: &str = "Handler is already attached.";

// ============================================================================
// Handler
// ============================================================================

/// Handle to one named handler on a mock application.
///
/// Created by [`App::handler`](crate::App::handler).
pub struct Handler {
    /// Caller-chosen handler name.
    name: String,
    /// Adapter owned by this handler.
    adapter: Box<dyn Adapter>,
    /// Connection opened by `adapter`.
    conn: Connection,
    /// Set by a successful attach, cleared by a successful detach.
    attached: bool,
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("endpoint", self.adapter.endpoint())
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler(name={})", self.name)
    }
}

impl Handler {
    pub(crate) fn new(name: String, adapter: Box<dyn Adapter>, conn: Connection) -> Self {
        Self {
            name,
            adapter,
            conn,
            attached: false,
        }
    }

    /// Returns the handler name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` between a successful attach and detach.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Returns the adapter this handler owns.
    #[inline]
    #[must_use]
    pub fn adapter(&self) -> &dyn Adapter {
        &*self.adapter
    }

    /// Uploads the handler definition.
    ///
    /// `data` is sent as-is; its format is up to the mock server.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if already attached
    /// - [`Error::Handler`] if the server rejects the handler
    pub async fn attach(&mut self, data: impl Into<Bytes>) -> Result<Value> {
        if self.attached {
            return Err(Error::precondition(ALREADY_ATTACHED));
        }

        let data = data.into();
        debug!(handler = %self.name, bytes = data.len(), "Attaching handler");

        let body = self
            .send(HandlerCommand::Attach {
                name: self.name.clone(),
                data,
            })
            .await?;

        self.attached = true;
        info!(handler = %self.name, "Handler attached");
        Ok(body)
    }

    /// Removes the handler from the application.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if not attached
    /// - [`Error::Handler`] if the server rejects the detach
    pub async fn detach(&mut self) -> Result<Value> {
        self.ensure_attached()?;

        let body = self
            .send(HandlerCommand::Detach {
                name: self.name.clone(),
            })
            .await?;

        self.attached = false;
        info!(handler = %self.name, "Handler detached");
        Ok(body)
    }

    /// Stores the response data served for `url`.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if not attached
    /// - [`Error::Json`] if `data` cannot be serialized
    /// - [`Error::Handler`] if the server rejects the data
    pub async fn set_data<T: Serialize + ?Sized>(&self, url: &str, data: &T) -> Result<Value> {
        self.ensure_attached()?;

        let data = serde_json::to_value(data)?;
        debug!(handler = %self.name, url, "Setting mock data");

        self.send(HandlerCommand::SetData {
            url: url.to_string(),
            data,
        })
        .await
    }

    /// Removes the response data for `url`.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if not attached
    /// - [`Error::Handler`] if the server rejects the removal
    pub async fn remove_data(&self, url: &str) -> Result<Value> {
        self.ensure_attached()?;

        debug!(handler = %self.name, url, "Removing mock data");
        self.send(HandlerCommand::RemoveData {
            url: url.to_string(),
        })
        .await
    }

    /// Disconnects the adapter this handler owns.
    ///
    /// The attached flag is left as is; the server keeps the handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the close fails.
    pub async fn close(&mut self) -> Result<()> {
        self.adapter.disconnect().await
    }

    fn ensure_attached(&self) -> Result<()> {
        if !self.attached {
            return Err(Error::precondition(NOT_SET));
        }
        Ok(())
    }

    async fn send(&self, command: HandlerCommand) -> Result<Value> {
        let request = Command::Handler(command).into_request()?;
        self.conn.exchange(request).await?.into_result(Scope::Handler)
    }
}

// ============================================================================
// Tests
// ============================================================================
