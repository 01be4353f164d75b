//! Remote mock application handle.
//!
//! An [`App`] names one application hosted by the control server. It holds
//! a clone of the session's control connection and never closes it.
//!
//! # State Machine
//!
//! ```text
//!            start()               stop()
//! Stopped ───────────► Started(id) ───────► Stopped
//! ```
//!
//! `status`, `running`, `stop` and `handler` need `Started`; `start` needs
//! `Stopped`. A guard violation fails locally with [`Error::Precondition`]
//! and nothing is sent.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::client::{AppOptions, HandlerOptions};
use crate::error::{Error, Result};
use crate::identifiers::AppId;
use crate::protocol::{AppCommand, Command, ControlResponse, HEADER_APP_ID, Scope};
use crate::transport::{Adapter, Connection, DEFAULT_HOST, HttpAdapter};

use super::handler::Handler;

// ============================================================================
// Constants
// ============================================================================

const ALREADY_STARTED: &str = "App has already started.";
const NOT_STARTED: &str = "App has not started.";

// ============================================================================
// AppState
// ============================================================================

/// Lifecycle state of an [`App`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Not running on the server, or never started.
    Stopped,
    /// Running under the server-assigned id.
    Started(AppId),
}

// ============================================================================
// App
// ============================================================================

/// Handle to one mock application on the control server.
///
/// Created by [`Client::app`](crate::Client::app).
pub struct App {
    /// Caller-chosen logical name.
    name: String,
    /// Port the application listens on.
    port: u16,
    /// TLS settings forwarded on start.
    options: AppOptions,
    /// Shared control connection.
    conn: Connection,
    /// Local lifecycle state.
    state: AppState,
}

// ============================================================================
// App - Display
// ============================================================================

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("port", &self.port)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (id, status) = match &self.state {
            AppState::Started(id) => (id.as_str(), "running"),
            AppState::Stopped => ("none", "stopped"),
        };
        write!(f, "App(name={}, id={id}, status={status})", self.name)
    }
}

// ============================================================================
// App - Constructor and Accessors
// ============================================================================

impl App {
    pub(crate) fn new(
        name: impl Into<String>,
        port: u16,
        options: AppOptions,
        conn: Connection,
    ) -> Self {
        Self {
            name: name.into(),
            port,
            options,
            conn,
            state: AppState::Stopped,
        }
    }

    /// Returns the logical name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the server-assigned id while started.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&AppId> {
        match &self.state {
            AppState::Started(id) => Some(id),
            AppState::Stopped => None,
        }
    }

    /// Returns the application port.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the serving options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    /// Returns the local lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Returns `true` after a successful start and before a successful stop.
    #[inline]
    #[must_use]
    pub fn is_started(&self) -> bool {
        matches!(self.state, AppState::Started(_))
    }

    /// Returns the control connection this handle sends through.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Points the handle at another control connection.
    ///
    /// Needed after the session that created the app has closed, as with
    /// [`mock_via`](crate::client::mock_via). The lifecycle state is kept.
    pub fn rebind(&mut self, conn: Connection) {
        debug!(app = %self.name, authority = conn.authority(), "Rebinding app connection");
        self.conn = conn;
    }
}

// ============================================================================
// App - Lifecycle
// ============================================================================

impl App {
    /// Starts the application with an empty config.
    ///
    /// # Errors
    ///
    /// See [`App::start_with`].
    pub async fn start(&mut self) -> Result<Value> {
        self.start_with(Map::new()).await
    }

    /// Starts the application with a framework config.
    ///
    /// `ssl_cert` and `ssl_key` from the app options are written into the
    /// config, replacing any caller values, as `null` when unset.
    ///
    /// Returns the decoded response body.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if already started
    /// - [`Error::App`] if the server rejects the start
    /// - [`Error::Protocol`] if the response carries no `m-app-id`
    pub async fn start_with(&mut self, mut config: Map<String, Value>) -> Result<Value> {
        if self.is_started() {
            return Err(Error::precondition(ALREADY_STARTED));
        }

        config.insert("ssl_cert".to_string(), self.options.ssl_cert_value());
        config.insert("ssl_key".to_string(), self.options.ssl_key_value());

        debug!(app = %self.name, port = self.port, ssl = self.options.enable_ssl, "Starting app");

        let response = self
            .send(AppCommand::Start {
                name: self.name.clone(),
                port: self.port,
                enable_ssl: self.options.enable_ssl,
                config,
            })
            .await?;

        if !response.is_success() {
            return Err(Scope::App.failure(response.status.as_u16(), response.error_message()));
        }

        let body = response.json()?;
        let id = response
            .header(HEADER_APP_ID)
            .and_then(|id| AppId::new(id))
            .ok_or_else(|| Error::protocol(format!("Start response has no {HEADER_APP_ID} header")))?;

        info!(app = %self.name, id = %id, port = self.port, "App started");
        self.state = AppState::Started(id);
        Ok(body)
    }

    /// Stops the application.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if not started
    /// - [`Error::App`] if the server rejects the stop; the app stays started
    pub async fn stop(&mut self) -> Result<Value> {
        let id = self.started_id()?.clone();

        let body = self
            .send(AppCommand::Stop { id: id.clone() })
            .await?
            .into_result(Scope::App)?;

        info!(app = %self.name, id = %id, "App stopped");
        self.state = AppState::Stopped;
        Ok(body)
    }

    /// Fetches the application status document.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if not started
    /// - [`Error::App`] if the server rejects the query
    pub async fn status(&self) -> Result<Value> {
        let id = self.started_id()?.clone();
        self.send(AppCommand::Status { id }).await?.into_result(Scope::App)
    }

    /// Returns `true` if the server reports the application as running.
    ///
    /// # Errors
    ///
    /// Same as [`App::status`].
    pub async fn running(&self) -> Result<bool> {
        let status = self.status().await?;
        Ok(status.get("status").and_then(Value::as_str) == Some("running"))
    }

    /// Opens a handler on this application.
    ///
    /// Uses the adapter from `options`, or a plain adapter to `0.0.0.0` on
    /// the application port. The adapter is connected and handed to the
    /// returned [`Handler`].
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if not started
    /// - Connection errors from the handler adapter
    pub async fn handler(&self, name: impl Into<String>, options: HandlerOptions) -> Result<Handler> {
        self.started_id()?;

        let mut adapter = options
            .adapter
            .unwrap_or_else(|| Box::new(HttpAdapter::new(DEFAULT_HOST, self.port)));
        let conn = adapter.connect().await?;

        let name = name.into();
        debug!(app = %self.name, handler = %name, endpoint = %adapter.endpoint(), "Handler connected");
        Ok(Handler::new(name, adapter, conn))
    }
}

// ============================================================================
// App - Internal
// ============================================================================

impl App {
    fn started_id(&self) -> Result<&AppId> {
        self.id().ok_or_else(|| Error::precondition(NOT_STARTED))
    }

    async fn send(&self, command: AppCommand) -> Result<ControlResponse> {
        self.conn.exchange(Command::App(command).into_request()?).await
    }
}

// ============================================================================
// Tests
// ============================================================================
