//! Error types for the mock server client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use httpmocker::{Error, Result};
//!
//! async fn example(app: &mut App) -> Result<()> {
//!     match app.stop().await {
//!         Err(Error::Precondition { message }) => println!("not running: {message}"),
//!         other => { other?; }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`], [`Error::Tls`] |
//! | Connection | [`Error::Connect`], [`Error::ConnectTimeout`], [`Error::NotConnected`], [`Error::ConnectionClosed`] |
//! | State | [`Error::Precondition`] |
//! | Server | [`Error::App`], [`Error::Handler`] |
//! | Protocol | [`Error::Protocol`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::Http`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client or adapter configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument supplied by the caller.
    ///
    /// Returned when a name, url or host cannot be put on the wire.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// TLS material could not be loaded or the handshake setup failed.
    #[error("TLS error: {message}")]
    Tls {
        /// Description of the TLS failure.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Transport could not be opened or closed.
    #[error("Connect error: {message}")]
    Connect {
        /// Description of the connection error.
        message: String,
    },

    /// Connect phase did not finish within the adapter timeout.
    #[error("Connect timeout after {timeout_ms}ms")]
    ConnectTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Operation needs a live connection but the adapter is not connected.
    #[error("Not connected")]
    NotConnected,

    /// Connection was closed before or during the exchange.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // State Errors
    // ========================================================================
    /// Operation invoked in the wrong handle state.
    ///
    /// Raised locally before any request is sent.
    #[error("{message}")]
    Precondition {
        /// Names the state the operation expects.
        message: String,
    },

    // ========================================================================
    // Server Errors
    // ========================================================================
    /// Application control request was rejected by the server.
    #[error("App error ({status}): {message}")]
    App {
        /// HTTP status returned by the server.
        status: u16,
        /// Server-reported error message.
        message: String,
    },

    /// Handler control request was rejected by the server.
    #[error("Handler error ({status}): {message}")]
    Handler {
        /// HTTP status returned by the server.
        status: u16,
        /// Server-reported error message.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Response did not have the expected shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP connection error.
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a TLS error.
    #[inline]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls {
            message: message.into(),
        }
    }

    /// Creates a connect error.
    #[inline]
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Creates a connect timeout error.
    #[inline]
    pub fn connect_timeout(timeout_ms: u64) -> Self {
        Self::ConnectTimeout { timeout_ms }
    }

    /// Creates a precondition error.
    #[inline]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Creates an application error.
    #[inline]
    pub fn app(status: u16, message: impl Into<String>) -> Self {
        Self::App {
            status,
            message: message.into(),
        }
    }

    /// Creates a handler error.
    #[inline]
    pub fn handler(status: u16, message: impl Into<String>) -> Self {
        Self::Handler {
            status,
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the transport could not be opened, closed or used.
    #[inline]
    #[must_use]
    pub fn is_connect_error(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. }
                | Self::ConnectTimeout { .. }
                | Self::NotConnected
                | Self::ConnectionClosed
                | Self::Http(_)
        )
    }

    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectTimeout { .. })
    }

    /// Returns `true` if a state guard rejected the call.
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }

    /// Returns `true` if the server answered with a non-200 status.
    #[inline]
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::App { .. } | Self::Handler { .. })
    }

    /// Returns the server-reported message for server errors.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::App { message, .. } | Self::Handler { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns the HTTP status for server errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::App { status, .. } | Self::Handler { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
