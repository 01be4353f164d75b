//! httpmocker - Control-plane client for a remote mock HTTP server.
//!
//! The mock server runs in its own process and hosts framework apps
//! (Sanic, Django, Flask) whose request handlers and canned responses are
//! configured at runtime. This crate drives it over a small HTTP/1.1
//! control protocol.
//!
//! # Architecture
//!
//! - **[`Client`]**: owns one transport adapter and opens sessions
//! - **[`App`]**: one mock application, `Stopped` or `Started(id)`
//! - **[`Handler`]**: one named handler inside a started application
//!
//! Every operation is one request and one fully-read response. Guard
//! violations fail locally with [`Error::Precondition`] before anything is
//! sent.
//!
//! # Quick Start
//!
//! ```no_run
//! use httpmocker::{AppOptions, Client, HandlerOptions, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut client = Client::builder().host("127.0.0.1").port(8080).build()?;
//!     client.connect().await?;
//!
//!     let mut app = client.app("flask", 5000, AppOptions::new())?;
//!     app.start().await?;
//!     println!("{app}");
//!
//!     let mut handler = app.handler("users", HandlerOptions::new()).await?;
//!     handler.attach("handler definition").await?;
//!     handler.set_data("/api/users", &json!([{"id": 1}])).await?;
//!
//!     handler.detach().await?;
//!     handler.close().await?;
//!     app.stop().await?;
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`], builder, options and `mock_via` helpers |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Server-assigned id wrappers |
//! | [`mock`] | [`App`], [`Handler`] and [`AppKind`] |
//! | [`protocol`] | Control commands and exchange types |
//! | [`transport`] | Adapters and the HTTP/1.1 connection |

// ============================================================================
// Modules
// ============================================================================

/// Session entry point and configuration.
///
/// Use [`Client::builder()`] or [`Client::default()`] to create a client.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Application and handler handles.
pub mod mock;

/// Control protocol message types.
pub mod protocol;

/// HTTP transport layer.
///
/// Plain and TLS adapters over a shared HTTP/1.1 connection.
pub mod transport;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{
    AppOptions, Client, ClientBuilder, HandlerOptions, mock_via, mock_via_django, mock_via_flask,
    mock_via_sanic, mock_via_with,
};

// Mock handles
pub use mock::{App, AppKind, AppState, Handler};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::AppId;

// Transport types
pub use transport::{
    Adapter, AdapterConfig, Connection, Endpoint, HttpAdapter, HttpsAdapter, TlsFiles,
};
