//! Handles for remote mock applications and their handlers.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`App`] | One mock application, `Stopped` or `Started(id)` |
//! | [`Handler`] | One named handler inside a started application |
//! | [`AppKind`] | Frameworks the mock server can host |
//!
//! # Example
//!
//! ```no_run
//! use httpmocker::{AppOptions, Client, HandlerOptions, Result};
//! use serde_json::json;
//!
//! # async fn example() -> Result<()> {
//! let mut client = Client::default();
//! client.connect().await?;
//!
//! let mut app = client.app("flask", 5000, AppOptions::new())?;
//! app.start().await?;
//!
//! let mut handler = app.handler("users", HandlerOptions::new()).await?;
//! handler.attach("handler definition").await?;
//! handler.set_data("/api/users", &json!([{"id": 1}])).await?;
//! handler.detach().await?;
//! handler.close().await?;
//!
//! app.stop().await?;
//! client.disconnect().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Application handle.
pub mod app;

/// Handler handle.
pub mod handler;

/// Framework kinds.
pub mod kind;

// ============================================================================
// Re-exports
// ============================================================================

pub use app::{App, AppState};
pub use handler::Handler;
pub use kind::AppKind;
