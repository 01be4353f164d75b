//! Session entry point and its configuration.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Owns the control adapter and creates apps |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`AppOptions`] | TLS settings of a mock application |
//! | [`HandlerOptions`] | Adapter override for a handler |
//!
//! The `mock_via*` helpers start a framework app in a one-off session.

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for client configuration.
pub mod builder;

/// Core client implementation.
pub mod core;

/// App and handler options.
pub mod options;

/// One-shot framework helpers.
pub mod shortcut;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use core::Client;
pub use options::{AppOptions, HandlerOptions};
pub use shortcut::{mock_via, mock_via_django, mock_via_flask, mock_via_sanic, mock_via_with};
