//! Control protocol message types.
//!
//! This module defines the HTTP requests the client sends to the control
//! server and the responses it reads back.
//!
//! # Protocol Overview
//!
//! | Operation | Method | Path | Key header |
//! |-----------|--------|------|------------|
//! | start app | `POST` | `/mock/app/` | `m-app-name`, `m-app-port`, `m-app-enable-ssl` |
//! | app status | `GET` | `/mock/app/` | `m-app-id` |
//! | stop app | `DELETE` | `/mock/app/` | `m-app-id` |
//! | attach handler | `POST` | `/mock/app/handler/` | `m-handler-name` |
//! | detach handler | `DELETE` | `/mock/app/handler/` | `m-handler-name` |
//! | set data | `POST` | `/mock/app/handler/data/` | `m-handler-url` |
//! | remove data | `DELETE` | `/mock/app/handler/data/` | `m-handler-url` |
//!
//! Success is status 200 with a JSON body. Anything else is a failure whose
//! JSON body carries an `error` field.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Typed app and handler commands |
//! | `request` | Raw request/response exchange types |

// ============================================================================
// Submodules
// ============================================================================

/// App and handler command definitions.
pub mod command;

/// Raw request and response types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{AppCommand, Command, HandlerCommand, Scope};
pub use request::{ControlRequest, ControlResponse};

// ============================================================================
// Paths
// ============================================================================

/// Base path for application control.
pub const APP_PATH: &str = "/mock/app/";

/// Base path for handler control.
pub const HANDLER_PATH: &str = "/mock/app/handler/";

/// Path for handler mock rules.
pub const HANDLER_DATA_PATH: &str = "/mock/app/handler/data/";

// ============================================================================
// Headers
// ============================================================================

/// Logical application name sent on start.
pub const HEADER_APP_NAME: &str = "m-app-name";

/// Port the mock application should listen on.
pub const HEADER_APP_PORT: &str = "m-app-port";

/// Whether the mock application serves TLS.
pub const HEADER_APP_ENABLE_SSL: &str = "m-app-enable-ssl";

/// Server-assigned application id.
pub const HEADER_APP_ID: &str = "m-app-id";

/// Handler name for attach/detach.
pub const HEADER_HANDLER_NAME: &str = "m-handler-name";

/// Target url of a mock rule.
pub const HEADER_HANDLER_URL: &str = "m-handler-url";
