//! Command definitions for app and handler control.
//!
//! Each command knows which method, path and headers it travels with, and
//! which error family a rejection maps to.
//!
//! # Command Groups
//!
//! | Group | Commands |
//! |-------|----------|
//! | [`AppCommand`] | Start, Status, Stop |
//! | [`HandlerCommand`] | Attach, Detach, SetData, RemoveData |

// ============================================================================
// Imports
// ============================================================================

use bytes::Bytes;
use hyper::Method;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::identifiers::AppId;

use super::request::ControlRequest;
use super::{
    APP_PATH, HANDLER_DATA_PATH, HANDLER_PATH, HEADER_APP_ENABLE_SSL, HEADER_APP_ID,
    HEADER_APP_NAME, HEADER_APP_PORT, HEADER_HANDLER_NAME, HEADER_HANDLER_URL,
};

// ============================================================================
// Scope
// ============================================================================

/// Which control surface a command addresses.
///
/// Decides the error variant a non-200 response turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Application control (`/mock/app/`).
    App,
    /// Handler control (`/mock/app/handler/`).
    Handler,
}

impl Scope {
    /// Builds the server error for this scope.
    #[inline]
    #[must_use]
    pub fn failure(self, status: u16, message: impl Into<String>) -> Error {
        match self {
            Self::App => Error::app(status, message),
            Self::Handler => Error::handler(status, message),
        }
    }
}

// ============================================================================
// Command Wrapper
// ============================================================================

/// All control commands.
#[derive(Debug, Clone)]
pub enum Command {
    /// Application lifecycle commands.
    App(AppCommand),
    /// Handler and mock rule commands.
    Handler(HandlerCommand),
}

impl Command {
    /// Returns the control surface this command addresses.
    #[inline]
    #[must_use]
    pub fn scope(&self) -> Scope {
        match self {
            Self::App(_) => Scope::App,
            Self::Handler(_) => Scope::Handler,
        }
    }

    /// Converts the command into a raw request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if a JSON body cannot be encoded.
    pub fn into_request(self) -> Result<ControlRequest> {
        match self {
            Self::App(command) => command.into_request(),
            Self::Handler(command) => command.into_request(),
        }
    }
}

impl From<AppCommand> for Command {
    fn from(command: AppCommand) -> Self {
        Self::App(command)
    }
}

impl From<HandlerCommand> for Command {
    fn from(command: HandlerCommand) -> Self {
        Self::Handler(command)
    }
}

// ============================================================================
// App Commands
// ============================================================================

/// Application lifecycle commands.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Start a mock application.
    Start {
        /// Logical application name.
        name: String,
        /// Port the application listens on.
        port: u16,
        /// Serve the application over TLS.
        enable_ssl: bool,
        /// JSON config, already merged with `ssl_cert` / `ssl_key`.
        config: Map<String, Value>,
    },

    /// Query application status.
    Status {
        /// Target application.
        id: AppId,
    },

    /// Stop an application.
    Stop {
        /// Target application.
        id: AppId,
    },
}

impl AppCommand {
    fn into_request(self) -> Result<ControlRequest> {
        let request = match self {
            Self::Start {
                name,
                port,
                enable_ssl,
                config,
            } => ControlRequest::new(Method::POST, APP_PATH)
                .header(HEADER_APP_NAME, name)
                .header(HEADER_APP_PORT, port.to_string())
                .header(HEADER_APP_ENABLE_SSL, wire_bool(enable_ssl))
                .json(&Value::Object(config))?,
            Self::Status { id } => {
                ControlRequest::new(Method::GET, APP_PATH).header(HEADER_APP_ID, id.as_str())
            }
            Self::Stop { id } => {
                ControlRequest::new(Method::DELETE, APP_PATH).header(HEADER_APP_ID, id.as_str())
            }
        };
        Ok(request)
    }
}

/// Boolean spelling the control server expects in headers.
fn wire_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

// ============================================================================
// Handler Commands
// ============================================================================

/// Handler and mock rule commands.
#[derive(Debug, Clone)]
pub enum HandlerCommand {
    /// Attach a handler with its opaque definition payload.
    Attach {
        /// Handler name.
        name: String,
        /// Opaque payload, sent as-is.
        data: Bytes,
    },

    /// Detach a handler.
    Detach {
        /// Handler name.
        name: String,
    },

    /// Store response data for a url.
    SetData {
        /// Target url.
        url: String,
        /// Response data, sent as JSON.
        data: Value,
    },

    /// Remove the mock rule for a url.
    RemoveData {
        /// Target url.
        url: String,
    },
}

impl HandlerCommand {
    fn into_request(self) -> Result<ControlRequest> {
        let request = match self {
            Self::Attach { name, data } => ControlRequest::new(Method::POST, HANDLER_PATH)
                .header(HEADER_HANDLER_NAME, name)
                .body(data),
            Self::Detach { name } => ControlRequest::new(Method::DELETE, HANDLER_PATH)
                .header(HEADER_HANDLER_NAME, name),
            Self::SetData { url, data } => ControlRequest::new(Method::POST, HANDLER_DATA_PATH)
                .header(HEADER_HANDLER_URL, url)
                .json(&data)?,
            Self::RemoveData { url } => ControlRequest::new(Method::DELETE, HANDLER_DATA_PATH)
                .header(HEADER_HANDLER_URL, url),
        };
        Ok(request)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_start_request_shape() {
        let mut config = Map::new();
        config.insert("ssl_cert".into(), Value::Null);
        config.insert("ssl_key".into(), Value::Null);

        let request = Command::from(AppCommand::Start {
            name: "svc".into(),
            port: 9001,
            enable_ssl: false,
            config,
        })
        .into_request()
        .expect("request");

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, APP_PATH);
        assert_eq!(request.header_value(HEADER_APP_NAME), Some("svc"));
        assert_eq!(request.header_value(HEADER_APP_PORT), Some("9001"));
        assert_eq!(request.header_value(HEADER_APP_ENABLE_SSL), Some("False"));

        let body: Value = serde_json::from_slice(&request.body).expect("json body");
        assert_eq!(body, json!({"ssl_cert": null, "ssl_key": null}));
    }

    #[test]
    fn test_status_and_stop_carry_app_id() {
        let id = AppId::new("abc123").expect("id");

        let status = Command::from(AppCommand::Status { id: id.clone() })
            .into_request()
            .expect("request");
        assert_eq!(status.method, Method::GET);
        assert_eq!(status.header_value(HEADER_APP_ID), Some("abc123"));
        assert!(status.body.is_empty());

        let stop = Command::from(AppCommand::Stop { id })
            .into_request()
            .expect("request");
        assert_eq!(stop.method, Method::DELETE);
        assert_eq!(stop.path, APP_PATH);
    }

    #[test]
    fn test_attach_body_is_opaque() {
        let request = Command::from(HandlerCommand::Attach {
            name: "users".into(),
            data: Bytes::from_static(b"raw handler source"),
        })
        .into_request()
        .expect("request");

        assert_eq!(request.path, HANDLER_PATH);
        assert_eq!(request.header_value(HEADER_HANDLER_NAME), Some("users"));
        assert_eq!(&request.body[..], b"raw handler source");
        assert!(request.content_type.is_none());
    }

    #[test]
    fn test_set_data_body_is_json() {
        let request = Command::from(HandlerCommand::SetData {
            url: "/api/users".into(),
            data: json!({"id": 1}),
        })
        .into_request()
        .expect("request");

        assert_eq!(request.path, HANDLER_DATA_PATH);
        assert_eq!(request.header_value(HEADER_HANDLER_URL), Some("/api/users"));
        assert_eq!(&request.body[..], br#"{"id":1}"#);
        assert_eq!(request.content_type, Some("application/json"));
    }

    #[test]
    fn test_scope_failure_variant() {
        assert!(matches!(
            Scope::App.failure(500, "boom"),
            Error::App { status: 500, .. }
        ));
        assert!(matches!(
            Scope::Handler.failure(404, "missing"),
            Error::Handler { status: 404, .. }
        ));
        assert_eq!(
            Command::from(HandlerCommand::Detach { name: "x".into() }).scope(),
            Scope::Handler
        );
    }
}
