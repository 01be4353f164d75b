//! Request and response exchange types.
//!
//! [`ControlRequest`] is what a command turns into before it hits the wire;
//! [`ControlResponse`] is the fully-read answer handed back by
//! [`Connection::exchange`](crate::transport::Connection::exchange).

// ============================================================================
// Imports
// ============================================================================

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{CONTENT_TYPE, HOST, HeaderMap, HeaderValue};
use hyper::{Method, Request, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

use super::command::Scope;

// ============================================================================
// ControlRequest
// ============================================================================

/// A control request before it is bound to a connection.
///
/// # Format
///
/// ```text
/// POST /mock/app/handler/data/ HTTP/1.1
/// host: 0.0.0.0:8080
/// m-handler-url: /api/users
/// content-type: application/json
///
/// {"id":1}
/// ```
#[derive(Debug, Clone)]
pub struct ControlRequest {
    /// HTTP method.
    pub method: Method,

    /// Request path.
    pub path: &'static str,

    /// Protocol headers in insertion order.
    pub headers: Vec<(&'static str, String)>,

    /// Request body, empty when the command carries none.
    pub body: Bytes,

    /// Content type for JSON bodies.
    pub content_type: Option<&'static str>,
}

impl ControlRequest {
    /// Creates an empty request.
    #[inline]
    #[must_use]
    pub fn new(method: Method, path: &'static str) -> Self {
        Self {
            method,
            path,
            headers: Vec::new(),
            body: Bytes::new(),
            content_type: None,
        }
    }

    /// Adds a protocol header.
    #[inline]
    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Sets a raw body.
    #[inline]
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.body = Bytes::from(serde_json::to_vec(value)?);
        self.content_type = Some("application/json");
        Ok(self)
    }

    /// Returns the first value of a protocol header.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Builds the HTTP request addressed to `authority`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a header value contains bytes
    /// that cannot appear in an HTTP header.
    pub(crate) fn into_http(self, authority: &str) -> Result<Request<Full<Bytes>>> {
        let mut builder = Request::builder()
            .method(self.method)
            .uri(self.path)
            .header(HOST, header_value(HOST.as_str(), authority)?);

        for (name, value) in &self.headers {
            builder = builder.header(*name, header_value(name, value)?);
        }

        if let Some(content_type) = self.content_type {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        builder
            .body(Full::new(self.body))
            .map_err(|e| Error::invalid_argument(e.to_string()))
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::invalid_argument(format!("{name} value is not a valid header: {value:?}")))
}

// ============================================================================
// ControlResponse
// ============================================================================

/// A fully-read response from the control server.
#[derive(Debug, Clone)]
pub struct ControlResponse {
    /// Response status.
    pub status: StatusCode,

    /// Response headers.
    pub headers: HeaderMap,

    /// Raw response body.
    pub body: Bytes,
}

impl ControlResponse {
    /// Returns `true` for the protocol's only success status, 200.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Returns a response header as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decodes the body as JSON.
    ///
    /// An empty body decodes to `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the body is not valid JSON.
    pub fn json(&self) -> Result<Value> {
        if self.body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Extracts the failure message of a rejected request.
    ///
    /// Prefers the `error` field of a JSON body, then the raw body text,
    /// then the status reason.
    #[must_use]
    pub fn error_message(&self) -> String {
        if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(&self.body)
            && let Some(Value::String(message)) = map.get("error")
        {
            return message.clone();
        }

        let text = String::from_utf8_lossy(&self.body);
        let text = text.trim();
        if !text.is_empty() {
            return text.to_string();
        }

        self.status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    }

    /// Maps the response to its decoded body or the scope's error.
    ///
    /// # Errors
    ///
    /// - [`Error::App`] / [`Error::Handler`] for a non-200 status
    /// - [`Error::Json`] if a success body is not valid JSON
    pub fn into_result(self, scope: Scope) -> Result<Value> {
        if !self.is_success() {
            return Err(scope.failure(self.status.as_u16(), self.error_message()));
        }
        self.json()
    }
}

// ============================================================================
// Tests
// ============================================================================
