//! Type-safe identifiers for mock server entities.
//!
//! Newtype wrappers keep server-assigned ids apart from the caller-chosen
//! names they travel next to.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// AppId
// ============================================================================

/// Server-assigned identifier of a started mock application.
///
/// Only the control server mints these; the client receives one in the
/// `m-app-id` header of a successful start and echoes it back on status
/// and stop requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Wraps a server-provided id.
    ///
    /// Returns `None` for an empty or whitespace-only value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return None;
        }
        Some(Self(id))
    }

    /// Returns the id as sent on the wire.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AppId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Tests
// ============================================================================
