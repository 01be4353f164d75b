//! Supported mock server frameworks.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// AppKind
// ============================================================================

/// Web framework a mock application is served by.
///
/// The wire string doubles as the application name used by
/// [`mock_via`](crate::client::mock_via).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    /// Sanic.
    Sanic,
    /// Django.
    Django,
    /// Flask.
    Flask,
}

impl AppKind {
    /// Every supported kind.
    pub const ALL: [AppKind; 3] = [AppKind::Sanic, AppKind::Django, AppKind::Flask];

    /// Returns the wire string.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sanic => "sanic",
            Self::Django => "django",
            Self::Flask => "flask",
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppKind {
    type Err = Error;

    /// Parses a wire string, ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "Unknown app kind {s:?}, expected one of: sanic, django, flask"
                ))
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
