//! Error types for Navi.
//!
//! Library crates use [`NaviError`] via `thiserror`.
//! The `navi` binary wraps this with `color-eyre` for rich diagnostics.
//!
//! The first four variants form the closed taxonomy of the comment pipeline.
//! Everything the provider or the network can do to a request ends up in one
//! of them.

use std::path::PathBuf;

/// Top-level error type for all Navi operations.
#[derive(Debug, thiserror::Error)]
pub enum NaviError {
    /// No usable credential, or invalid local configuration.
    /// Not retryable without user action.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The provider rejected the credential (HTTP 401).
    #[error("authentication error: {message}")]
    Auth { message: String },

    /// The credential is valid but lacks access to the resource (HTTP 403).
    #[error("permission error: {message}")]
    Permission { message: String },

    /// Network failure, timeout, deadline expiry, malformed body, or any
    /// other non-success status.
    #[error("{}", transport_display(.status, .message))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Filesystem I/O error while reading or writing local configuration.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn transport_display(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("transport error: HTTP {code}: {message}"),
        None => format!("transport error: {message}"),
    }
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NaviError>;

impl NaviError {
    /// Create a configuration error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Credential rejected by the provider.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth {
            message: msg.into(),
        }
    }

    /// Credential accepted but not allowed to read the resource.
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission {
            message: msg.into(),
        }
    }

    /// Transport failure that never produced an HTTP status.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: msg.into(),
        }
    }

    /// Transport failure carrying the HTTP status the provider answered with.
    pub fn http_status(status: u16, msg: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether retrying the same call later (with backoff) may succeed.
    ///
    /// Only transport failures qualify; the others need a new credential or
    /// user action first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status behind the error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Auth { .. } => Some(401),
            Self::Permission { .. } => Some(403),
            _ => None,
        }
    }
}
