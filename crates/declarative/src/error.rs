//! Error types for reconciliation.
//!
//! Every error is fatal for the reconciliation that raised it. Nothing is
//! retried here: retry and timeout policy belong to the provider.

use std::fmt;

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classes of reconciliation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller's input was rejected before any remote call.
    Validation,
    /// The provider answered but refused the change.
    Remote,
    /// The remote call itself failed or returned something unreadable.
    Transport,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid check declaration",
            Self::Remote => "Provider rejected the request",
            Self::Transport => "Provider request failed",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Validation => "Check the required fields for the requested state",
            Self::Remote => "Review the provider message and the field issues it lists",
            Self::Transport => "Check connectivity and credentials, then run again",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while reconciling a resource.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field combination is missing or a value has the wrong shape.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The provider reported `success = false` with a non-benign message.
    #[error("{}", remote_diagnostic(.message, .issues))]
    Remote {
        /// Provider message.
        message: String,
        /// Per-field issues as `(field, reason)` pairs, in provider order.
        issues: Vec<(String, String)>,
    },

    /// The remote call failed at the transport level.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The provider answered with something that cannot be interpreted.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Transport {
            message: message.into(),
            status,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation(_) => ErrorCategory::Validation,
            Error::Remote { .. } => ErrorCategory::Remote,
            Error::Transport { .. } | Error::InvalidResponse(_) => ErrorCategory::Transport,
        }
    }

    /// Always false: a failed reconciliation is terminal for the invocation.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Provider message followed by its issues joined into one diagnostic line.
fn remote_diagnostic(message: &str, issues: &[(String, String)]) -> String {
    if issues.is_empty() {
        return message.to_string();
    }
    let joined = issues
        .iter()
        .map(|(field, reason)| match field.as_str() {
            "" => reason.clone(),
            _ => format!("{field}: {reason}"),
        })
        .collect::<Vec<_>>()
        .join("; ");
    format!("{message} {joined}")
}
