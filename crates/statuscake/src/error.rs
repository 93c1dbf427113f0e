//! Error types for StatusCake API calls.
//!
//! Only transport-level failures live here. A request that reaches the API
//! and comes back with `Success: false` is not an error at this layer: it is
//! a [`declarative::ProviderResponse`] for the reconciler to interpret.

/// Result type alias for StatusCake client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the StatusCake API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The API answered with a body that cannot be interpreted.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// HTTP status code, when the failure carried one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            Self::InvalidResponse(_) => None,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {code}"),
                status: Some(code),
            },
            ureq::Error::Json(err) => err.into(),
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<Error> for declarative::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Http { message, status } => Self::Transport { message, status },
            Error::InvalidResponse(message) => Self::InvalidResponse(message),
        }
    }
}
