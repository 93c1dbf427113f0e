//! Provider configuration.
//!
//! Everything the client needs to reach the API is carried in one immutable
//! [`ProviderConfig`] built by the caller. Endpoint paths are static per check
//! type and joined onto the configured base URL.

use std::fmt;
use std::time::Duration;

/// Base URL of the StatusCake v1 API.
pub const DEFAULT_API_BASE: &str = "https://app.statuscake.com/API";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Account credentials, sent as the `Username` and `API` headers.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    api_key: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

// The API key must never reach a log line.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Immutable connection settings for [`crate::HttpProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    api_base: String,
    credentials: Credentials,
    timeout: Duration,
}

impl ProviderConfig {
    /// Configuration for the public API with the default timeout.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use another base URL (self-hosted proxy, test server).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for an endpoint path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

/// Endpoint layout of one check type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    /// `GET`: full listing.
    pub list: &'static str,
    /// `GET ?<id_param>=<id>`: full detail. `None` when the API has no
    /// detail call and listing entries are already complete.
    pub detail: Option<&'static str>,
    /// `PUT` form: create without an id, update with one.
    pub update: &'static str,
    /// `DELETE ?<id_param>=<id>`.
    pub delete: &'static str,
    /// Parameter naming the remote identifier on update, detail and delete.
    pub id_param: &'static str,
    /// Payload keys the API rejects on update.
    pub update_omits: &'static [&'static str],
}

pub static UPTIME_ENDPOINTS: Endpoints = Endpoints {
    list: "/Tests",
    detail: Some("/Tests/Details"),
    update: "/Tests/Update",
    delete: "/Tests/Details",
    id_param: "TestID",
    update_omits: &[],
};

pub static SSL_ENDPOINTS: Endpoints = Endpoints {
    list: "/SSL",
    detail: None,
    update: "/SSL/Update",
    delete: "/SSL/Update",
    id_param: "id",
    update_omits: &["domain"],
};
