//! Check types and their canonical schemas.

use crate::config::{Endpoints, SSL_ENDPOINTS, UPTIME_ENDPOINTS};
use declarative::{CanonicalField, Condition, FieldKind, Literal, RemoteSource, Schema};
use std::fmt;

/// A kind of StatusCake check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckType {
    Uptime,
    Ssl,
}

impl CheckType {
    pub const ALL: [Self; 2] = [Self::Uptime, Self::Ssl];

    #[must_use]
    pub fn schema(self) -> &'static Schema {
        match self {
            Self::Uptime => &UPTIME,
            Self::Ssl => &SSL,
        }
    }

    #[must_use]
    pub fn endpoints(self) -> &'static Endpoints {
        match self {
            Self::Uptime => &UPTIME_ENDPOINTS,
            Self::Ssl => &SSL_ENDPOINTS,
        }
    }

    /// Key used for this check type in declaration files and on the command line.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Uptime => "uptime",
            Self::Ssl => "ssl",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema().resource)
    }
}

static UPTIME_FIELDS: &[CanonicalField] = &[
    CanonicalField::new("name", "WebsiteName", FieldKind::String),
    CanonicalField::new("url", "WebsiteURL", FieldKind::String)
        .from_remote(RemoteSource::Renamed("URI")),
    CanonicalField::new("check_rate", "CheckRate", FieldKind::Int)
        .ignored()
        .with_default(Literal::Int(300)),
    CanonicalField::new("test_type", "TestType", FieldKind::String)
        .with_default(Literal::Text("HTTP")),
    CanonicalField::new("tags", "TestTags", FieldKind::CommaList)
        .from_remote(RemoteSource::Renamed("Tags")),
    CanonicalField::new("contact_group", "ContactGroup", FieldKind::String).from_remote(
        RemoteSource::FirstElement {
            key: "ContactGroups",
            member: Some("ID"),
        },
    ),
    CanonicalField::new("paused", "Paused", FieldKind::Bool),
    CanonicalField::new("node_locations", "NodeLocations", FieldKind::CommaList),
    CanonicalField::new("confirmation", "Confirmation", FieldKind::Int),
    CanonicalField::new("timeout", "Timeout", FieldKind::Int),
    CanonicalField::new("status_codes", "StatusCodes", FieldKind::CommaList),
    CanonicalField::new("host", "WebsiteHost", FieldKind::String),
    CanonicalField::new("custom_header", "CustomHeader", FieldKind::String).json_text(),
    CanonicalField::new("follow_redirect", "FollowRedirect", FieldKind::Bool),
    CanonicalField::new("enable_ssl_alert", "EnableSSLAlert", FieldKind::Bool),
    CanonicalField::new("find_string", "FindString", FieldKind::String),
    CanonicalField::new("port", "Port", FieldKind::Int),
    CanonicalField::new("do_not_find", "DoNotFind", FieldKind::Bool),
    CanonicalField::new("post_raw", "PostRaw", FieldKind::String).json_text(),
    CanonicalField::new("basic_user", "BasicUser", FieldKind::String),
    CanonicalField::new("basic_pass", "BasicPass", FieldKind::String),
];

/// Uptime (HTTP, TCP, ...) test.
pub static UPTIME: Schema = Schema {
    resource: "uptime test",
    identity: "name",
    id_key: "TestID",
    fields: UPTIME_FIELDS,
    required_present: &["name", "url"],
    conditions: &[Condition {
        when: "test_type",
        equals: "TCP",
        requires: "port",
    }],
};

static SSL_FIELDS: &[CanonicalField] = &[
    CanonicalField::new("domain", "domain", FieldKind::String),
    CanonicalField::new("check_rate", "checkrate", FieldKind::Int)
        .ignored()
        .with_default(Literal::Int(3600)),
    CanonicalField::new("contact_group", "contact_groups", FieldKind::Int).from_remote(
        RemoteSource::FirstElement {
            key: "contact_groups",
            member: None,
        },
    ),
    CanonicalField::new("alert_at", "alert_at", FieldKind::CommaList)
        .with_default(Literal::Text("1,7,30")),
    CanonicalField::new("alert_expiry", "alert_expiry", FieldKind::Bool)
        .with_default(Literal::Bool(true)),
    CanonicalField::new("alert_reminder", "alert_reminder", FieldKind::Bool)
        .with_default(Literal::Bool(true)),
    CanonicalField::new("alert_broken", "alert_broken", FieldKind::Bool)
        .with_default(Literal::Bool(true)),
    CanonicalField::new("alert_mixed", "alert_mixed", FieldKind::Bool)
        .with_default(Literal::Bool(true)),
];

/// SSL certificate test.
pub static SSL: Schema = Schema {
    resource: "SSL test",
    identity: "domain",
    id_key: "id",
    fields: SSL_FIELDS,
    required_present: &["domain", "contact_group"],
    conditions: &[],
};
