//! Provider collaborator contract
//!
//! The reconciler talks to the remote service only through [`Provider`].
//! Transport, authentication and endpoint layout live behind it, so the
//! core can be driven by an HTTP client or by [`MockProvider`] in tests.

use crate::error::{Error, Result};
use crate::normalize::{RawResource, scalar_text};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Remote operations for one resource type.
///
/// Any `Err` is terminal for the current reconciliation; implementations
/// decide their own timeouts and must not report a failed call as an empty
/// listing.
pub trait Provider {
    /// Full listing of resources of this type.
    fn list(&self) -> Result<Vec<RawResource>>;

    /// Full detail of one resource. Listing entries may be partial.
    fn get_detail(&self, id: &str) -> Result<RawResource>;

    /// Create a resource from a wire payload.
    fn create(&self, payload: &[(&'static str, String)]) -> Result<ProviderResponse>;

    /// Update resource `id` with a full wire payload.
    fn update(&self, id: &str, payload: &[(&'static str, String)]) -> Result<ProviderResponse>;

    /// Delete resource `id`.
    fn delete(&self, id: &str) -> Result<ProviderResponse>;
}

/// Answer to a mutating call: `{Success, Message, Issues?}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderResponse {
    #[serde(rename = "Success", alias = "success", default)]
    pub success: bool,
    #[serde(rename = "Message", alias = "message", default)]
    pub message: String,
    #[serde(rename = "Issues", alias = "issues", default)]
    pub issues: Option<Value>,
}

/// Prefix of the provider message for an update that changed nothing.
pub const NO_DATA_UPDATED: &str = "No data has been updated";

impl ProviderResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            issues: None,
        }
    }

    pub fn failed(message: impl Into<String>, issues: Option<Value>) -> Self {
        Self {
            success: false,
            message: message.into(),
            issues,
        }
    }

    /// A refusal that only says nothing needed changing.
    pub fn is_benign(&self) -> bool {
        !self.success && self.message.starts_with(NO_DATA_UPDATED)
    }

    /// Per-field issues as `(field, reason)` pairs.
    ///
    /// An object maps field to reason; a list carries bare reasons.
    pub fn issues(&self) -> Vec<(String, String)> {
        match &self.issues {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(field, reason)| (field.clone(), scalar_text(reason)))
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|reason| (String::new(), scalar_text(reason)))
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![(String::new(), scalar_text(other))],
        }
    }

    /// Convert a non-benign refusal into a [`Error::Remote`].
    pub fn into_error(self) -> Error {
        let issues = self.issues();
        Error::Remote {
            message: self.message,
            issues,
        }
    }
}

/// A call observed by [`MockProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Detail(String),
    Create(Vec<(&'static str, String)>),
    Update(String, Vec<(&'static str, String)>),
    Delete(String),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Create(_) | Self::Update(..) | Self::Delete(_))
    }
}

/// In-memory provider for tests and offline previews.
///
/// Serves a fixed listing, answers every mutation with a configurable
/// response and records each call.
#[derive(Debug, Default)]
pub struct MockProvider {
    id_key: &'static str,
    listing: Vec<RawResource>,
    details: HashMap<String, RawResource>,
    response: ProviderResponse,
    transport_failure: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl MockProvider {
    /// Create an empty mock whose listing entries carry their id under `id_key`.
    pub fn new(id_key: &'static str) -> Self {
        Self {
            id_key,
            response: ProviderResponse::ok("OK"),
            ..Self::default()
        }
    }

    /// Add a listing entry, also served as its own detail.
    pub fn with_resource(mut self, raw: RawResource) -> Self {
        if let Some(id) = raw.get(self.id_key).map(scalar_text) {
            self.details.insert(id, raw.clone());
        }
        self.listing.push(raw);
        self
    }

    /// Serve a richer detail than the listing entry for `id`.
    pub fn with_detail(mut self, id: impl Into<String>, raw: RawResource) -> Self {
        self.details.insert(id.into(), raw);
        self
    }

    /// Answer every mutation with `response`.
    pub fn respond_with(mut self, response: ProviderResponse) -> Self {
        self.response = response;
        self
    }

    /// Fail every call at the transport level.
    pub fn fail_transport(mut self, message: impl Into<String>) -> Self {
        self.transport_failure = Some(message.into());
        self
    }

    /// Calls observed so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of mutating calls observed so far.
    pub fn mutations(&self) -> usize {
        self.calls().iter().filter(|c| c.is_mutation()).count()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        match &self.transport_failure {
            Some(message) => Err(Error::transport(message.clone(), None)),
            None => Ok(()),
        }
    }
}

impl Provider for MockProvider {
    fn list(&self) -> Result<Vec<RawResource>> {
        self.record(Call::List)?;
        Ok(self.listing.clone())
    }

    fn get_detail(&self, id: &str) -> Result<RawResource> {
        self.record(Call::Detail(id.to_string()))?;
        self.details
            .get(id)
            .cloned()
            .ok_or_else(|| Error::transport(format!("no resource with id {id}"), Some(404)))
    }

    fn create(&self, payload: &[(&'static str, String)]) -> Result<ProviderResponse> {
        self.record(Call::Create(payload.to_vec()))?;
        Ok(self.response.clone())
    }

    fn update(&self, id: &str, payload: &[(&'static str, String)]) -> Result<ProviderResponse> {
        self.record(Call::Update(id.to_string(), payload.to_vec()))?;
        Ok(self.response.clone())
    }

    fn delete(&self, id: &str) -> Result<ProviderResponse> {
        self.record(Call::Delete(id.to_string()))?;
        Ok(self.response.clone())
    }
}
