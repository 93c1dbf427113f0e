//! # Declarative
//!
//! Converge remote resources to a declared desired state.
//!
//! A resource type is described once by a static [`Schema`]. From there the
//! crate builds desired state from caller parameters, reads what the
//! provider holds, maps it into the same canonical form, computes the drift
//! and issues only the mutations needed to remove it.
//!
//! ## Core Concepts
//!
//! - **Schema**: canonical fields, wire names, remote mapping and required-field rules
//! - **DesiredResource**: validated desired state, built before any network access
//! - **NormalizedResource**: remote state expressed in canonical field names
//! - **Diff**: fields whose remote value differs from a set desired value
//! - **Reconciler**: the present/absent/list state machine, with dry-run previews
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{Intent, MockProvider, ReconcileOptions, reconcile};
//! use serde_json::json;
//!
//! let provider = MockProvider::new("TestID");
//! let params = json!({"name": "site1", "url": "https://a.test"});
//! let outcome = reconcile(
//!     &UPTIME,
//!     &provider,
//!     Intent::Present,
//!     params.as_object().unwrap(),
//!     ReconcileOptions::dry_run(true),
//! )?;
//! assert!(outcome.changed());
//! ```
//!
//! ## Provider Trait
//!
//! All remote access goes through [`Provider`]. The crate has no transport of
//! its own; [`MockProvider`] records calls for tests.

pub mod diff;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod provider;
pub mod reconciler;
pub mod report;
pub mod resource;
pub mod schema;
pub mod types;

// Re-export main types at crate root
pub use diff::diff;
pub use error::{Error, ErrorCategory, Result};
pub use fetch::{Fetcher, Found};
pub use normalize::{NormalizedResource, RawResource, normalize, remote_identity};
pub use provider::{Call, MockProvider, NO_DATA_UPDATED, Provider, ProviderResponse};
pub use reconciler::{Reconciler, reconcile};
pub use report::{DiffView, FieldValues, ListReport, ReconcileReport, Report};
pub use resource::{DesiredResource, Params, Payload};
pub use schema::{CanonicalField, Condition, FieldKind, Literal, RemoteSource, Schema};
pub use types::{
    Action, Diff, FieldChange, FieldValue, Intent, Listing, Outcome, ReconcileOptions,
    ReconcileResult, ReconcileSummary,
};
