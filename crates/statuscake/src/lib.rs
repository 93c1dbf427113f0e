//! # statuscake
//!
//! StatusCake v1 REST provider for the [`declarative`] reconciliation core.
//!
//! This crate provides:
//! - The canonical schemas of uptime and SSL checks
//! - An immutable [`ProviderConfig`] (base URL, credentials, timeout)
//! - [`HttpProvider`], a blocking implementation of [`declarative::Provider`]
//!
//! ## Example
//!
//! ```no_run
//! use declarative::{Intent, ReconcileOptions, reconcile};
//! use statuscake::{CheckType, Credentials, HttpProvider, ProviderConfig};
//! use serde_json::json;
//!
//! let config = ProviderConfig::new(Credentials::new("alice", "api-key"));
//! let provider = HttpProvider::new(config, CheckType::Uptime);
//!
//! let params = json!({"name": "site1", "url": "https://example.com"});
//! let outcome = reconcile(
//!     CheckType::Uptime.schema(),
//!     &provider,
//!     Intent::Present,
//!     params.as_object().unwrap(),
//!     ReconcileOptions::dry_run(true),
//! )
//! .expect("reconcile failed");
//! println!("changed: {}", outcome.changed());
//! ```

#![warn(clippy::all)]

pub mod checks;
pub mod client;
pub mod config;
pub mod error;

pub use checks::{CheckType, SSL, UPTIME};
pub use client::HttpProvider;
pub use config::{Credentials, DEFAULT_API_BASE, DEFAULT_TIMEOUT, Endpoints, ProviderConfig};
pub use error::{Error, Result};
