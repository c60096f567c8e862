//! # dataplane
//!
//! Blocking client for the HAProxy Data Plane API (v3).
//!
//! This crate provides:
//! - The [`ResourceClient`] trait used by the reconciliation engine
//! - [`HttpClient`], a `ureq` implementation with basic auth
//! - [`MockClient`], an in-memory resource tree that records every call
//! - Endpoint path builders in [`paths`]
//!
//! ## Example
//!
//! ```no_run
//! use dataplane::{ConnectionConfig, HttpClient, ResourceClient, paths};
//!
//! let client = HttpClient::new(&ConnectionConfig::new("http://lb:5555", "admin", "secret"));
//!
//! for backend in client.fetch_list(paths::BACKENDS).unwrap() {
//!     println!("{}", backend["name"]);
//! }
//! ```
//!
//! ## Configuration versions
//!
//! Every mutating configuration call must carry the current configuration
//! version as `?version=N`. Callers fetch it with
//! [`ResourceClient::fetch_version`] immediately before each write; the API
//! rejects stale versions with HTTP 409.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod paths;
pub mod types;

pub use client::http::HttpClient;
pub use client::{Call, MockClient, ResourceClient};
pub use error::{Error, ErrorCategory, Result};
pub use types::{ConnectionConfig, Method, WireObject};
