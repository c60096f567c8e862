//! Core types shared by every Data Plane API client.
//!
//! This module contains the HTTP method set used for writes, the
//! loosely-typed [`WireObject`] that API responses decode into, and the
//! connection settings a client is constructed from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single decoded JSON object as returned by the API.
///
/// This is the only dynamically-typed value in the workspace. It is consumed
/// at the manifest boundary and never travels further.
pub type WireObject = serde_json::Map<String, serde_json::Value>;

/// HTTP methods that mutate configuration.
///
/// Reads go through dedicated client methods, so `GET` is deliberately
/// absent here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Create a resource in a collection.
    Post,
    /// Replace an existing resource.
    Put,
    /// Remove an existing resource.
    Delete,
}

impl Method {
    /// Get the method name as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Connection settings for the Data Plane API.
///
/// Mirrors the JSON credentials file written by `haproxyctl login`:
///
/// ```json
/// { "api_base_url": "http://lb:5555", "username": "admin", "password": "secret" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the API, with or without a `/vN` suffix.
    #[serde(default)]
    pub api_base_url: String,
    /// Basic auth username.
    #[serde(default)]
    pub username: String,
    /// Basic auth password.
    #[serde(default)]
    pub password: String,
}

impl ConnectionConfig {
    /// Create connection settings.
    pub fn new(
        api_base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// The base URL with a version prefix and no trailing slash.
    #[must_use]
    pub fn normalized_base_url(&self) -> String {
        normalize_base_url(&self.api_base_url)
    }
}

/// Ensure an API base URL carries a version prefix and no trailing slash.
///
/// Users may configure either `http://host:5555` or `http://host:5555/v3`;
/// URLs without an explicit `/v1`, `/v2` or `/v3` suffix default to v3.
///
/// # Example
///
/// ```
/// use dataplane::types::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://lb:5555/"), "http://lb:5555/v3");
/// assert_eq!(normalize_base_url("http://lb:5555/v2"), "http://lb:5555/v2");
/// ```
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    let base = raw.trim().trim_end_matches('/');

    if ["/v1", "/v2", "/v3"]
        .iter()
        .any(|suffix| base.ends_with(suffix))
    {
        return base.to_string();
    }

    format!("{base}/v3")
}
