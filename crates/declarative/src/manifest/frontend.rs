//! Frontend manifests.

use super::{Kind, Resource, check_mode, check_timeouts, is_false, put_timeout, read_timeout};
use crate::duration::Timeout;
use crate::error::{Error, Result};
use crate::wire;
use dataplane::WireObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A listening socket of a frontend.
///
/// Binds have no name in manifests. The API assigns one, which is kept in
/// `wire_name` for addressing updates and deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bind {
    /// Listen address, e.g. `0.0.0.0` or `*`.
    #[serde(default)]
    pub address: String,
    /// Listen port.
    #[serde(default)]
    pub port: u16,
    /// Whether to terminate TLS.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ssl: bool,
    /// Name assigned by the API.
    #[serde(skip)]
    pub wire_name: Option<String>,
}

impl Bind {
    /// Create a bind.
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            ..Self::default()
        }
    }

    /// Build the bind payload. The wire name is never sent.
    #[must_use]
    pub fn to_wire(&self) -> WireObject {
        let mut obj = WireObject::new();
        obj.insert("address".to_string(), Value::String(self.address.clone()));
        obj.insert("port".to_string(), self.port.into());
        wire::put_enabled(&mut obj, "ssl", self.ssl);
        obj
    }

    /// Read a live bind, keeping its API name.
    #[must_use]
    pub fn from_wire(obj: &WireObject) -> Self {
        Self {
            address: wire::string(obj, "address"),
            port: wire::port(obj, "port"),
            ssl: wire::is_enabled(obj, "ssl"),
            wire_name: wire::get_str(obj, "name")
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }
    }
}

impl fmt::Display for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// A frontend and its binds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontend {
    /// Frontend name.
    #[serde(default)]
    pub name: String,
    /// `http` or `tcp`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mode: String,
    /// Backend used when no rule matches.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_backend: String,
    /// `X-Forwarded-For` settings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub forwardfor: BTreeMap<String, String>,
    /// `timeout client`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_client: Timeout,
    /// `timeout http-request`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_http_request: Timeout,
    /// `timeout http-keep-alive`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_http_keep_alive: Timeout,
    /// `timeout queue`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_queue: Timeout,
    /// `timeout server`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_server: Timeout,
    /// Listening sockets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binds: Vec<Bind>,
}

impl Frontend {
    /// Create an empty frontend.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn timeouts(&self) -> [(&'static str, &Timeout); 5] {
        [
            ("timeout_client", &self.timeout_client),
            ("timeout_http_request", &self.timeout_http_request),
            ("timeout_http_keep_alive", &self.timeout_http_keep_alive),
            ("timeout_queue", &self.timeout_queue),
            ("timeout_server", &self.timeout_server),
        ]
    }

    /// Compare everything except the bind list.
    #[must_use]
    pub fn same_settings(&self, other: &Self) -> bool {
        let strip = |f: &Self| Self {
            binds: Vec::new(),
            ..f.clone()
        };
        strip(self) == strip(other)
    }
}

impl Resource for Frontend {
    const KIND: Kind = Kind::Frontend;

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::validation("frontend", "frontend name is required"));
        }
        check_mode(Kind::Frontend, &self.mode)?;
        if let Some(bind) = self
            .binds
            .iter()
            .find(|b| b.address.is_empty() || b.port == 0)
        {
            return Err(Error::validation(
                "frontend",
                format!("each bind must have address and port (got {bind})"),
            ));
        }
        check_timeouts(Kind::Frontend, &self.timeouts())
    }

    fn to_wire(&self) -> Result<WireObject> {
        let mut obj = WireObject::new();
        obj.insert("name".to_string(), Value::String(self.name.clone()));
        wire::put_str(&mut obj, "mode", &self.mode);
        wire::put_str(&mut obj, "default_backend", &self.default_backend);
        wire::put_string_map(&mut obj, "forwardfor", &self.forwardfor);
        for (field, timeout) in self.timeouts() {
            put_timeout(&mut obj, Kind::Frontend, field, timeout)?;
        }
        Ok(obj)
    }

    fn from_wire(obj: &WireObject) -> Self {
        Self {
            name: wire::string(obj, "name"),
            mode: wire::string(obj, "mode"),
            default_backend: wire::string(obj, "default_backend"),
            forwardfor: wire::string_map(obj, "forwardfor"),
            timeout_client: read_timeout(obj, "timeout_client"),
            timeout_http_request: read_timeout(obj, "timeout_http_request"),
            timeout_http_keep_alive: read_timeout(obj, "timeout_http_keep_alive"),
            timeout_queue: read_timeout(obj, "timeout_queue"),
            timeout_server: read_timeout(obj, "timeout_server"),
            binds: Vec::new(),
        }
    }
}
