//! The primary `defaults` section.

use super::{Kind, Resource, check_timeouts, put_timeout, read_timeout};
use crate::duration::Timeout;
use crate::error::Result;
use crate::wire;
use dataplane::WireObject;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A manifest view of a `defaults` section.
///
/// Timeouts travel as milliseconds like everywhere else; `balance` is the
/// algorithm name and maps to `{algorithm: ...}` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    /// Section name. Empty means "the current primary section".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// `http` or `tcp`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mode: String,
    /// `timeout client`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_client: Timeout,
    /// `timeout server`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_server: Timeout,
    /// `timeout connect`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_connect: Timeout,
    /// `timeout queue`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_queue: Timeout,
    /// `timeout tunnel`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_tunnel: Timeout,
    /// Balancing algorithm.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub balance: String,
    /// Log target.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log: String,
}

impl Defaults {
    fn timeouts(&self) -> [(&'static str, &Timeout); 5] {
        [
            ("timeout_client", &self.timeout_client),
            ("timeout_server", &self.timeout_server),
            ("timeout_connect", &self.timeout_connect),
            ("timeout_queue", &self.timeout_queue),
            ("timeout_tunnel", &self.timeout_tunnel),
        ]
    }

    /// Compare everything except the name.
    #[must_use]
    pub fn same_settings(&self, other: &Self) -> bool {
        let strip = |d: &Self| Self {
            name: String::new(),
            ..d.clone()
        };
        strip(self) == strip(other)
    }
}

impl Resource for Defaults {
    const KIND: Kind = Kind::Defaults;

    fn display_name(&self) -> String {
        "config".to_string()
    }

    fn validate(&self) -> Result<()> {
        check_timeouts(Kind::Defaults, &self.timeouts())
    }

    fn to_wire(&self) -> Result<WireObject> {
        let mut obj = WireObject::new();
        wire::put_str(&mut obj, "name", &self.name);
        wire::put_str(&mut obj, "mode", &self.mode);
        for (field, timeout) in self.timeouts() {
            put_timeout(&mut obj, Kind::Defaults, field, timeout)?;
        }
        if !self.balance.is_empty() {
            obj.insert("balance".to_string(), json!({ "algorithm": self.balance }));
        }
        wire::put_str(&mut obj, "log", &self.log);
        Ok(obj)
    }

    fn from_wire(obj: &WireObject) -> Self {
        let balance = match obj.get("balance") {
            Some(Value::String(algorithm)) => algorithm.clone(),
            Some(Value::Object(_)) => wire::string(&wire::object(obj, "balance"), "algorithm"),
            _ => String::new(),
        };

        Self {
            name: wire::string(obj, "name"),
            mode: wire::string(obj, "mode"),
            timeout_client: read_timeout(obj, "timeout_client"),
            timeout_server: read_timeout(obj, "timeout_server"),
            timeout_connect: read_timeout(obj, "timeout_connect"),
            timeout_queue: read_timeout(obj, "timeout_queue"),
            timeout_tunnel: read_timeout(obj, "timeout_tunnel"),
            balance,
            log: wire::string(obj, "log"),
        }
    }
}
