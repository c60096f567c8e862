//! Backend manifests.

use super::{Kind, Resource, Server, check_mode, check_timeouts, is_false, put_timeout, read_timeout};
use crate::duration::Timeout;
use crate::error::{Error, Result};
use crate::wire;
use dataplane::WireObject;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// A backend and the servers it balances across.
///
/// `tcpka` and `redispatch` are plain booleans here; the API spells them as
/// `tcpka: enabled` and `redispatch: {enabled: enabled}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backend {
    /// Backend name.
    #[serde(default)]
    pub name: String,
    /// `http` or `tcp`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mode: String,
    /// Balancing settings, e.g. `algorithm: roundrobin`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub balance: BTreeMap<String, String>,
    /// HTTP health check parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub httpchk_params: BTreeMap<String, String>,
    /// Cookie persistence settings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cookie: BTreeMap<String, String>,
    /// Log targets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub log: Vec<Map<String, Value>>,
    /// Settings applied to every server.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub default_server: Map<String, Value>,
    /// `X-Forwarded-For` settings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub forwardfor: BTreeMap<String, String>,
    /// `http-request` rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http_request_rules: Vec<Map<String, Value>>,
    /// `http-response` rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http_response_rules: Vec<Map<String, Value>>,
    /// `tcp-request` rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tcp_request_rules: Vec<Map<String, Value>>,
    /// Custom error pages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_files: Vec<Map<String, Value>>,
    /// `timeout client`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_client: Timeout,
    /// `timeout http-keep-alive`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_http_keep_alive: Timeout,
    /// `timeout http-request`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_http_request: Timeout,
    /// `timeout queue`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_queue: Timeout,
    /// `timeout server`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_server: Timeout,
    /// `timeout server-fin`.
    #[serde(default, skip_serializing_if = "Timeout::is_empty")]
    pub timeout_server_fin: Timeout,
    /// TCP keep-alives.
    #[serde(default, skip_serializing_if = "is_false")]
    pub tcpka: bool,
    /// Redispatch on connection failure.
    #[serde(default, skip_serializing_if = "is_false")]
    pub redispatch: bool,
    /// Source address settings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub source: BTreeMap<String, String>,
    /// Servers of this backend.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
}

impl Backend {
    /// Create an empty backend.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn timeouts(&self) -> [(&'static str, &Timeout); 6] {
        [
            ("timeout_client", &self.timeout_client),
            ("timeout_http_keep_alive", &self.timeout_http_keep_alive),
            ("timeout_http_request", &self.timeout_http_request),
            ("timeout_queue", &self.timeout_queue),
            ("timeout_server", &self.timeout_server),
            ("timeout_server_fin", &self.timeout_server_fin),
        ]
    }

    /// Compare everything except the server list.
    #[must_use]
    pub fn same_settings(&self, other: &Self) -> bool {
        let strip = |b: &Self| Self {
            servers: Vec::new(),
            ..b.clone()
        };
        strip(self) == strip(other)
    }
}

impl Resource for Backend {
    const KIND: Kind = Kind::Backend;

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::validation("backend", "backend name is required"));
        }
        check_mode(Kind::Backend, &self.mode)?;
        for server in &self.servers {
            server.check_identity()?;
        }
        check_timeouts(Kind::Backend, &self.timeouts())
    }

    fn to_wire(&self) -> Result<WireObject> {
        let mut obj = WireObject::new();
        obj.insert("name".to_string(), Value::String(self.name.clone()));
        wire::put_str(&mut obj, "mode", &self.mode);
        wire::put_string_map(&mut obj, "balance", &self.balance);
        wire::put_string_map(&mut obj, "httpchk_params", &self.httpchk_params);
        wire::put_string_map(&mut obj, "cookie", &self.cookie);
        wire::put_object_list(&mut obj, "log", &self.log);
        wire::put_object(&mut obj, "default_server", &self.default_server);
        wire::put_string_map(&mut obj, "forwardfor", &self.forwardfor);
        wire::put_object_list(&mut obj, "http_request_rules", &self.http_request_rules);
        wire::put_object_list(&mut obj, "http_response_rules", &self.http_response_rules);
        wire::put_object_list(&mut obj, "tcp_request_rules", &self.tcp_request_rules);
        wire::put_object_list(&mut obj, "error_files", &self.error_files);
        for (field, timeout) in self.timeouts() {
            put_timeout(&mut obj, Kind::Backend, field, timeout)?;
        }
        wire::put_enabled(&mut obj, "tcpka", self.tcpka);
        if self.redispatch {
            obj.insert("redispatch".to_string(), json!({ "enabled": wire::ENABLED }));
        }
        wire::put_string_map(&mut obj, "source", &self.source);
        Ok(obj)
    }

    fn from_wire(obj: &WireObject) -> Self {
        let redispatch = wire::object(obj, "redispatch");

        Self {
            name: wire::string(obj, "name"),
            mode: wire::string(obj, "mode"),
            balance: wire::string_map(obj, "balance"),
            httpchk_params: wire::string_map(obj, "httpchk_params"),
            cookie: wire::string_map(obj, "cookie"),
            log: wire::object_list(obj, "log"),
            default_server: wire::object(obj, "default_server"),
            forwardfor: wire::string_map(obj, "forwardfor"),
            http_request_rules: wire::object_list(obj, "http_request_rules"),
            http_response_rules: wire::object_list(obj, "http_response_rules"),
            tcp_request_rules: wire::object_list(obj, "tcp_request_rules"),
            error_files: wire::object_list(obj, "error_files"),
            timeout_client: read_timeout(obj, "timeout_client"),
            timeout_http_keep_alive: read_timeout(obj, "timeout_http_keep_alive"),
            timeout_http_request: read_timeout(obj, "timeout_http_request"),
            timeout_queue: read_timeout(obj, "timeout_queue"),
            timeout_server: read_timeout(obj, "timeout_server"),
            timeout_server_fin: read_timeout(obj, "timeout_server_fin"),
            tcpka: wire::is_enabled(obj, "tcpka"),
            redispatch: wire::is_enabled(&redispatch, "enabled"),
            source: wire::string_map(obj, "source"),
            servers: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(yaml: &str) -> Backend {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_validate_requires_name_and_mode() {
        let err = Backend::default().validate().unwrap_err();
        assert!(err.to_string().contains("backend name is required"));

        let err = Backend::new("web").validate().unwrap_err();
        assert!(err.to_string().contains("invalid mode"));
    }

    #[test]
    fn test_validate_checks_servers() {
        let backend = manifest("name: web\nmode: http\nservers:\n  - name: s1\n    address: h\n");
        let err = backend.validate().unwrap_err();
        assert!(err.to_string().contains("each server must have name, address, and port"));
    }

    #[test]
    fn test_validate_rejects_bad_timeout() {
        let backend = manifest("name: web\nmode: http\ntimeout_server: not-a-duration\n");
        let err = backend.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_server"));
    }

    #[test]
    fn test_to_wire_converts_timeouts_and_flags() {
        let backend = manifest(
            "name: web\nmode: http\nbalance:\n  algorithm: roundrobin\n\
             timeout_client: 30s\ntimeout_server: 5000\ntimeout_queue: ''\n\
             tcpka: true\nredispatch: true\n",
        );
        let wire = Value::Object(backend.to_wire().unwrap());
        assert_eq!(
            wire,
            json!({
                "name": "web",
                "mode": "http",
                "balance": {"algorithm": "roundrobin"},
                "timeout_client": 30000,
                "timeout_server": 5000,
                "tcpka": "enabled",
                "redispatch": {"enabled": "enabled"}
            })
        );
    }

    #[test]
    fn test_to_wire_never_includes_servers() {
        let backend = manifest(
            "name: web\nmode: http\nservers:\n  - name: s1\n    address: h\n    port: 80\n",
        );
        assert!(!backend.to_wire().unwrap().contains_key("servers"));
    }

    #[test]
    fn test_from_wire_reads_modeled_fields() {
        let obj = json!({
            "name": "web",
            "mode": "http",
            "balance": {"algorithm": "leastconn"},
            "timeout_server": 30000,
            "tcpka": "enabled",
            "redispatch": {"enabled": "enabled", "interval": 0},
            "id": 7,
            "unknown": "ignored"
        });
        let backend = Backend::from_wire(obj.as_object().unwrap());
        assert_eq!(backend.name, "web");
        assert_eq!(backend.balance["algorithm"], "leastconn");
        assert_eq!(backend.timeout_server.as_str(), "30s");
        assert!(backend.tcpka);
        assert!(backend.redispatch);
    }

    #[test]
    fn test_same_settings_ignores_servers_and_timeout_spelling() {
        let a = manifest("name: web\nmode: http\ntimeout_server: 30000\n");
        let mut b = manifest("name: web\nmode: http\ntimeout_server: 30s\n");
        b.servers.push(Server::new("s1", "h", 80));
        assert!(a.same_settings(&b));

        b.mode = "tcp".to_string();
        assert!(!a.same_settings(&b));
    }

    #[test]
    fn test_wire_round_trip_is_equal() {
        let backend = manifest(
            "name: web\nmode: tcp\ncookie:\n  name: SRV\ntimeout_client: 1m30s\nredispatch: true\n",
        );
        let back = Backend::from_wire(&backend.to_wire().unwrap());
        assert!(backend.same_settings(&back));
    }
}
