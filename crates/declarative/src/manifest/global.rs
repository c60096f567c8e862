//! The `global` section.

use super::{Kind, Resource, is_false, is_zero};
use crate::error::Result;
use crate::wire;
use dataplane::WireObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The subset of the `global` section exposed through manifests.
///
/// Manifest keys are camelCase (`logSendHost`, `statsSocket`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Global {
    /// Run in the background.
    #[serde(default, skip_serializing_if = "is_false")]
    pub daemon: bool,
    /// Number of processes.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub nbproc: u64,
    /// Maximum concurrent connections.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub maxconn: u64,
    /// Log target.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log: String,
    /// Host name sent in syslog headers.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log_send_host: String,
    /// Stats socket path.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stats_socket: String,
    /// Stats socket timeout.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stats_timeout: String,
    /// Random spread of health checks, in percent.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub spread_checks: u64,
}

impl Resource for Global {
    const KIND: Kind = Kind::Global;

    fn display_name(&self) -> String {
        "config".to_string()
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn to_wire(&self) -> Result<WireObject> {
        let mut obj = WireObject::new();
        obj.insert("daemon".to_string(), Value::Bool(self.daemon));
        obj.insert("nbproc".to_string(), self.nbproc.into());
        obj.insert("maxconn".to_string(), self.maxconn.into());
        wire::put_str(&mut obj, "log", &self.log);
        wire::put_str(&mut obj, "log_send_hostname", &self.log_send_host);
        wire::put_str(&mut obj, "stats_socket", &self.stats_socket);
        wire::put_str(&mut obj, "stats_timeout", &self.stats_timeout);
        wire::put_nonzero(&mut obj, "spread_checks", self.spread_checks);
        Ok(obj)
    }

    fn from_wire(obj: &WireObject) -> Self {
        let daemon = match obj.get("daemon") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(state)) => state == wire::ENABLED,
            _ => false,
        };

        Self {
            daemon,
            nbproc: wire::unsigned(obj, "nbproc"),
            maxconn: wire::unsigned(obj, "maxconn"),
            log: wire::string(obj, "log"),
            log_send_host: wire::string(obj, "log_send_hostname"),
            stats_socket: wire::string(obj, "stats_socket"),
            stats_timeout: wire::string(obj, "stats_timeout"),
            spread_checks: wire::unsigned(obj, "spread_checks"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yaml_keys_are_camel_case() {
        let global: Global = serde_yaml::from_str(
            "daemon: true\nmaxconn: 4000\nlogSendHost: lb1\nstatsSocket: /run/haproxy.sock\nspreadChecks: 5\n",
        )
        .unwrap();
        assert!(global.daemon);
        assert_eq!(global.log_send_host, "lb1");
        assert_eq!(global.stats_socket, "/run/haproxy.sock");
        assert_eq!(global.spread_checks, 5);
    }

    #[test]
    fn test_to_wire_always_sends_core_fields() {
        let wire = Value::Object(Global::default().to_wire().unwrap());
        assert_eq!(wire, json!({"daemon": false, "nbproc": 0, "maxconn": 0}));
    }

    #[test]
    fn test_to_wire_maps_names() {
        let global = Global {
            maxconn: 4000,
            log_send_host: "lb1".to_string(),
            spread_checks: 5,
            ..Global::default()
        };
        let wire = global.to_wire().unwrap();
        assert_eq!(wire["log_send_hostname"], "lb1");
        assert_eq!(wire["spread_checks"], 5);
    }

    #[test]
    fn test_from_wire_daemon_variants() {
        let a = Global::from_wire(json!({"daemon": true}).as_object().unwrap());
        let b = Global::from_wire(json!({"daemon": "enabled"}).as_object().unwrap());
        let c = Global::from_wire(json!({"daemon": "disabled"}).as_object().unwrap());
        assert!(a.daemon);
        assert!(b.daemon);
        assert!(!c.daemon);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Global::default().display_name(), "config");
    }
}
