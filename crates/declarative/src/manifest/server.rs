//! Server manifests.

use super::{Kind, Resource, is_false, is_zero};
use crate::error::{Error, Result};
use crate::wire;
use dataplane::WireObject;
use serde::{Deserialize, Serialize};

/// A server of a backend.
///
/// Inside a backend manifest `backend`/`parent` are left empty; as a
/// standalone manifest one of them names the owning backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Server name, unique within its backend.
    #[serde(default)]
    pub name: String,
    /// Host name or IP address.
    #[serde(default)]
    pub address: String,
    /// TCP port.
    #[serde(default)]
    pub port: u16,
    /// Load-balancing weight; 0 leaves the API default.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub weight: u32,
    /// Whether to talk TLS to the server.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ssl: bool,
    /// Owning backend.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub backend: String,
    /// Owning backend; takes precedence over `backend`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent: String,
}

impl Server {
    /// Create a server with the given identity.
    pub fn new(name: impl Into<String>, address: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            port,
            ..Self::default()
        }
    }

    /// The owning backend: `parent`, falling back to `backend`.
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        [self.parent.as_str(), self.backend.as_str()]
            .into_iter()
            .find(|name| !name.is_empty())
    }

    /// Check the identity fields every server needs, standalone or nested.
    pub(crate) fn check_identity(&self) -> Result<()> {
        if self.name.is_empty() || self.address.is_empty() || self.port == 0 {
            return Err(Error::validation(
                Kind::Server.lower(),
                "each server must have name, address, and port",
            ));
        }
        Ok(())
    }

    /// Read a server under `backend`.
    #[must_use]
    pub fn from_wire_in(backend: &str, obj: &WireObject) -> Self {
        let mut server = Self::from_wire(obj);
        server.backend = backend.to_string();
        server
    }
}

impl Resource for Server {
    const KIND: Kind = Kind::Server;

    fn display_name(&self) -> String {
        match self.parent_name() {
            Some(parent) => format!("{parent}/{}", self.name),
            None => self.name.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::validation("server", "server name is required"));
        }
        if self.parent_name().is_none() {
            return Err(Error::validation(
                "server",
                "server must specify parent (backend)",
            ));
        }
        if self.address.is_empty() {
            return Err(Error::validation("server", "server address is required"));
        }
        if self.port == 0 {
            return Err(Error::validation("server", "server port is required"));
        }
        Ok(())
    }

    fn to_wire(&self) -> Result<WireObject> {
        let mut obj = WireObject::new();
        wire::put_str(&mut obj, "name", &self.name);
        obj.insert("address".to_string(), self.address.clone().into());
        obj.insert("port".to_string(), self.port.into());
        wire::put_nonzero(&mut obj, "weight", u64::from(self.weight));
        wire::put_enabled(&mut obj, "ssl", self.ssl);
        Ok(obj)
    }

    fn from_wire(obj: &WireObject) -> Self {
        Self {
            name: wire::string(obj, "name"),
            address: wire::string(obj, "address"),
            port: wire::port(obj, "port"),
            weight: u32::try_from(wire::unsigned(obj, "weight")).unwrap_or(u32::MAX),
            ssl: wire::is_enabled(obj, "ssl"),
            backend: String::new(),
            parent: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_parent_falls_back_to_backend() {
        let mut server = Server::new("s1", "10.0.0.1", 80);
        assert_eq!(server.parent_name(), None);

        server.backend = "web".to_string();
        assert_eq!(server.parent_name(), Some("web"));

        server.parent = "api".to_string();
        assert_eq!(server.parent_name(), Some("api"));
        assert_eq!(server.display_name(), "api/s1");
    }

    #[test]
    fn test_validate_requires_parent() {
        let server = Server::new("s1", "10.0.0.1", 80);
        let err = server.validate().unwrap_err();
        assert!(err.to_string().contains("server must specify parent (backend)"));
    }

    #[test]
    fn test_validate_requires_port() {
        let mut server = Server::new("s1", "10.0.0.1", 0);
        server.backend = "web".to_string();
        assert!(server.validate().is_err());
    }

    #[test]
    fn test_to_wire() {
        let mut server = Server::new("s1", "10.0.0.1", 8080);
        server.weight = 50;
        server.ssl = true;
        server.backend = "web".to_string();

        let wire = Value::Object(server.to_wire().unwrap());
        assert_eq!(
            wire,
            json!({"name": "s1", "address": "10.0.0.1", "port": 8080, "weight": 50, "ssl": "enabled"})
        );
    }

    #[test]
    fn test_to_wire_omits_defaults() {
        let wire = Value::Object(Server::new("s1", "h", 1).to_wire().unwrap());
        assert_eq!(wire, json!({"name": "s1", "address": "h", "port": 1}));
    }

    #[test]
    fn test_from_wire_ignores_unknown_fields() {
        let obj = json!({
            "name": "s1", "address": "10.0.0.1", "port": 8080.0,
            "weight": 100, "ssl": "enabled", "check": "enabled", "id": 3
        });
        let server = Server::from_wire_in("web", obj.as_object().unwrap());
        assert_eq!(server.name, "s1");
        assert_eq!(server.port, 8080);
        assert_eq!(server.weight, 100);
        assert!(server.ssl);
        assert_eq!(server.backend, "web");
    }

    #[test]
    fn test_yaml_accepts_parent_or_backend() {
        let a: Server = serde_yaml::from_str("name: s1\naddress: h\nport: 1\nparent: web\n").unwrap();
        let b: Server = serde_yaml::from_str("name: s1\naddress: h\nport: 1\nbackend: web\n").unwrap();
        assert_eq!(a.parent_name(), b.parent_name());
    }
}
