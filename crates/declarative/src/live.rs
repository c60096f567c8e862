//! Read live configuration back into manifest views.
//!
//! These are the shapes `get -o yaml`, `describe` and `edit` show: parents
//! carry their children inline, and children drop their owner field since
//! the parent already names it.

use crate::error::{Error, Result};
use crate::identity::read_children;
use crate::manifest::{Backend, Bind, Defaults, Frontend, Global, Resource, Server, Userlist};
use crate::reconcile::{fetch_collection, fetch_optional};
use dataplane::{ResourceClient, WireObject, paths};

/// A backend with its servers.
pub fn backend(client: &dyn ResourceClient, name: &str) -> Result<Backend> {
    let live = client
        .fetch_one(&paths::backend(name))
        .map_err(|e| Error::from_api("get", "backend", name, e.into()))?;
    let mut view = Backend::from_wire(&live);
    view.servers = servers(client, name)?
        .into_iter()
        .map(|mut server| {
            server.backend.clear();
            server
        })
        .collect();
    Ok(view)
}

/// Servers of a backend, each naming its owner.
///
/// A missing backend is reported as such rather than as an empty list.
pub fn servers(client: &dyn ResourceClient, backend: &str) -> Result<Vec<Server>> {
    let objects = client
        .fetch_list(&paths::servers(backend))
        .map_err(|e| Error::from_api("get", "backend", backend, e.into()))?;
    Ok(read_children(backend, &objects))
}

/// A frontend with its binds.
pub fn frontend(client: &dyn ResourceClient, name: &str) -> Result<Frontend> {
    let live = client
        .fetch_one(&paths::frontend(name))
        .map_err(|e| Error::from_api("get", "frontend", name, e.into()))?;
    let binds = fetch_collection(client, &paths::binds(name))
        .map_err(|e| Error::request("fetch", "binds of frontend", name, e))?;

    let mut view = Frontend::from_wire(&live);
    view.binds = read_children::<Bind>(name, &binds);
    Ok(view)
}

/// A single userlist.
pub fn userlist(client: &dyn ResourceClient, name: &str) -> Result<Userlist> {
    client
        .fetch_one(&paths::userlist(name))
        .map(|obj| Userlist::from_wire(&obj))
        .map_err(|e| Error::from_api("get", "userlist", name, e.into()))
}

/// The raw `global` section. `None` when the API has none.
pub fn global_wire(client: &dyn ResourceClient) -> Result<Option<WireObject>> {
    let obj = fetch_optional(client, paths::GLOBAL)
        .map_err(|e| Error::from_api("get", "global", "config", e.into()))?;
    Ok(obj.filter(|obj| !obj.is_empty()))
}

/// The `global` section; an absent one reads as empty.
pub fn global(client: &dyn ResourceClient) -> Result<Global> {
    Ok(Global::from_wire(&global_wire(client)?.unwrap_or_default()))
}

/// All `defaults` sections, raw.
pub fn defaults_wire(client: &dyn ResourceClient) -> Result<Vec<WireObject>> {
    fetch_collection(client, paths::DEFAULTS)
        .map_err(|e| Error::from_api("get", "defaults", "config", e.into()))
}

/// The primary (first) `defaults` section.
pub fn defaults(client: &dyn ResourceClient) -> Result<Defaults> {
    defaults_wire(client)?
        .first()
        .map(Defaults::from_wire)
        .ok_or_else(|| Error::NotFound {
            kind: "defaults".to_string(),
            name: "config".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataplane::MockClient;
    use serde_json::json;

    #[test]
    fn test_backend_view_carries_servers_without_owner() {
        let mock = MockClient::new();
        mock.insert(paths::backend("web"), json!({"name": "web", "mode": "http"}));
        mock.insert(
            paths::server("web", "s1"),
            json!({"name": "s1", "address": "10.0.0.1", "port": 8080}),
        );

        let view = backend(&mock, "web").unwrap();
        assert_eq!(view.servers.len(), 1);
        assert_eq!(view.servers[0].address, "10.0.0.1");
        assert!(view.servers[0].backend.is_empty());
    }

    #[test]
    fn test_servers_of_missing_backend() {
        let mock = MockClient::new();
        let err = servers(&mock, "nope").unwrap_err();
        assert_eq!(err.to_string(), "backend \"nope\" not found");
    }

    #[test]
    fn test_frontend_view_keeps_bind_wire_names() {
        let mock = MockClient::new();
        mock.insert(paths::frontend("fe"), json!({"name": "fe", "mode": "http"}));
        mock.insert(
            paths::bind("fe", "http"),
            json!({"name": "http", "address": "*", "port": 80}),
        );

        let view = frontend(&mock, "fe").unwrap();
        assert_eq!(view.binds[0].wire_name.as_deref(), Some("http"));
    }

    #[test]
    fn test_missing_global_is_none() {
        let mock = MockClient::new();
        assert!(global_wire(&mock).unwrap().is_none());
        assert_eq!(global(&mock).unwrap(), Global::from_wire(&WireObject::new()));
    }

    #[test]
    fn test_defaults_requires_a_section() {
        let mock = MockClient::new();
        assert!(defaults(&mock).unwrap_err().is_not_found());

        mock.insert(paths::defaults("unnamed_defaults_1"), json!({"name": "unnamed_defaults_1"}));
        assert_eq!(defaults(&mock).unwrap().name, "unnamed_defaults_1");
    }
}
