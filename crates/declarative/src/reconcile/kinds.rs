//! Per-kind apply logic.

use super::{Reconciler, create_children, fetch_collection, fetch_optional, reconcile_children};
use crate::diff::children_match;
use crate::error::{Error, Result};
use crate::identity::{Child, read_children};
use crate::manifest::{Backend, Bind, Defaults, Frontend, Global, Resource, Server, Userlist};
use crate::report::Action;
use dataplane::{Method, WireObject, paths};
use serde_json::Value;

impl Reconciler<'_> {
    pub(super) fn apply_backend(&mut self, desired: &Backend) -> Result<Action> {
        let name = desired.name.as_str();
        let payload = Value::Object(desired.to_wire()?);

        let live = fetch_optional(self.client, &paths::backend(name))
            .map_err(|e| Error::request("check existence of", "backend", name, e))?;
        let Some(live) = live else {
            self.gate()
                .write(Method::Post, paths::BACKENDS, Some(&payload))
                .map_err(|e| Error::request("create", "backend", name, e))?;
            create_children(self.gate(), self.reporter, "backend", name, &desired.servers)?;
            return Ok(Action::Created);
        };

        let before: Vec<Server> = read_children(name, &self.fetch_children::<Server>("backend", name)?);
        if Backend::from_wire(&live).same_settings(desired)
            && children_match(&before, &desired.servers)
        {
            return Ok(Action::Unchanged);
        }

        self.gate()
            .write(Method::Put, &paths::backend(name), Some(&payload))
            .map_err(|e| Error::request("update", "backend", name, e))?;
        reconcile_children(
            self.gate(),
            self.reporter,
            "backend",
            name,
            &before,
            &desired.servers,
        )?;
        Ok(Action::Configured)
    }

    pub(super) fn apply_frontend(&mut self, desired: &Frontend) -> Result<Action> {
        let name = desired.name.as_str();
        let payload = Value::Object(desired.to_wire()?);

        let live = fetch_optional(self.client, &paths::frontend(name))
            .map_err(|e| Error::request("check existence of", "frontend", name, e))?;
        let Some(live) = live else {
            self.gate()
                .write(Method::Post, paths::FRONTENDS, Some(&payload))
                .map_err(|e| Error::request("create", "frontend", name, e))?;
            create_children(self.gate(), self.reporter, "frontend", name, &desired.binds)?;
            return Ok(Action::Created);
        };

        let before = read_children(name, &self.fetch_children::<Bind>("frontend", name)?);
        if Frontend::from_wire(&live).same_settings(desired)
            && children_match(&before, &desired.binds)
        {
            return Ok(Action::Unchanged);
        }

        self.gate()
            .write(Method::Put, &paths::frontend(name), Some(&payload))
            .map_err(|e| Error::request("update", "frontend", name, e))?;
        reconcile_children(
            self.gate(),
            self.reporter,
            "frontend",
            name,
            &before,
            &desired.binds,
        )?;
        Ok(Action::Configured)
    }

    pub(super) fn apply_server(&mut self, desired: &Server) -> Result<Action> {
        let backend = desired.parent_name().unwrap_or_default();
        let display = desired.display_name();
        let path = paths::server(backend, &desired.name);
        let payload = Value::Object(desired.to_wire()?);

        let live = fetch_optional(self.client, &path)
            .map_err(|e| Error::request("check existence of", "server", &display, e))?;
        match live {
            Some(obj) if Server::read(backend, &obj).same_as(desired) => Ok(Action::Unchanged),
            Some(_) => {
                self.gate()
                    .write(Method::Put, &path, Some(&payload))
                    .map_err(|e| Error::request("update", "server", &display, e))?;
                Ok(Action::Configured)
            }
            None => {
                self.gate()
                    .write(Method::Post, &paths::servers(backend), Some(&payload))
                    .map_err(|e| Error::request("create", "server", &display, e))?;
                Ok(Action::Created)
            }
        }
    }

    pub(super) fn apply_global(&mut self, desired: &Global) -> Result<Action> {
        let live = fetch_optional(self.client, paths::GLOBAL)
            .map_err(|e| Error::request("fetch", "global", "config", e))?
            .unwrap_or_default();
        if Global::from_wire(&live) == *desired {
            return Ok(Action::Unchanged);
        }

        let payload = Value::Object(desired.to_wire()?);
        self.gate()
            .write(Method::Put, paths::GLOBAL, Some(&payload))
            .map_err(|e| Error::request("update", "global", "config", e))?;
        Ok(Action::Configured)
    }

    pub(super) fn apply_defaults(&mut self, desired: &Defaults) -> Result<Action> {
        let live = fetch_collection(self.client, paths::DEFAULTS)
            .map_err(|e| Error::request("fetch", "defaults", "config", e))?
            .first()
            .map(Defaults::from_wire)
            .unwrap_or_default();

        let mut desired = desired.clone();
        if desired.name.is_empty() {
            desired.name.clone_from(&live.name);
        }
        if desired.name.is_empty() {
            return Err(Error::validation(
                "defaults",
                "defaults name is required (no existing defaults section found)",
            ));
        }

        if live == desired {
            return Ok(Action::Unchanged);
        }

        let payload = Value::Object(desired.to_wire()?);
        self.gate()
            .write(Method::Put, &paths::defaults(&desired.name), Some(&payload))
            .map_err(|e| Error::request("update", "defaults", &desired.name, e))?;
        Ok(Action::Configured)
    }

    pub(super) fn apply_userlist(&mut self, desired: &Userlist) -> Result<Action> {
        let name = desired.name.as_str();
        let path = paths::userlist(name);
        let payload = Value::Object(desired.to_wire()?);

        let live = fetch_optional(self.client, &path)
            .map_err(|e| Error::request("check existence of", "userlist", name, e))?;
        let action = match live {
            Some(obj) if Userlist::from_wire(&obj) == *desired => return Ok(Action::Unchanged),
            Some(_) => {
                self.gate()
                    .write(Method::Delete, &path, None)
                    .map_err(|e| Error::request("replace", "userlist", name, e))?;
                Action::Configured
            }
            None => Action::Created,
        };

        self.gate()
            .write(Method::Post, paths::USERLISTS, Some(&payload))
            .map_err(|e| Error::request("create", "userlist", name, e))?;
        Ok(action)
    }

    fn fetch_children<T: Child>(&self, parent_kind: &str, parent: &str) -> Result<Vec<WireObject>> {
        fetch_collection(self.client, &T::collection(parent)).map_err(|e| {
            Error::request(
                "fetch",
                format!("{}s of {parent_kind}", T::NOUN),
                parent,
                e,
            )
        })
    }
}
