//! Delete flows.

use crate::error::{Error, Result};
use crate::gate::VersionGate;
use crate::manifest::Manifest;
use crate::report::{Action, Reporter, StatusLine};
use dataplane::{Method, ResourceClient, paths};

/// A resource to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    /// A backend and everything under it.
    Backend(String),
    /// A frontend and everything under it.
    Frontend(String),
    /// A userlist.
    Userlist(String),
    /// A stored certificate.
    Certificate(String),
    /// A server of a backend.
    Server {
        /// Owning backend.
        backend: String,
        /// Server name.
        name: String,
    },
}

impl DeleteTarget {
    /// Target of a manifest (Backend, Frontend, Server or Userlist).
    ///
    /// Only the identity is read: a manifest naming the resource is enough.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self> {
        let target = match manifest {
            Manifest::Backend(b) => Self::Backend(b.name.clone()),
            Manifest::Frontend(f) => Self::Frontend(f.name.clone()),
            Manifest::Userlist(u) => Self::Userlist(u.name.clone()),
            Manifest::Server(s) => {
                let backend = s.parent_name().ok_or_else(|| {
                    Error::validation("server", "server must specify parent (backend)")
                })?;
                Self::Server {
                    backend: backend.to_string(),
                    name: s.name.clone(),
                }
            }
            Manifest::Global(_) | Manifest::Defaults(_) => {
                return Err(Error::unsupported("delete", manifest.kind().as_str()));
            }
        };

        let name = match &target {
            Self::Backend(name)
            | Self::Frontend(name)
            | Self::Userlist(name)
            | Self::Certificate(name)
            | Self::Server { name, .. } => name,
        };
        if name.is_empty() {
            let kind = target.kind();
            return Err(Error::validation(kind, format!("{kind} name is required")));
        }
        Ok(target)
    }

    /// Lower-case kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Backend(_) => "backend",
            Self::Frontend(_) => "frontend",
            Self::Userlist(_) => "userlist",
            Self::Certificate(_) => "certificate",
            Self::Server { .. } => "server",
        }
    }

    /// Display name; servers are `backend/name`.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Backend(name)
            | Self::Frontend(name)
            | Self::Userlist(name)
            | Self::Certificate(name) => name.clone(),
            Self::Server { backend, name } => format!("{backend}/{name}"),
        }
    }

    /// Endpoint addressed by the DELETE.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Backend(name) => paths::backend(name),
            Self::Frontend(name) => paths::frontend(name),
            Self::Userlist(name) => paths::userlist(name),
            Self::Certificate(name) => paths::ssl_certificate(name),
            Self::Server { backend, name } => paths::server(backend, name),
        }
    }

    /// Storage endpoints take no version token.
    #[must_use]
    pub fn is_versioned(&self) -> bool {
        !matches!(self, Self::Certificate(_))
    }
}

/// Delete a resource and report `<kind>/<name> deleted`.
pub fn delete(
    client: &dyn ResourceClient,
    reporter: &mut dyn Reporter,
    target: &DeleteTarget,
) -> Result<()> {
    let gate = VersionGate::new(client);
    let path = target.path();
    let result = if target.is_versioned() {
        gate.write(Method::Delete, &path, None)
    } else {
        gate.write_unversioned(Method::Delete, &path, None)
    };
    result.map_err(|e| Error::from_api("delete", target.kind(), &target.name(), e))?;

    reporter.status(&StatusLine::new(
        target.kind(),
        target.name(),
        Action::Deleted,
    ));
    Ok(())
}
