//! Identity and equality rules for child collections.
//!
//! Servers are keyed by name. Binds have no name in manifests, so they are
//! keyed by `(address, port)` and addressed through the name the API
//! assigned them.

use crate::error::Result;
use crate::manifest::{Bind, Resource, Server};
use dataplane::{WireObject, paths};
use std::fmt;

/// A resource nested under a parent (servers in a backend, binds in a
/// frontend).
pub trait Child: Clone {
    /// Natural identity within the parent.
    type Key: Ord + Clone + fmt::Display;

    /// Lower-case kind used in status lines.
    const NOUN: &'static str;

    /// Identity key, or `None` when identity fields are missing.
    fn key(&self) -> Option<Self::Key>;

    /// Semantic equality over the comparable fields only.
    fn same_as(&self, other: &Self) -> bool;

    /// Name the API addresses this child by, if known.
    fn wire_name(&self) -> Option<&str>;

    /// Take over the wire name of the matched live child.
    fn adopt_wire_name(&mut self, live: &Self);

    /// Collection endpoint under `parent`.
    fn collection(parent: &str) -> String;

    /// Item endpoint under `parent`.
    fn item_path(parent: &str, wire_name: &str) -> String;

    /// Write payload.
    fn payload(&self) -> Result<WireObject>;

    /// Read a live child of `parent`.
    fn read(parent: &str, obj: &WireObject) -> Self;
}

impl Child for Server {
    type Key = String;

    const NOUN: &'static str = "server";

    fn key(&self) -> Option<String> {
        if self.name.is_empty() || self.address.is_empty() || self.port == 0 {
            return None;
        }
        Some(self.name.clone())
    }

    fn same_as(&self, other: &Self) -> bool {
        self.name == other.name
            && self.address == other.address
            && self.port == other.port
            && self.weight == other.weight
            && self.ssl == other.ssl
    }

    fn wire_name(&self) -> Option<&str> {
        Some(self.name.as_str()).filter(|name| !name.is_empty())
    }

    fn adopt_wire_name(&mut self, _live: &Self) {}

    fn collection(parent: &str) -> String {
        paths::servers(parent)
    }

    fn item_path(parent: &str, wire_name: &str) -> String {
        paths::server(parent, wire_name)
    }

    fn payload(&self) -> Result<WireObject> {
        self.to_wire()
    }

    fn read(parent: &str, obj: &WireObject) -> Self {
        Self::from_wire_in(parent, obj)
    }
}

/// Identity of a bind: its listen address and port.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindKey {
    /// Listen address.
    pub address: String,
    /// Listen port.
    pub port: u16,
}

impl fmt::Display for BindKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl Child for Bind {
    type Key = BindKey;

    const NOUN: &'static str = "bind";

    fn key(&self) -> Option<BindKey> {
        if self.address.is_empty() || self.port == 0 {
            return None;
        }
        Some(BindKey {
            address: self.address.clone(),
            port: self.port,
        })
    }

    fn same_as(&self, other: &Self) -> bool {
        self.address == other.address && self.port == other.port && self.ssl == other.ssl
    }

    fn wire_name(&self) -> Option<&str> {
        self.wire_name.as_deref()
    }

    fn adopt_wire_name(&mut self, live: &Self) {
        self.wire_name.clone_from(&live.wire_name);
    }

    fn collection(parent: &str) -> String {
        paths::binds(parent)
    }

    fn item_path(parent: &str, wire_name: &str) -> String {
        paths::bind(parent, wire_name)
    }

    fn payload(&self) -> Result<WireObject> {
        Ok(self.to_wire())
    }

    fn read(_parent: &str, obj: &WireObject) -> Self {
        Self::from_wire(obj)
    }
}

/// Read a live child collection, dropping entries without identity.
pub fn read_children<T: Child>(parent: &str, objects: &[WireObject]) -> Vec<T> {
    objects
        .iter()
        .map(|obj| T::read(parent, obj))
        .filter(|child| child.key().is_some())
        .collect()
}
