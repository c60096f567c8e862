//! Typed manifests for every managed resource kind.
//!
//! A manifest is a YAML document with an `apiVersion`/`kind` envelope and
//! the resource fields inlined next to it:
//!
//! ```yaml
//! apiVersion: haproxyctl/v1
//! kind: Backend
//! name: web
//! mode: http
//! servers:
//!   - name: s1
//!     address: 10.0.0.1
//!     port: 8080
//! ```
//!
//! Each kind implements [`Resource`], which covers validation and
//! conversion to and from the Data Plane API wire shape.

pub mod backend;
pub mod defaults;
pub mod frontend;
pub mod global;
pub mod server;
pub mod userlist;

pub use backend::Backend;
pub use defaults::Defaults;
pub use frontend::{Bind, Frontend};
pub use global::Global;
pub use server::Server;
pub use userlist::{Group, User, Userlist};

use crate::duration::Timeout;
use crate::error::{Error, Result};
use dataplane::WireObject;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The only supported manifest `apiVersion`.
pub const API_VERSION: &str = "haproxyctl/v1";

/// Resource kinds a manifest can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A backend with its servers.
    Backend,
    /// A frontend with its binds.
    Frontend,
    /// A single server of a backend.
    Server,
    /// A userlist with users and groups.
    Userlist,
    /// The `global` section.
    Global,
    /// The primary `defaults` section.
    Defaults,
}

impl Kind {
    /// All kinds, in documentation order.
    pub const ALL: [Self; 6] = [
        Self::Backend,
        Self::Frontend,
        Self::Server,
        Self::Userlist,
        Self::Global,
        Self::Defaults,
    ];

    /// Name as written in manifests.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backend => "Backend",
            Self::Frontend => "Frontend",
            Self::Server => "Server",
            Self::Userlist => "Userlist",
            Self::Global => "Global",
            Self::Defaults => "Defaults",
        }
    }

    /// Lower-case name used in status lines and messages.
    #[must_use]
    pub fn lower(&self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Frontend => "frontend",
            Self::Server => "server",
            Self::Userlist => "userlist",
            Self::Global => "global",
            Self::Defaults => "defaults",
        }
    }

    /// Match a manifest `kind` case-insensitively.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| Error::UnsupportedKind(raw.to_string()))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A manageable resource kind.
pub trait Resource: Clone + PartialEq + Serialize + DeserializeOwned {
    /// The manifest kind.
    const KIND: Kind;

    /// Name used in status lines (`<kind>/<name>`).
    fn display_name(&self) -> String;

    /// Check required fields, enums and durations. Never touches the network.
    fn validate(&self) -> Result<()>;

    /// Build the Data Plane API payload.
    fn to_wire(&self) -> Result<WireObject>;

    /// Read a live API object; unknown fields are ignored.
    fn from_wire(obj: &WireObject) -> Self;
}

/// A resource with its `apiVersion`/`kind` envelope, for rendering.
#[derive(Debug, Serialize)]
pub struct Document<'a, T> {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    #[serde(flatten)]
    resource: &'a T,
}

impl<'a, T: Resource> Document<'a, T> {
    /// Wrap a resource.
    pub fn new(resource: &'a T) -> Self {
        Self {
            api_version: API_VERSION,
            kind: T::KIND.as_str(),
            resource,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "apiVersion", default)]
    api_version: String,
    #[serde(default)]
    kind: String,
}

/// A parsed manifest of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Manifest {
    /// `kind: Backend`.
    Backend(Backend),
    /// `kind: Frontend`.
    Frontend(Frontend),
    /// `kind: Server`.
    Server(Server),
    /// `kind: Userlist`.
    Userlist(Userlist),
    /// `kind: Global`.
    Global(Global),
    /// `kind: Defaults`.
    Defaults(Defaults),
}

/// Decode a manifest document. No network access.
///
/// The envelope is checked first: a wrong `apiVersion` or an unknown `kind`
/// fails before the body is decoded.
pub fn parse(bytes: &[u8]) -> Result<Manifest> {
    let envelope: Envelope = serde_yaml::from_slice(bytes)?;
    if envelope.api_version != API_VERSION {
        return Err(Error::UnsupportedApiVersion(envelope.api_version));
    }

    let manifest = match Kind::parse(&envelope.kind)? {
        Kind::Backend => Manifest::Backend(serde_yaml::from_slice(bytes)?),
        Kind::Frontend => Manifest::Frontend(serde_yaml::from_slice(bytes)?),
        Kind::Server => Manifest::Server(serde_yaml::from_slice(bytes)?),
        Kind::Userlist => Manifest::Userlist(serde_yaml::from_slice(bytes)?),
        Kind::Global => Manifest::Global(serde_yaml::from_slice(bytes)?),
        Kind::Defaults => Manifest::Defaults(serde_yaml::from_slice(bytes)?),
    };
    Ok(manifest)
}

macro_rules! dispatch {
    ($self:expr, $res:ident => $body:expr) => {
        match $self {
            Manifest::Backend($res) => $body,
            Manifest::Frontend($res) => $body,
            Manifest::Server($res) => $body,
            Manifest::Userlist($res) => $body,
            Manifest::Global($res) => $body,
            Manifest::Defaults($res) => $body,
        }
    };
}

impl Manifest {
    /// The manifest kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Backend(_) => Kind::Backend,
            Self::Frontend(_) => Kind::Frontend,
            Self::Server(_) => Kind::Server,
            Self::Userlist(_) => Kind::Userlist,
            Self::Global(_) => Kind::Global,
            Self::Defaults(_) => Kind::Defaults,
        }
    }

    /// Name used in status lines.
    #[must_use]
    pub fn display_name(&self) -> String {
        dispatch!(self, r => r.display_name())
    }

    /// Validate the manifest.
    pub fn validate(&self) -> Result<()> {
        dispatch!(self, r => r.validate())
    }

    /// Build the wire payload.
    pub fn to_wire(&self) -> Result<WireObject> {
        dispatch!(self, r => r.to_wire())
    }

    /// Render the manifest as YAML with its envelope.
    pub fn to_yaml(&self) -> Result<String> {
        dispatch!(self, r => crate::render::to_yaml(&Document::new(r)))
    }
}

// =============================================================================
// Shared validation
// =============================================================================

/// Require `mode` to be `http` or `tcp`.
pub(crate) fn check_mode(kind: Kind, mode: &str) -> Result<()> {
    match mode {
        "http" | "tcp" => Ok(()),
        other => Err(Error::validation(
            kind.lower(),
            format!("invalid mode {other:?} (allowed: http, tcp)"),
        )),
    }
}

/// Require every timeout to parse.
pub(crate) fn check_timeouts(kind: Kind, timeouts: &[(&str, &Timeout)]) -> Result<()> {
    for (field, timeout) in timeouts {
        timeout
            .millis()
            .map_err(|err| Error::validation(kind.lower(), format!("{field}: {err}")))?;
    }
    Ok(())
}

/// Insert a timeout as integer milliseconds when set.
pub(crate) fn put_timeout(
    obj: &mut WireObject,
    kind: Kind,
    field: &str,
    timeout: &Timeout,
) -> Result<()> {
    let ms = timeout
        .millis()
        .map_err(|err| Error::validation(kind.lower(), format!("{field}: {err}")))?;
    crate::wire::put_nonzero(obj, field, ms);
    Ok(())
}

/// Read a timeout stored as milliseconds, tolerating duration strings.
pub(crate) fn read_timeout(obj: &WireObject, field: &str) -> Timeout {
    if let Some(raw) = crate::wire::get_str(obj, field) {
        return Timeout::new(raw);
    }
    crate::wire::get_int(obj, field)
        .and_then(|ms| u64::try_from(ms).ok())
        .map(Timeout::from_millis)
        .unwrap_or_default()
}

pub(crate) fn is_false(flag: &bool) -> bool {
    !*flag
}

pub(crate) fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        assert_eq!(Kind::parse("backend").unwrap(), Kind::Backend);
        assert_eq!(Kind::parse("FRONTEND").unwrap(), Kind::Frontend);
        assert_eq!(Kind::parse("UserList").unwrap(), Kind::Userlist);
    }

    #[test]
    fn test_kind_parse_rejects_unknown() {
        let err = Kind::parse("Listener").unwrap_err();
        assert!(matches!(err, Error::UnsupportedKind(ref k) if k == "Listener"));
    }

    #[test]
    fn test_parse_backend() {
        let yaml = "apiVersion: haproxyctl/v1\nkind: Backend\nname: web\nmode: http\n";
        let manifest = parse(yaml.as_bytes()).unwrap();
        assert_eq!(manifest.kind(), Kind::Backend);
        assert_eq!(manifest.display_name(), "web");
    }

    #[test]
    fn test_parse_rejects_wrong_api_version() {
        let yaml = "apiVersion: haproxyctl/v2\nkind: Backend\nname: web\n";
        assert!(matches!(
            parse(yaml.as_bytes()).unwrap_err(),
            Error::UnsupportedApiVersion(_)
        ));
    }

    #[test]
    fn test_parse_rejects_missing_api_version() {
        let yaml = "kind: Backend\nname: web\n";
        assert!(matches!(
            parse(yaml.as_bytes()).unwrap_err(),
            Error::UnsupportedApiVersion(ref v) if v.is_empty()
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let yaml = "apiVersion: haproxyctl/v1\nkind: Listener\nname: x\n";
        assert!(matches!(
            parse(yaml.as_bytes()).unwrap_err(),
            Error::UnsupportedKind(_)
        ));
    }

    #[test]
    fn test_parse_rejects_invalid_yaml() {
        assert!(matches!(
            parse(b"apiVersion: [unterminated").unwrap_err(),
            Error::Parse(_)
        ));
    }

    #[test]
    fn test_to_yaml_includes_envelope() {
        let yaml = "apiVersion: haproxyctl/v1\nkind: backend\nname: web\nmode: tcp\n";
        let rendered = parse(yaml.as_bytes()).unwrap().to_yaml().unwrap();
        assert!(rendered.starts_with("apiVersion: haproxyctl/v1\nkind: Backend\n"));
        assert!(rendered.contains("name: web"));
        assert!(rendered.contains("mode: tcp"));
    }

    #[test]
    fn test_check_mode() {
        assert!(check_mode(Kind::Backend, "http").is_ok());
        assert!(check_mode(Kind::Backend, "tcp").is_ok());
        let err = check_mode(Kind::Frontend, "udp").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid frontend configuration: invalid mode \"udp\" (allowed: http, tcp)"
        );
    }

    #[test]
    fn test_read_timeout_tolerates_strings() {
        let obj = serde_json::json!({"a": 30000, "b": "10s"});
        let obj = obj.as_object().unwrap();
        assert_eq!(read_timeout(obj, "a").as_str(), "30s");
        assert_eq!(read_timeout(obj, "b").as_str(), "10s");
        assert!(read_timeout(obj, "c").is_empty());
    }
}
