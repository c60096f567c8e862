//! Error types for manifest handling and reconciliation.

use std::io;
use std::path::PathBuf;

/// Result type alias for declarative operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing, validating or applying manifests.
///
/// Parse and validation errors are always raised before any network call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manifest is not valid YAML or does not match the expected shape.
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A required field is missing or out of range.
    #[error("invalid {kind} configuration: {message}")]
    Validation {
        /// Lower-case resource kind.
        kind: String,
        /// What is wrong.
        message: String,
    },

    /// A duration field could not be converted to milliseconds.
    #[error("invalid duration {input:?}: {reason}")]
    Duration {
        /// The raw input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The manifest `kind` is not one this tool manages.
    #[error(
        "unsupported resource kind: {0} (supported: Backend, Frontend, Server, Userlist, Global, Defaults)"
    )]
    UnsupportedKind(String),

    /// The manifest `apiVersion` is not `haproxyctl/v1`.
    #[error("unsupported apiVersion {0:?} (expected haproxyctl/v1)")]
    UnsupportedApiVersion(String),

    /// The configuration version could not be obtained before a write.
    #[error("failed to fetch HAProxy configuration version: {0}")]
    Version(#[source] dataplane::Error),

    /// A client call failed.
    #[error(transparent)]
    Client(#[from] dataplane::Error),

    /// A step of a reconciliation failed.
    #[error("failed to {op} {kind} {name:?}: {source}")]
    Request {
        /// Operation that failed (`create`, `update`, `fetch`, ...).
        op: String,
        /// Lower-case resource kind.
        kind: String,
        /// Resource name.
        name: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// A child write failed while reconciling its parent.
    #[error("failed to reconcile {child} in {parent}: {source}")]
    Child {
        /// Parent identity, e.g. `backend/web`.
        parent: String,
        /// Child identity, e.g. `server/s1`.
        child: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// The API answered 409 to a create.
    #[error("{kind} {name:?} already exists (consider using 'haproxyctl apply -f ...')")]
    AlreadyExists {
        /// Lower-case resource kind.
        kind: String,
        /// Resource name.
        name: String,
    },

    /// The API answered 404 for the addressed resource.
    #[error("{kind} {name:?} not found")]
    NotFound {
        /// Lower-case resource kind.
        kind: String,
        /// Resource name.
        name: String,
    },

    /// Any other API failure of a single-resource operation.
    #[error("HAProxy API {op} {kind}/{name}: {source}")]
    Api {
        /// Operation that failed.
        op: String,
        /// Lower-case resource kind.
        kind: String,
        /// Resource name.
        name: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// An edit tried to change the resource name.
    #[error("renaming {kind} {from:?} to {to:?} is not supported")]
    Rename {
        /// Lower-case resource kind.
        kind: String,
        /// Name before editing.
        from: String,
        /// Name after editing.
        to: String,
    },

    /// The operation does not apply to this kind.
    #[error("{op} is not supported for kind {kind}")]
    Unsupported {
        /// Operation requested.
        op: String,
        /// Manifest kind.
        kind: String,
    },

    /// A local file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },

    /// The interactive editor could not be run.
    #[error("editor failed: {0}")]
    Editor(String),

    /// Output could not be rendered.
    #[error("failed to render output: {0}")]
    Render(String),
}

impl Error {
    /// Create a validation error.
    pub fn validation(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Wrap a failure with the operation and resource it concerned.
    pub fn request(
        op: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        source: impl Into<Error>,
    ) -> Self {
        Self::Request {
            op: op.into(),
            kind: kind.into(),
            name: name.into(),
            source: Box::new(source.into()),
        }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(op: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::Unsupported {
            op: op.into(),
            kind: kind.into(),
        }
    }

    /// Create a file read error.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a child failure with parent and child identity.
    pub fn child(parent: impl Into<String>, child: impl Into<String>, source: Error) -> Self {
        Self::Child {
            parent: parent.into(),
            child: child.into(),
            source: Box::new(source),
        }
    }

    /// Normalise an API failure of a single-resource command.
    ///
    /// 409 becomes [`Error::AlreadyExists`], 404 becomes [`Error::NotFound`],
    /// anything else is kept as [`Error::Api`].
    pub fn from_api(op: &str, kind: &str, name: &str, source: Error) -> Self {
        match source.status() {
            Some(409) => Self::AlreadyExists {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            Some(404) => Self::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            _ => Self::Api {
                op: op.to_string(),
                kind: kind.to_string(),
                name: name.to_string(),
                source: Box::new(source),
            },
        }
    }

    /// The innermost client error, if this failure came from the API.
    #[must_use]
    pub fn client_error(&self) -> Option<&dataplane::Error> {
        match self {
            Self::Client(err) | Self::Version(err) => Some(err),
            Self::Request { source, .. } | Self::Child { source, .. } | Self::Api { source, .. } => {
                source.client_error()
            }
            _ => None,
        }
    }

    /// HTTP status of the innermost API response, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.client_error().and_then(dataplane::Error::status)
    }

    /// Whether the innermost API response was a 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. }) || self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_conflict() {
        let err = Error::from_api(
            "create",
            "backend",
            "web",
            dataplane::Error::api(409, "exists").into(),
        );
        assert_eq!(
            err.to_string(),
            "backend \"web\" already exists (consider using 'haproxyctl apply -f ...')"
        );
    }

    #[test]
    fn test_from_api_not_found() {
        let err = Error::from_api(
            "delete",
            "frontend",
            "fe",
            dataplane::Error::api(404, "missing").into(),
        );
        assert_eq!(err.to_string(), "frontend \"fe\" not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_api_other() {
        let err = Error::from_api(
            "delete",
            "userlist",
            "ops",
            dataplane::Error::api(500, "boom").into(),
        );
        assert_eq!(
            err.to_string(),
            "HAProxy API delete userlist/ops: HAProxy API error (500): boom"
        );
    }

    #[test]
    fn test_from_api_looks_through_wrappers() {
        let inner = Error::request("create", "backend", "web", dataplane::Error::api(409, ""));
        let err = Error::from_api("create", "backend", "web", inner);
        assert!(matches!(err, Error::AlreadyExists { .. }));
    }

    #[test]
    fn test_child_error_display() {
        let err = Error::child(
            "backend/web",
            "server/s1",
            dataplane::Error::api(500, "boom").into(),
        );
        assert_eq!(
            err.to_string(),
            "failed to reconcile server/s1 in backend/web: HAProxy API error (500): boom"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_validation_display() {
        let err = Error::validation("backend", "backend name is required");
        assert_eq!(
            err.to_string(),
            "invalid backend configuration: backend name is required"
        );
    }

    #[test]
    fn test_unsupported_api_version_display() {
        let err = Error::UnsupportedApiVersion("v2".to_string());
        assert_eq!(
            err.to_string(),
            "unsupported apiVersion \"v2\" (expected haproxyctl/v1)"
        );
    }
}
