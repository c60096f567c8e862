//! # Declarative
//!
//! Manifest model and reconciliation engine for HAProxy configuration.
//!
//! A manifest declares the desired state of one configuration object. The
//! [`Reconciler`] compares it with the live configuration read through a
//! [`dataplane::ResourceClient`] and issues the smallest set of writes that
//! converges the two.
//!
//! ## Core Concepts
//!
//! - **Manifest**: a YAML document (`apiVersion: haproxyctl/v1`) of kind
//!   Backend, Frontend, Server, Userlist, Global or Defaults
//! - **Child**: a nested object reconciled by identity (servers by name,
//!   binds by address and port)
//! - **ChildDiff**: the delete/create/update split between two child sets
//! - **VersionGate**: fetches a fresh configuration version before every write
//! - **Reporter**: receives `<kind>/<name> <action>` status lines
//!
//! ## Example
//!
//! ```no_run
//! use declarative::{ApplyOptions, Reconciler, RecordingReporter};
//! use dataplane::MockClient;
//!
//! let client = MockClient::new();
//! let mut reporter = RecordingReporter::default();
//! let manifest = b"apiVersion: haproxyctl/v1
//! kind: Backend
//! name: web
//! mode: http
//! servers:
//!   - name: s1
//!     address: 10.0.0.1
//!     port: 8080
//! ";
//!
//! Reconciler::new(&client, &mut reporter)
//!     .apply_bytes(manifest, ApplyOptions::default())
//!     .unwrap();
//! assert_eq!(reporter.rendered(), ["server/web/s1 created", "backend/web created"]);
//! ```
//!
//! ## Flows
//!
//! Besides apply, the crate carries the create-only, delete, interactive
//! edit and certificate upload flows. All of them validate before touching
//! the network and report through the same [`Reporter`].

pub mod certificate;
pub mod create;
pub mod delete;
pub mod diff;
pub mod duration;
pub mod edit;
pub mod error;
pub mod gate;
pub mod identity;
pub mod live;
pub mod manifest;
pub mod reconcile;
pub mod render;
pub mod report;
pub mod wire;

// Re-export main types at crate root
pub use certificate::{CertificateRequest, CertificateSource, bundle_pem, upload_certificate};
pub use create::{check_creatable, create};
pub use delete::{DeleteTarget, delete};
pub use diff::{ChildDiff, children_match};
pub use duration::{Timeout, format_millis, parse_millis};
pub use edit::{EditSession, EditTarget, Editor, NO_CHANGES};
pub use error::{Error, Result};
pub use gate::VersionGate;
pub use identity::{BindKey, Child};
pub use manifest::{
    Backend, Bind, Defaults, Document, Frontend, Global, Group, Kind, Manifest, Resource, Server,
    User, Userlist, parse,
};
pub use reconcile::{ApplyOptions, DRY_RUN_NOTICE, Outcome, Reconciler, report_preview};
pub use render::{ManifestList, OutputFormat};
pub use report::{Action, RecordingReporter, Reporter, StatusLine};
