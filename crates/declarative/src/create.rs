//! Create-only flows.
//!
//! Unlike apply, creation never checks for an existing resource: the API's
//! 409 answer is turned into an "already exists" error that points at
//! `apply`.

use crate::error::{Error, Result};
use crate::gate::VersionGate;
use crate::manifest::Manifest;
use crate::reconcile::{ApplyOptions, Outcome, create_children, report_preview};
use crate::report::{Action, Reporter, StatusLine};
use dataplane::{Method, ResourceClient, paths};
use serde_json::Value;

/// Validate a manifest and check that its kind can be created.
pub fn check_creatable(manifest: &Manifest) -> Result<()> {
    manifest.validate()?;
    if matches!(manifest, Manifest::Global(_) | Manifest::Defaults(_)) {
        return Err(Error::unsupported("create", manifest.kind().as_str()));
    }
    Ok(())
}

/// Create the resource a manifest describes.
///
/// Supported kinds are Backend, Frontend, Server and Userlist. Backends and
/// frontends are created together with their children.
pub fn create(
    client: &dyn ResourceClient,
    reporter: &mut dyn Reporter,
    manifest: &Manifest,
    options: ApplyOptions,
) -> Result<Outcome> {
    check_creatable(manifest)?;
    if options.is_preview() {
        return report_preview(reporter, manifest, options);
    }

    let gate = VersionGate::new(client);
    let kind = manifest.kind().lower();
    let name = manifest.display_name();
    let payload = Value::Object(manifest.to_wire()?);
    let classify = |err: Error| Error::from_api("create", kind, &name, err);

    match manifest {
        Manifest::Backend(backend) => {
            gate.write(Method::Post, paths::BACKENDS, Some(&payload))
                .map_err(classify)?;
            create_children(gate, reporter, kind, &backend.name, &backend.servers)?;
        }
        Manifest::Frontend(frontend) => {
            gate.write(Method::Post, paths::FRONTENDS, Some(&payload))
                .map_err(classify)?;
            create_children(gate, reporter, kind, &frontend.name, &frontend.binds)?;
        }
        Manifest::Server(server) => {
            let backend = server.parent_name().unwrap_or_default();
            gate.write(Method::Post, &paths::servers(backend), Some(&payload))
                .map_err(classify)?;
        }
        Manifest::Userlist(_) => {
            gate.write(Method::Post, paths::USERLISTS, Some(&payload))
                .map_err(classify)?;
        }
        Manifest::Global(_) | Manifest::Defaults(_) => {
            return Err(Error::unsupported("create", manifest.kind().as_str()));
        }
    }

    reporter.status(&StatusLine::new(kind, name.as_str(), Action::Created));
    Ok(Outcome::Applied(Action::Created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::DRY_RUN_NOTICE;
    use crate::manifest::{Backend, Server, Userlist, parse};
    use crate::report::RecordingReporter;
    use dataplane::MockClient;
    use serde_json::json;

    fn backend() -> Manifest {
        let mut backend = Backend::new("web");
        backend.mode = "http".to_string();
        backend.servers.push(Server::new("s1", "h", 80));
        Manifest::Backend(backend)
    }

    #[test]
    fn test_create_backend() {
        let mock = MockClient::new();
        let mut reporter = RecordingReporter::default();
        let outcome = create(&mock, &mut reporter, &backend(), ApplyOptions::default()).unwrap();

        assert_eq!(outcome, Outcome::Applied(Action::Created));
        assert_eq!(
            reporter.rendered(),
            vec!["server/web/s1 created", "backend/web created"]
        );
        assert!(mock.object(&paths::server("web", "s1")).is_some());
    }

    #[test]
    fn test_create_existing_suggests_apply() {
        let mock = MockClient::new();
        mock.insert(paths::backend("web"), json!({"name": "web"}));
        let mut reporter = RecordingReporter::default();

        let err = create(&mock, &mut reporter, &backend(), ApplyOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "backend \"web\" already exists (consider using 'haproxyctl apply -f ...')"
        );
        assert!(reporter.lines.is_empty());
    }

    #[test]
    fn test_create_does_not_check_existence() {
        let mock = MockClient::new();
        let mut reporter = RecordingReporter::default();
        let userlist = Manifest::Userlist(Userlist::new("ops"));
        create(&mock, &mut reporter, &userlist, ApplyOptions::default()).unwrap();

        assert!(
            !mock
                .calls()
                .iter()
                .any(|call| matches!(call, dataplane::Call::FetchOne(_)))
        );
        assert_eq!(reporter.rendered(), vec!["userlist/ops created"]);
    }

    #[test]
    fn test_create_server_in_missing_backend() {
        let mock = MockClient::new();
        let mut reporter = RecordingReporter::default();
        let mut server = Server::new("s1", "h", 80);
        server.backend = "nope".to_string();

        let err = create(
            &mock,
            &mut reporter,
            &Manifest::Server(server),
            ApplyOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "server \"nope/s1\" not found");
    }

    #[test]
    fn test_create_global_is_unsupported() {
        let mock = MockClient::new();
        let mut reporter = RecordingReporter::default();
        let manifest = parse(b"apiVersion: haproxyctl/v1\nkind: Global\n").unwrap();
        let err = create(&mock, &mut reporter, &manifest, ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_dry_run_makes_no_calls() {
        let mock = MockClient::new();
        let mut reporter = RecordingReporter::default();
        let options = ApplyOptions {
            output: None,
            dry_run: true,
        };
        let outcome = create(&mock, &mut reporter, &backend(), options).unwrap();

        assert_eq!(outcome, Outcome::Previewed);
        assert!(mock.calls().is_empty());
        assert!(reporter.messages[0].contains("kind: Backend"));
        assert_eq!(reporter.messages[1], DRY_RUN_NOTICE);
    }
}
