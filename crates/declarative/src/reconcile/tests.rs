use super::*;
use crate::error::Error;
use crate::report::RecordingReporter;
use dataplane::{Call, Method, MockClient, paths};
use serde_json::json;

const BACKEND: &str = "\
apiVersion: haproxyctl/v1
kind: Backend
name: web
mode: http
balance:
  algorithm: roundrobin
timeout_server: 30s
servers:
  - name: s1
    address: 10.0.0.1
    port: 8080
  - name: s2
    address: 10.0.0.2
    port: 8080
";

const FRONTEND: &str = "\
apiVersion: haproxyctl/v1
kind: Frontend
name: fe
mode: http
default_backend: web
binds:
  - address: '*'
    port: 80
  - address: '*'
    port: 443
    ssl: true
";

fn apply(mock: &MockClient, yaml: &str) -> (Result<Outcome>, Vec<String>) {
    let mut reporter = RecordingReporter::default();
    let outcome =
        Reconciler::new(mock, &mut reporter).apply_bytes(yaml.as_bytes(), ApplyOptions::default());
    (outcome, reporter.rendered())
}

fn write_summary(mock: &MockClient) -> Vec<(Method, String)> {
    mock.writes()
        .into_iter()
        .filter_map(|call| match call {
            Call::Write { method, path, .. } => Some((method, path)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_create_backend_with_servers() {
    let mock = MockClient::new();
    let (outcome, lines) = apply(&mock, BACKEND);

    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Created));
    assert_eq!(
        lines,
        vec![
            "server/web/s1 created",
            "server/web/s2 created",
            "backend/web created"
        ]
    );
    assert_eq!(
        write_summary(&mock),
        vec![
            (Method::Post, paths::BACKENDS.to_string()),
            (Method::Post, paths::servers("web")),
            (Method::Post, paths::servers("web")),
        ]
    );
    assert_eq!(mock.version_fetches(), 3);

    let stored = mock.object(&paths::backend("web")).unwrap();
    assert_eq!(stored["timeout_server"], 30000);
    assert!(!stored.contains_key("servers"));
}

#[test]
fn test_create_call_order() {
    let mock = MockClient::new();
    let single = BACKEND.replace(
        "  - name: s2\n    address: 10.0.0.2\n    port: 8080\n",
        "",
    );
    let (outcome, _) = apply(&mock, &single);
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Created));

    let calls = mock.calls();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[0], Call::FetchOne(paths::backend("web")));
    assert_eq!(calls[1], Call::FetchVersion);
    assert!(matches!(
        &calls[2],
        Call::Write { method: Method::Post, path, version: Some(1), .. } if path == paths::BACKENDS
    ));
    assert_eq!(calls[3], Call::FetchVersion);
    assert!(matches!(
        &calls[4],
        Call::Write { method: Method::Post, path, version: Some(2), .. } if *path == paths::servers("web")
    ));
}

#[test]
fn test_each_write_carries_the_version_read_before_it() {
    let mock = MockClient::new();
    apply(&mock, BACKEND).0.unwrap();

    let calls = mock.calls();
    let mut expected = 1;
    for (i, call) in calls.iter().enumerate() {
        if let Call::Write { version, .. } = call {
            assert_eq!(calls[i - 1], Call::FetchVersion);
            assert_eq!(*version, Some(expected));
            expected += 1;
        }
    }
    assert_eq!(expected, 4);
}

#[test]
fn test_reapply_is_unchanged() {
    let mock = MockClient::new();
    apply(&mock, BACKEND).0.unwrap();
    mock.clear_calls();

    let (outcome, lines) = apply(&mock, BACKEND);
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Unchanged));
    assert_eq!(lines, vec!["backend/web unchanged"]);
    assert!(mock.writes().is_empty());
    assert_eq!(mock.version_fetches(), 0);
}

#[test]
fn test_weight_change_updates_backend_and_server() {
    let mock = MockClient::new();
    apply(&mock, BACKEND).0.unwrap();
    mock.clear_calls();

    let changed = BACKEND.replacen(
        "address: 10.0.0.2\n    port: 8080\n",
        "address: 10.0.0.2\n    port: 8080\n    weight: 50\n",
        1,
    );
    let (outcome, lines) = apply(&mock, &changed);

    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Configured));
    assert_eq!(
        write_summary(&mock),
        vec![
            (Method::Put, paths::backend("web")),
            (Method::Put, paths::server("web", "s2")),
        ]
    );
    assert_eq!(
        lines,
        vec!["server/web/s2 configured", "backend/web configured"]
    );
    assert_eq!(mock.object(&paths::server("web", "s2")).unwrap()["weight"], 50);
}

#[test]
fn test_dropped_server_is_deleted() {
    let mock = MockClient::new();
    apply(&mock, BACKEND).0.unwrap();
    mock.clear_calls();

    let trimmed = BACKEND.replace(
        "  - name: s2\n    address: 10.0.0.2\n    port: 8080\n",
        "",
    );
    let (outcome, _) = apply(&mock, &trimmed);

    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Configured));
    assert_eq!(
        write_summary(&mock),
        vec![
            (Method::Put, paths::backend("web")),
            (Method::Delete, paths::server("web", "s2")),
        ]
    );
    assert!(mock.object(&paths::server("web", "s2")).is_none());
}

#[test]
fn test_duration_spellings_are_equivalent() {
    let mock = MockClient::new();
    apply(&mock, BACKEND).0.unwrap();
    mock.clear_calls();

    let as_millis = BACKEND.replace("timeout_server: 30s", "timeout_server: 30000");
    let (outcome, _) = apply(&mock, &as_millis);
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Unchanged));
}

#[test]
fn test_invalid_duration_makes_no_calls() {
    let mock = MockClient::new();
    let bad = BACKEND.replace("timeout_server: 30s", "timeout_server: not-a-duration");
    let (outcome, lines) = apply(&mock, &bad);

    assert!(matches!(outcome.unwrap_err(), Error::Validation { .. }));
    assert!(lines.is_empty());
    assert!(mock.calls().is_empty());
}

#[test]
fn test_missing_name_makes_no_calls() {
    let mock = MockClient::new();
    let unnamed = BACKEND.replace("name: web\n", "name: ''\n");
    let (outcome, lines) = apply(&mock, &unnamed);

    assert_eq!(
        outcome.unwrap_err().to_string(),
        "invalid backend configuration: backend name is required"
    );
    assert!(lines.is_empty());
    assert!(mock.calls().is_empty());
}

#[test]
fn test_unknown_mode_makes_no_calls() {
    let mock = MockClient::new();
    let (outcome, _) = apply(&mock, &BACKEND.replace("mode: http", "mode: udp"));
    assert_eq!(
        outcome.unwrap_err().to_string(),
        "invalid backend configuration: invalid mode \"udp\" (allowed: http, tcp)"
    );

    let (outcome, _) = apply(&mock, &FRONTEND.replace("mode: http", "mode: quic"));
    assert!(matches!(outcome.unwrap_err(), Error::Validation { .. }));
    assert!(mock.calls().is_empty());
}

#[test]
fn test_parse_failures_make_no_calls() {
    let mock = MockClient::new();
    let wrong_version = BACKEND.replace("haproxyctl/v1", "haproxyctl/v2");
    assert!(apply(&mock, &wrong_version).0.is_err());
    let wrong_kind = BACKEND.replace("kind: Backend", "kind: Listener");
    assert!(apply(&mock, &wrong_kind).0.is_err());
    assert!(mock.calls().is_empty());
}

#[test]
fn test_preview_makes_no_calls() {
    let mock = MockClient::new();
    let mut reporter = RecordingReporter::default();
    let options = ApplyOptions {
        output: Some(OutputFormat::Json),
        dry_run: true,
    };
    let outcome = Reconciler::new(&mock, &mut reporter)
        .apply_bytes(BACKEND.as_bytes(), options)
        .unwrap();

    assert_eq!(outcome, Outcome::Previewed);
    assert!(mock.calls().is_empty());
    assert!(reporter.lines.is_empty());
    assert!(reporter.messages[0].contains("\"timeout_server\": 30000"));
    assert_eq!(reporter.messages[1], DRY_RUN_NOTICE);
}

#[test]
fn test_fetch_error_is_fatal() {
    let mock = MockClient::new();
    mock.fail(paths::backend("web"), 500);
    let (outcome, _) = apply(&mock, BACKEND);

    let err = outcome.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(mock.writes().is_empty());
}

#[test]
fn test_version_failure_stops_before_write() {
    let mock = MockClient::new();
    mock.fail_version(503);
    let (outcome, _) = apply(&mock, BACKEND);

    assert!(outcome.is_err());
    assert!(mock.writes().is_empty());
}

#[test]
fn test_child_failure_is_wrapped_and_fails_fast() {
    let mock = MockClient::new();
    mock.fail(paths::servers("web"), 500);
    let (outcome, lines) = apply(&mock, BACKEND);

    let err = outcome.unwrap_err();
    assert!(
        err.to_string()
            .starts_with("failed to reconcile server/s1 in backend/web:")
    );
    assert!(lines.is_empty());
    assert_eq!(write_summary(&mock).len(), 2);
    assert!(mock.object(&paths::backend("web")).is_some());
}

#[test]
fn test_frontend_binds_round_trip() {
    let mock = MockClient::new();
    let (outcome, lines) = apply(&mock, FRONTEND);
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Created));
    assert_eq!(
        lines,
        vec![
            "bind/fe/*:80 created",
            "bind/fe/*:443 created",
            "frontend/fe created"
        ]
    );

    mock.clear_calls();
    let (outcome, _) = apply(&mock, FRONTEND);
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Unchanged));
    assert!(mock.writes().is_empty());
}

#[test]
fn test_frontend_bind_update_uses_wire_name() {
    let mock = MockClient::new();
    mock.insert(paths::frontend("fe"), json!({"name": "fe", "mode": "http", "default_backend": "web"}));
    mock.insert(
        paths::bind("fe", "http"),
        json!({"name": "http", "address": "*", "port": 80, "ssl": "enabled"}),
    );
    mock.insert(
        paths::bind("fe", "https"),
        json!({"name": "https", "address": "*", "port": 443}),
    );

    let (outcome, lines) = apply(&mock, FRONTEND);
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Configured));
    assert_eq!(
        write_summary(&mock),
        vec![
            (Method::Put, paths::frontend("fe")),
            (Method::Put, paths::bind("fe", "http")),
            (Method::Put, paths::bind("fe", "https")),
        ]
    );
    assert_eq!(
        lines,
        vec![
            "bind/fe/*:80 configured",
            "bind/fe/*:443 configured",
            "frontend/fe configured"
        ]
    );
}

#[test]
fn test_standalone_server() {
    let mock = MockClient::new();
    mock.insert(paths::backend("web"), json!({"name": "web"}));
    let server = "apiVersion: haproxyctl/v1\nkind: Server\nname: s1\nparent: web\naddress: h\nport: 80\n";

    let (outcome, lines) = apply(&mock, server);
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Created));
    assert_eq!(lines, vec!["server/web/s1 created"]);

    let (outcome, _) = apply(&mock, server);
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Unchanged));

    let (outcome, _) = apply(&mock, &server.replace("port: 80", "port: 81"));
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Configured));
    assert_eq!(mock.object(&paths::server("web", "s1")).unwrap()["port"], 81);
}

#[test]
fn test_standalone_server_missing_backend() {
    let mock = MockClient::new();
    let server = "apiVersion: haproxyctl/v1\nkind: Server\nname: s1\nbackend: nope\naddress: h\nport: 80\n";
    let err = apply(&mock, server).0.unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_global_not_found_counts_as_empty() {
    let mock = MockClient::new();
    let (outcome, lines) = apply(&mock, "apiVersion: haproxyctl/v1\nkind: Global\n");
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Unchanged));
    assert_eq!(lines, vec!["global/config unchanged"]);

    let (outcome, lines) = apply(&mock, "apiVersion: haproxyctl/v1\nkind: Global\nmaxconn: 4000\n");
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Configured));
    assert_eq!(lines, vec!["global/config configured"]);
    assert_eq!(mock.object(paths::GLOBAL).unwrap()["maxconn"], 4000);
}

#[test]
fn test_defaults_uses_current_name() {
    let mock = MockClient::new();
    mock.insert(
        paths::defaults("unnamed_defaults_1"),
        json!({"name": "unnamed_defaults_1", "mode": "http", "timeout_client": 30000}),
    );

    let yaml = "apiVersion: haproxyctl/v1\nkind: Defaults\nmode: http\ntimeoutClient: 30s\n";
    let (outcome, lines) = apply(&mock, yaml);
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Unchanged));
    assert_eq!(lines, vec!["defaults/config unchanged"]);

    let (outcome, _) = apply(&mock, &yaml.replace("30s", "1m"));
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Configured));
    assert_eq!(
        write_summary(&mock),
        vec![(Method::Put, paths::defaults("unnamed_defaults_1"))]
    );
}

#[test]
fn test_defaults_without_any_name_is_rejected() {
    let mock = MockClient::new();
    let err = apply(&mock, "apiVersion: haproxyctl/v1\nkind: Defaults\nmode: http\n")
        .0
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert!(mock.writes().is_empty());
}

#[test]
fn test_userlist_replace() {
    let mock = MockClient::new();
    let yaml = "apiVersion: haproxyctl/v1\nkind: Userlist\nname: ops\nusers:\n  - name: alice\n    password: x\n    groups: [admin]\ngroups:\n  - name: admin\n    users: [alice]\n";

    let (outcome, _) = apply(&mock, yaml);
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Created));

    mock.clear_calls();
    let (outcome, _) = apply(&mock, yaml);
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Unchanged));
    assert!(mock.writes().is_empty());

    let (outcome, lines) = apply(&mock, &yaml.replace("password: x", "password: y"));
    assert_eq!(outcome.unwrap(), Outcome::Applied(Action::Configured));
    assert_eq!(lines, vec!["userlist/ops configured"]);
    assert_eq!(
        write_summary(&mock),
        vec![
            (Method::Delete, paths::userlist("ops")),
            (Method::Post, paths::USERLISTS.to_string()),
        ]
    );
    assert_eq!(mock.version_fetches(), 2);
}
