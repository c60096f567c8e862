//! Child collection writes shared by apply, create and edit.

use crate::diff::ChildDiff;
use crate::error::{Error, Result};
use crate::gate::VersionGate;
use crate::identity::Child;
use crate::report::{Action, Reporter, StatusLine};
use dataplane::Method;
use serde_json::Value;

/// Identity of a child under its parent, e.g. `web/s1` or `fe/*:80`.
fn label<T: Child>(parent: &str, child: &T) -> String {
    match child.key() {
        Some(key) => format!("{parent}/{key}"),
        None => parent.to_string(),
    }
}

fn write_child<T: Child>(
    gate: VersionGate<'_>,
    parent_kind: &str,
    parent: &str,
    child: &T,
    method: Method,
    path: &str,
) -> Result<()> {
    let wrap = |err: Error| {
        let id = child
            .key()
            .map_or_else(|| T::NOUN.to_string(), |key| format!("{}/{key}", T::NOUN));
        Error::child(format!("{parent_kind}/{parent}"), id, err)
    };

    let body = match method {
        Method::Delete => None,
        Method::Post | Method::Put => Some(Value::Object(child.payload().map_err(wrap)?)),
    };
    gate.write(method, path, body.as_ref()).map_err(wrap)?;
    Ok(())
}

/// POST every child in manifest order.
pub(crate) fn create_children<T: Child>(
    gate: VersionGate<'_>,
    reporter: &mut dyn Reporter,
    parent_kind: &str,
    parent: &str,
    items: &[T],
) -> Result<()> {
    let collection = T::collection(parent);
    for item in items {
        write_child(gate, parent_kind, parent, item, Method::Post, &collection)?;
        reporter.status(&StatusLine::new(
            T::NOUN,
            label(parent, item),
            Action::Created,
        ));
    }
    Ok(())
}

/// Converge the live children of `parent` onto `after`.
///
/// Deletes run first. Updates and deletes of children whose wire name is
/// unknown are skipped with a warning.
pub(crate) fn reconcile_children<T: Child>(
    gate: VersionGate<'_>,
    reporter: &mut dyn Reporter,
    parent_kind: &str,
    parent: &str,
    before: &[T],
    after: &[T],
) -> Result<ChildDiff<T>> {
    let diff = ChildDiff::compute(before, after);
    log::debug!(
        "{parent_kind}/{parent}: {} {}(s) to delete, {} to create, {} to update, {} unchanged",
        diff.to_delete.len(),
        T::NOUN,
        diff.to_create.len(),
        diff.to_update.len(),
        diff.unchanged
    );

    for item in &diff.to_delete {
        let Some(wire_name) = item.wire_name() else {
            log::warn!(
                "skipping delete of {} {}: no API name known",
                T::NOUN,
                label(parent, item)
            );
            continue;
        };
        let path = T::item_path(parent, wire_name);
        write_child(gate, parent_kind, parent, item, Method::Delete, &path)?;
        reporter.status(&StatusLine::new(
            T::NOUN,
            label(parent, item),
            Action::Deleted,
        ));
    }

    create_children(gate, reporter, parent_kind, parent, &diff.to_create)?;

    for item in &diff.to_update {
        let Some(wire_name) = item.wire_name() else {
            log::warn!(
                "skipping update of {} {}: no API name known",
                T::NOUN,
                label(parent, item)
            );
            continue;
        };
        let path = T::item_path(parent, wire_name);
        write_child(gate, parent_kind, parent, item, Method::Put, &path)?;
        reporter.status(&StatusLine::new(
            T::NOUN,
            label(parent, item),
            Action::Configured,
        ));
    }

    Ok(diff)
}
