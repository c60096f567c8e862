//! The apply engine.
//!
//! [`Reconciler::apply`] converges one manifest against the live
//! configuration:
//!
//! 1. Fetch the parent. A 404 takes the creation path: POST the parent, then
//!    POST every child.
//! 2. Otherwise fetch the children and compare. Equal parent fields and
//!    children mean `unchanged` with no writes and no version fetches.
//! 3. Otherwise PUT the parent and reconcile the children through
//!    [`ChildDiff`](crate::diff::ChildDiff): deletes first, then creates and
//!    updates.
//!
//! Every write fetches a fresh configuration version through
//! [`VersionGate`]. The first failure aborts the run; earlier writes are
//! not rolled back.

mod children;
mod kinds;

pub(crate) use children::{create_children, reconcile_children};

use crate::error::Result;
use crate::gate::VersionGate;
use crate::manifest::{Manifest, parse};
use crate::render::{OutputFormat, preview};
use crate::report::{Action, Reporter, StatusLine};
use dataplane::{ResourceClient, WireObject};

/// Printed after a preview when `--dry-run` was given.
pub const DRY_RUN_NOTICE: &str = "Dry run mode enabled. No changes made.";

/// Options for [`Reconciler::apply`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Render the wire payload in this format instead of applying.
    pub output: Option<OutputFormat>,
    /// Render the manifest instead of applying.
    pub dry_run: bool,
}

impl ApplyOptions {
    /// Whether this run only previews.
    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.output.is_some() || self.dry_run
    }
}

/// Result of a single apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was sent; a preview was reported instead.
    Previewed,
    /// The manifest was applied.
    Applied(Action),
}

/// Applies manifests through a [`ResourceClient`].
pub struct Reconciler<'a> {
    client: &'a dyn ResourceClient,
    reporter: &'a mut dyn Reporter,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler.
    pub fn new(client: &'a dyn ResourceClient, reporter: &'a mut dyn Reporter) -> Self {
        Self { client, reporter }
    }

    /// Parse, validate and apply a manifest document.
    pub fn apply_bytes(&mut self, bytes: &[u8], options: ApplyOptions) -> Result<Outcome> {
        let manifest = parse(bytes)?;
        self.apply(&manifest, options)
    }

    /// Validate and apply a manifest.
    ///
    /// Validation and previews never touch the network.
    pub fn apply(&mut self, manifest: &Manifest, options: ApplyOptions) -> Result<Outcome> {
        manifest.validate()?;

        if options.is_preview() {
            return report_preview(self.reporter, manifest, options);
        }

        log::info!(
            "applying {}/{}",
            manifest.kind().lower(),
            manifest.display_name()
        );

        let action = match manifest {
            Manifest::Backend(backend) => self.apply_backend(backend)?,
            Manifest::Frontend(frontend) => self.apply_frontend(frontend)?,
            Manifest::Server(server) => self.apply_server(server)?,
            Manifest::Userlist(userlist) => self.apply_userlist(userlist)?,
            Manifest::Global(global) => self.apply_global(global)?,
            Manifest::Defaults(defaults) => self.apply_defaults(defaults)?,
        };

        self.reporter.status(&StatusLine::new(
            manifest.kind().lower(),
            manifest.display_name(),
            action,
        ));
        Ok(Outcome::Applied(action))
    }

    fn gate(&self) -> VersionGate<'a> {
        VersionGate::new(self.client)
    }
}

/// Report the preview of a manifest without contacting the API.
///
/// Callers validate first.
pub fn report_preview(
    reporter: &mut dyn Reporter,
    manifest: &Manifest,
    options: ApplyOptions,
) -> Result<Outcome> {
    reporter.message(&preview(manifest, options.output)?);
    if options.dry_run {
        reporter.message(DRY_RUN_NOTICE);
    }
    Ok(Outcome::Previewed)
}

/// Fetch an object, mapping 404 to `None`.
pub(crate) fn fetch_optional(
    client: &dyn ResourceClient,
    path: &str,
) -> dataplane::Result<Option<WireObject>> {
    match client.fetch_one(path) {
        Ok(obj) => Ok(Some(obj)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Fetch a collection, mapping 404 to an empty list.
pub(crate) fn fetch_collection(
    client: &dyn ResourceClient,
    path: &str,
) -> dataplane::Result<Vec<WireObject>> {
    match client.fetch_list(path) {
        Ok(items) => Ok(items),
        Err(err) if err.is_not_found() => Ok(Vec::new()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests;
