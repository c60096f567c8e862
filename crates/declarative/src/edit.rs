//! Interactive edit flows.
//!
//! The live resource is rendered as a manifest, handed to an [`Editor`], and
//! the edited text is applied with a PUT of the parent followed by child
//! reconciliation against the fetched view.

use crate::error::{Error, Result};
use crate::gate::VersionGate;
use crate::live;
use crate::manifest::{Backend, Defaults, Document, Frontend, Global, Resource};
use crate::reconcile::reconcile_children;
use crate::render::to_yaml;
use crate::report::{Action, Reporter, StatusLine};
use dataplane::{Method, ResourceClient, paths};
use serde_json::Value;

/// Printed when the edited text equals the original.
pub const NO_CHANGES: &str = "No changes made; exiting without update.";

/// Lets the user change a text document.
pub trait Editor {
    /// Return the edited version of `text`.
    fn edit(&mut self, text: &str) -> Result<String>;
}

impl<F> Editor for F
where
    F: FnMut(&str) -> Result<String>,
{
    fn edit(&mut self, text: &str) -> Result<String> {
        self(text)
    }
}

/// A resource that can be edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// A backend with its servers.
    Backend(String),
    /// A frontend with its binds.
    Frontend(String),
    /// The `global` section.
    Global,
    /// The primary `defaults` section.
    Defaults,
}

/// Runs edit sessions against the API.
pub struct EditSession<'a> {
    client: &'a dyn ResourceClient,
    reporter: &'a mut dyn Reporter,
    editor: &'a mut dyn Editor,
}

impl<'a> EditSession<'a> {
    /// Create a session.
    pub fn new(
        client: &'a dyn ResourceClient,
        reporter: &'a mut dyn Reporter,
        editor: &'a mut dyn Editor,
    ) -> Self {
        Self {
            client,
            reporter,
            editor,
        }
    }

    /// Edit a resource. Returns `None` when the text was left unchanged.
    pub fn run(&mut self, target: &EditTarget) -> Result<Option<Action>> {
        let edited = match target {
            EditTarget::Backend(name) => self.edit_backend(name)?,
            EditTarget::Frontend(name) => self.edit_frontend(name)?,
            EditTarget::Global => self.edit_global()?,
            EditTarget::Defaults => self.edit_defaults()?,
        };
        Ok(edited.map(|(kind, name)| {
            self.reporter
                .status(&StatusLine::new(kind, name, Action::Configured));
            Action::Configured
        }))
    }

    /// Open the editor. `None` means nothing changed.
    fn open(&mut self, original: &str) -> Result<Option<String>> {
        let edited = self.editor.edit(original)?;
        if edited.trim() == original.trim() {
            self.reporter.message(NO_CHANGES);
            return Ok(None);
        }
        Ok(Some(edited))
    }

    fn put(&self, kind: &str, name: &str, path: &str, payload: Value) -> Result<()> {
        VersionGate::new(self.client)
            .write(Method::Put, path, Some(&payload))
            .map_err(|e| Error::from_api("update", kind, name, e))?;
        Ok(())
    }

    fn edit_backend(&mut self, name: &str) -> Result<Option<(&'static str, String)>> {
        let view = live::backend(self.client, name)?;
        let before = view.servers.clone();

        let Some(edited) = self.open(&to_yaml(&Document::new(&view))?)? else {
            return Ok(None);
        };
        let desired: Backend = serde_yaml::from_str(&edited)?;
        check_rename("backend", name, &desired.name)?;
        desired.validate()?;

        self.put("backend", name, &paths::backend(name), Value::Object(desired.to_wire()?))?;
        reconcile_children(
            VersionGate::new(self.client),
            self.reporter,
            "backend",
            name,
            &before,
            &desired.servers,
        )?;
        Ok(Some(("backend", name.to_string())))
    }

    fn edit_frontend(&mut self, name: &str) -> Result<Option<(&'static str, String)>> {
        let view = live::frontend(self.client, name)?;
        let before = view.binds.clone();

        let Some(edited) = self.open(&to_yaml(&Document::new(&view))?)? else {
            return Ok(None);
        };
        let desired: Frontend = serde_yaml::from_str(&edited)?;
        check_rename("frontend", name, &desired.name)?;
        desired.validate()?;

        self.put("frontend", name, &paths::frontend(name), Value::Object(desired.to_wire()?))?;
        reconcile_children(
            VersionGate::new(self.client),
            self.reporter,
            "frontend",
            name,
            &before,
            &desired.binds,
        )?;
        Ok(Some(("frontend", name.to_string())))
    }

    fn edit_global(&mut self) -> Result<Option<(&'static str, String)>> {
        let view = live::global(self.client)?;

        let Some(edited) = self.open(&to_yaml(&Document::new(&view))?)? else {
            return Ok(None);
        };
        let desired: Global = serde_yaml::from_str(&edited)?;
        desired.validate()?;

        self.put("global", "config", paths::GLOBAL, Value::Object(desired.to_wire()?))?;
        Ok(Some(("global", "config".to_string())))
    }

    fn edit_defaults(&mut self) -> Result<Option<(&'static str, String)>> {
        let view = live::defaults(self.client)?;
        let name = view.name.clone();

        let Some(edited) = self.open(&to_yaml(&Document::new(&view))?)? else {
            return Ok(None);
        };
        let mut desired: Defaults = serde_yaml::from_str(&edited)?;
        if desired.name.is_empty() {
            desired.name.clone_from(&name);
        }
        check_rename("defaults", &name, &desired.name)?;
        desired.validate()?;

        self.put("defaults", &name, &paths::defaults(&name), Value::Object(desired.to_wire()?))?;
        Ok(Some(("defaults", "config".to_string())))
    }
}

fn check_rename(kind: &str, from: &str, to: &str) -> Result<()> {
    if !to.is_empty() && to != from {
        return Err(Error::Rename {
            kind: kind.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}
