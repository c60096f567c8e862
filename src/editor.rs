//! `$EDITOR` integration for `haproxyctl edit`.

use declarative::{Editor, Error, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::process::Command;

const FALLBACK_EDITOR: &str = "vi";

/// Pick the editor command: `$EDITOR`, then `$VISUAL`, then `vi`.
pub fn editor_command(lookup: impl Fn(&str) -> Option<String>) -> String {
    ["EDITOR", "VISUAL"]
        .into_iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// Opens a temporary YAML file in the user's editor.
pub struct TempFileEditor {
    command: String,
}

impl TempFileEditor {
    /// Use the editor named by the environment.
    pub fn from_env() -> Self {
        Self::new(editor_command(|var| env::var(var).ok()))
    }

    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Editor for TempFileEditor {
    fn edit(&mut self, text: &str) -> Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("haproxyctl-")
            .suffix(".yaml")
            .tempfile()
            .map_err(|e| Error::Editor(format!("failed to create temp file: {e}")))?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| Error::Editor(format!("failed to write temp file: {e}")))?;

        // Commands like "code --wait" carry their own arguments.
        let mut parts = self.command.split_whitespace();
        let program = parts.next().unwrap_or(FALLBACK_EDITOR);
        log::debug!("opening {} with {}", file.path().display(), self.command);

        let status = Command::new(program)
            .args(parts)
            .arg(file.path())
            .status()
            .map_err(|e| Error::Editor(format!("failed to run editor {:?}: {e}", self.command)))?;
        if !status.success() {
            return Err(Error::Editor(format!(
                "editor {:?} exited with {status}",
                self.command
            )));
        }

        let edited = fs::read_to_string(file.path())
            .map_err(|e| Error::Editor(format!("failed to read edited file: {e}")))?;
        if let Err(e) = file.close() {
            log::warn!("failed to remove temp file: {e}");
        }
        Ok(edited)
    }
}
