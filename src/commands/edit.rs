//! `haproxyctl edit`

use crate::Context;
use crate::cli::EditCommand;
use crate::editor::TempFileEditor;
use crate::ui::ConsoleReporter;
use anyhow::Result;
use declarative::{EditSession, EditTarget};

pub fn target(cmd: EditCommand) -> EditTarget {
    match cmd {
        EditCommand::Backend { name } => EditTarget::Backend(name),
        EditCommand::Frontend { name } => EditTarget::Frontend(name),
        EditCommand::Global => EditTarget::Global,
        EditCommand::Defaults => EditTarget::Defaults,
    }
}

pub fn run(ctx: &Context, cmd: EditCommand) -> Result<()> {
    let client = ctx.client()?;
    let mut reporter = ConsoleReporter;
    let mut editor = TempFileEditor::from_env();

    EditSession::new(&client, &mut reporter, &mut editor).run(&target(cmd))?;
    Ok(())
}
