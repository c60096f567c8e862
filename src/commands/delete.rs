//! `haproxyctl delete`

use super::read_manifest;
use crate::Context;
use crate::cli::{DeleteArgs, DeleteCommand};
use crate::ui::ConsoleReporter;
use anyhow::{Result, bail};
use declarative::{DeleteTarget, delete, parse};

pub fn target(args: DeleteArgs) -> Result<DeleteTarget> {
    let target = match (args.file, args.command) {
        (Some(file), _) => DeleteTarget::from_manifest(&parse(&read_manifest(&file)?)?)?,
        (None, Some(DeleteCommand::Backend { name })) => DeleteTarget::Backend(name),
        (None, Some(DeleteCommand::Frontend { name })) => DeleteTarget::Frontend(name),
        (None, Some(DeleteCommand::Userlist { name })) => DeleteTarget::Userlist(name),
        (None, Some(DeleteCommand::Certificate { name })) => DeleteTarget::Certificate(name),
        (None, Some(DeleteCommand::Server { backend, name })) => {
            DeleteTarget::Server { backend, name }
        }
        (None, None) => bail!("either -f FILE or a resource type is required"),
    };
    Ok(target)
}

pub fn run(ctx: &Context, args: DeleteArgs) -> Result<()> {
    let target = target(args)?;
    let client = ctx.client()?;
    delete(&client, &mut ConsoleReporter, &target)?;
    Ok(())
}
