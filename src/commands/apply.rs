//! `haproxyctl apply -f FILE`

use super::{apply_options, read_manifest};
use crate::Context;
use crate::cli::ApplyArgs;
use crate::ui::ConsoleReporter;
use anyhow::Result;
use declarative::{Reconciler, parse, report_preview};

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let bytes = read_manifest(&args.file)?;
    let manifest = parse(&bytes)?;
    let options = apply_options(args.preview);
    let mut reporter = ConsoleReporter;

    // Previews work without stored credentials.
    if options.is_preview() {
        manifest.validate()?;
        report_preview(&mut reporter, &manifest, options)?;
        return Ok(());
    }

    let client = ctx.client()?;
    Reconciler::new(&client, &mut reporter).apply(&manifest, options)?;
    Ok(())
}
