// Manifest-driven commands
pub mod apply;
pub mod create;
pub mod delete;
pub mod edit;

// Read-only commands
pub mod describe;
pub mod get;

pub mod login;

use crate::cli::{PreviewArgs, PreviewFormat};
use anyhow::{Context as AnyhowContext, Result};
use declarative::{ApplyOptions, OutputFormat};
use std::fs;
use std::io::Read;

/// Read a manifest file; `-` reads standard input.
pub fn read_manifest(path: &str) -> Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Could not read manifest from stdin")?;
        return Ok(buf);
    }
    fs::read(path).with_context(|| format!("Could not read {path}"))
}

/// Preview flags as engine options.
pub fn apply_options(args: PreviewArgs) -> ApplyOptions {
    ApplyOptions {
        output: args.output.map(|format| match format {
            PreviewFormat::Yaml => OutputFormat::Yaml,
            PreviewFormat::Json => OutputFormat::Json,
        }),
        dry_run: args.dry_run,
    }
}
