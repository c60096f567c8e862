mod cli;
mod commands;
mod config;
mod editor;
mod output;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use dataplane::HttpClient;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub config: Option<PathBuf>,
}

impl Context {
    /// Credentials file in effect for this invocation.
    pub fn config_path(&self) -> Result<PathBuf> {
        config::resolve_path(self.config.as_deref())
    }

    /// Connect to the Data Plane API with the stored credentials.
    pub fn client(&self) -> Result<HttpClient> {
        let path = self.config_path()?;
        let connection = config::load(&path)?;
        log::debug!(
            "using Data Plane API at {}",
            connection.normalized_base_url()
        );
        Ok(HttpClient::new(&connection))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        quiet: cli.quiet,
        config: cli.config,
    };

    match cli.command {
        Command::Login => commands::login::run(&ctx),
        Command::Apply(args) => commands::apply::run(&ctx, args),
        Command::Create(args) => commands::create::run(&ctx, args),
        Command::Delete(args) => commands::delete::run(&ctx, args),
        Command::Get(cmd) => commands::get::run(&ctx, cmd),
        Command::Describe(cmd) => commands::describe::run(&ctx, cmd),
        Command::Edit(cmd) => commands::edit::run(&ctx, cmd),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "haproxyctl", &mut io::stdout());
            Ok(())
        }
    }
}
