//! `haproxyctl login`: store Data Plane API credentials.

use crate::Context;
use crate::config;
use crate::ui;
use anyhow::{Context as AnyhowContext, Result};
use dataplane::ConnectionConfig;
use dialoguer::{Input, Password};

fn non_empty(input: &String) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("value cannot be empty")
    } else {
        Ok(())
    }
}

pub fn run(ctx: &Context) -> Result<()> {
    let path = ctx.config_path()?;
    // Existing values become prompt defaults.
    let current = config::load(&path).unwrap_or_default();

    if !ctx.quiet {
        ui::info(&format!("Configuring Data Plane API access ({})", path.display()));
    }

    let api_base_url = prompt_with_default("API Base URL", &current.api_base_url)?;
    let username = prompt_with_default("Username", &current.username)?;
    let password = Password::new()
        .with_prompt("Password")
        .validate_with(|input: &String| non_empty(input))
        .interact()
        .context("Prompt failed for password")?;

    let connection = ConnectionConfig::new(api_base_url.trim(), username.trim(), password);
    config::save(&connection, &path)?;
    ui::success(&format!("Configuration saved to {}", path.display()));
    Ok(())
}

fn prompt_with_default(label: &str, default: &str) -> Result<String> {
    Input::new()
        .with_prompt(label)
        .with_initial_text(default)
        .validate_with(|input: &String| non_empty(input))
        .interact_text()
        .with_context(|| format!("Prompt failed for {}", label.to_lowercase()))
}
