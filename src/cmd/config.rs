//! Configuration view and init commands: `crm-board config`.

use anyhow::Result;
use std::path::Path;

use crm_board::config::{BoardConfig, BoardToml, CliOverrides, LOCAL_CONFIG_FILE};

use super::super::ConfigCommands;

pub fn cmd_config(overrides: &CliOverrides, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            let config = BoardConfig::resolve(overrides)?;

            println!();
            println!("CRM Board Configuration");
            println!("=======================");
            println!();
            match &config.source {
                Some(path) => println!("Config file: {}", path.display()),
                None => println!("No config file found; using defaults."),
            }
            println!();

            let toml = &config.toml;
            println!("[api]");
            match &toml.api.base_url {
                Some(url) => println!("  base_url = \"{}\"", url),
                None => println!("  base_url = (not set)"),
            }
            println!(
                "  token = {}",
                if config.request_context().is_authenticated() {
                    "(set)"
                } else {
                    "(not set)"
                }
            );
            println!("  timeout_secs = {}", toml.api.timeout_secs);
            println!();
            println!("[board]");
            println!("  module = \"{}\"", toml.board.module);
            println!("  rollback = \"{}\"", toml.board.rollback);
            println!();

            let warnings = toml.validate();
            if !warnings.is_empty() {
                println!("Warnings:");
                for warning in warnings {
                    println!("  - {}", console::style(warning).yellow());
                }
                println!();
            }
        }
        Some(ConfigCommands::Init) => {
            let path = Path::new(LOCAL_CONFIG_FILE);
            if path.exists() {
                println!("{} already exists.", LOCAL_CONFIG_FILE);
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            let mut toml = BoardToml::default();
            toml.api.base_url = overrides.api_url.clone();
            if let Some(module) = overrides.module {
                toml.board.module = module;
            }
            toml.save(path)?;

            println!("Created {}", LOCAL_CONFIG_FILE);
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, token, timeout_secs");
            println!("  - [board] module, rollback");
            println!();
        }
    }

    Ok(())
}
