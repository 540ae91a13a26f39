//! `dashpub config` — configuration scaffolding.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use dashpub_core::Config;

/// Subcommands under `dashpub config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print a commented configuration template, or write it to a file.
    Template {
        /// Write the template to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Template { output } => template(output),
    }
}

fn template(output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, Config::template())
                .with_context(|| format!("could not write template to {}", path.display()))?;
            println!("✓ wrote {}", path.display());
        }
        None => print!("{}", Config::template()),
    }
    Ok(())
}
