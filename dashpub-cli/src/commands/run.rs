//! `dashpub run` — one publish pass over the catalog.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use dashpub_core::Config;
use dashpub_sync::{Publisher, RunSummary, SyncOutcome};

/// Arguments for `dashpub run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the YAML config file; omit to configure through DASHPUB_*
    /// environment variables only.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Classify every dashboard without cloning, writing, or committing.
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let config =
            Config::load(self.config.as_deref()).context("could not load configuration")?;
        let summary = Publisher::from_config(&config)
            .run(self.dry_run)
            .context("publish run failed")?;
        print_summary(&summary, self.dry_run);
        Ok(())
    }
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if summary.outcomes.is_empty() {
        println!(
            "{prefix}{} checked {} dashboards, nothing to publish",
            "✓".green(),
            summary.checked
        );
        return;
    }

    for outcome in &summary.outcomes {
        match outcome {
            SyncOutcome::Created { title, path } => {
                println!("  {}  {}: {}", "✎".green(), title, path.display())
            }
            SyncOutcome::Updated {
                title,
                path,
                from_version,
                to_version,
            } => println!(
                "  {}  {}: {} (v{} -> v{})",
                "✎".green(),
                title,
                path.display(),
                from_version,
                to_version
            ),
            SyncOutcome::Current { title } => {
                println!("  {}  {}: up to date", "·".bright_black(), title)
            }
            SyncOutcome::TargetNewer {
                title,
                target_version,
                source_version,
            } => println!(
                "  {}  {}: skipped, target has v{} but source offers v{}",
                "!".yellow(),
                title,
                target_version,
                source_version
            ),
            SyncOutcome::WouldCreate { title, path } => {
                println!("  {}  {}: {}", "~".cyan(), title, path.display())
            }
            SyncOutcome::WouldUpdate {
                title,
                path,
                from_version,
                to_version,
            } => println!(
                "  {}  {}: {} (v{} -> v{})",
                "~".cyan(),
                title,
                path.display(),
                from_version,
                to_version
            ),
        }
    }

    if dry_run {
        let pending = summary
            .outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    SyncOutcome::WouldCreate { .. } | SyncOutcome::WouldUpdate { .. }
                )
            })
            .count();
        println!("{prefix}{} dashboards would be written", pending);
    } else if summary.committed {
        println!(
            "{} {} dashboards published and pushed",
            "✓".green(),
            summary.updated
        );
    } else {
        println!("{} nothing to publish", "✓".green());
    }
}
