//! # fb-cli
//!
//! Command-line front end for FeatureBox onboarding.
//!
//! - `fb goals select/add/toggle/reset` — change the forecast goal selection
//! - `fb goals show/resolve/inspect` — read it back, per tier
//! - `fb goals override set/clear` — diagnostics-only override goal
//! - `fb upload <file>` — upload a CSV tagged with the primary goal

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::{WizardConfig, WizardSettings};

/// FeatureBox onboarding CLI — choose forecast goals and upload sales data.
#[derive(Parser)]
#[command(name = "fb", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the forecast goal selection.
    Goals {
        #[command(subcommand)]
        command: commands::goals::GoalCommands,
    },
    /// Upload a CSV file tagged with the primary goal.
    Upload {
        /// Path to the file.
        file: PathBuf,
        /// Content type to declare (guessed from the extension if omitted).
        #[arg(long)]
        content_type: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let config = WizardConfig::for_project(&project_root);
    let settings = WizardSettings::load_or_default(&config.settings_file);

    tracing::debug!(
        "project root: {}, state dir: {}",
        config.project_root.display(),
        config.state_dir.display()
    );

    match &cli.command {
        Commands::Goals { command } => commands::goals::execute(command, &config, &settings),
        Commands::Upload { file, content_type } => {
            commands::upload::execute(&config, &settings, file, content_type.as_deref())
        }
    }
}
