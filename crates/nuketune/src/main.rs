// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! NukeTune - bulk deletion of Intune objects through Microsoft Graph.
//!
//! This is the binary entry point.

mod categories;
mod delete;
mod preview;
mod whoami;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nuketune_config::NukeTuneConfig;
use nuketune_core::NukeError;

/// NukeTune - bulk deletion of Intune objects.
#[derive(Parser, Debug)]
#[command(name = "nuketune", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the category catalog.
    Categories,
    /// Fetch and show the objects of the selected categories.
    Preview(Selection),
    /// Preview, confirm and delete the selected categories.
    Delete {
        #[command(flatten)]
        selection: Selection,
        /// Write the deletion log here instead of the export directory.
        #[arg(long, value_name = "PATH")]
        log: Option<PathBuf>,
    },
    /// Show the signed-in user and tenant.
    Whoami,
    /// Print the effective configuration with secrets redacted.
    Config,
}

/// Which categories a command works on.
#[derive(Args, Debug, Clone, Default)]
pub struct Selection {
    /// Category id (repeatable). See `nuketune categories`.
    #[arg(short = 'c', long = "category", value_name = "ID")]
    pub categories: Vec<String>,

    /// Every selectable category.
    #[arg(long, conflicts_with = "categories")]
    pub all: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => nuketune_config::load_and_validate_path(path),
        None => nuketune_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            nuketune_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.general.log_level);

    let result = run(cli.command, &config).await;
    // stdin readers may still be parked on a blocking read; exit explicitly.
    std::process::exit(match result {
        Ok(()) => 0,
        Err(e) => {
            report(&e);
            1
        }
    });
}

async fn run(command: Commands, config: &NukeTuneConfig) -> Result<(), NukeError> {
    match command {
        Commands::Categories => {
            categories::run_categories();
            Ok(())
        }
        Commands::Preview(selection) => preview::run_preview(config, &selection).await,
        Commands::Delete { selection, log } => {
            delete::run_delete(config, &selection, log.as_deref()).await
        }
        Commands::Whoami => whoami::run_whoami(config).await,
        Commands::Config => print_config(config),
    }
}

fn print_config(config: &NukeTuneConfig) -> Result<(), NukeError> {
    let rendered = toml::to_string_pretty(&config.redacted())
        .map_err(|e| NukeError::Internal(format!("failed to render configuration: {e}")))?;
    print!("{rendered}");
    Ok(())
}

fn report(error: &NukeError) {
    eprintln!("nuketune: {error}");
    if let NukeError::InteractionRequired(_) = error {
        eprintln!(
            "  sign in again (for example `az login`) or refresh NUKETUNE_ACCESS_TOKEN"
        );
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` wins when set. Output goes to stderr so it never mixes with
/// command output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "nuketune={log_level},nuketune_engine={log_level},nuketune_graph={log_level},\
             nuketune_config={log_level},nuketune_resilience={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn delete_accepts_repeated_categories() {
        let cli = Cli::try_parse_from([
            "nuketune", "delete", "-c", "mobileApps", "-c", "deviceConfigurations", "--log",
            "out.csv",
        ])
        .unwrap();
        match cli.command {
            Commands::Delete { selection, log } => {
                assert_eq!(selection.categories, vec!["mobileApps", "deviceConfigurations"]);
                assert_eq!(log, Some(PathBuf::from("out.csv")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn all_conflicts_with_explicit_categories() {
        assert!(Cli::try_parse_from(["nuketune", "preview", "--all", "-c", "x"]).is_err());
    }

    #[test]
    fn global_config_flag() {
        let cli = Cli::try_parse_from(["nuketune", "categories", "--config", "/tmp/n.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/n.toml")));
    }

    #[test]
    fn default_config_renders_without_token() {
        let mut config = NukeTuneConfig::default();
        config.auth.access_token = Some("secret".into());
        let rendered = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("confirmation_phrase = \"DELETE\""));
    }
}
