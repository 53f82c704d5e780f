//! Wishlist CLI
//!
//! Command-line interface for a shared gift wishlist.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wishlist_core::{Config, SyncedCollectionStore};

mod commands;
mod output;
mod prompt;

use commands::gift::GiftFields;
use output::{ListFilter, Output, OutputFormat};

#[derive(Parser)]
#[command(name = "wishlist")]
#[command(about = "Gift wishlist backed by a local cache and a GitHub gist")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List gifts
    #[command(alias = "ls")]
    List {
        /// Only gifts nobody has reserved yet
        #[arg(long, conflicts_with = "reserved")]
        available: bool,
        /// Only reserved gifts
        #[arg(long)]
        reserved: bool,
    },
    /// Show gift details
    Show {
        /// Gift ID (full id or unique prefix/suffix)
        id: String,
    },
    /// Add a gift
    Add {
        /// Gift name
        name: String,
        #[command(flatten)]
        fields: GiftFields,
    },
    /// Edit a gift
    Edit {
        /// Gift ID (full id or unique prefix/suffix)
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        #[command(flatten)]
        fields: GiftFields,
        /// Remove the price
        #[arg(long, conflicts_with = "price")]
        clear_price: bool,
    },
    /// Delete a gift
    #[command(alias = "rm")]
    Delete {
        /// Gift ID (full id or unique prefix/suffix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Reserve a gift
    Reserve {
        /// Gift ID (full id or unique prefix/suffix)
        id: String,
        /// Who is reserving it
        #[arg(short, long)]
        name: String,
    },
    /// Show remote and cache status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, gist_id, gist_token, remote_enabled, api_url,
        /// gist_filename, timeout_secs, log_file)
        key: String,
        /// Configuration value ("none" or "" unsets optional keys)
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work even when the config file is broken
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let store = SyncedCollectionStore::from_config(&config)?;

    match cli.command {
        Commands::List {
            available,
            reserved,
        } => {
            let filter = if available {
                ListFilter::Available
            } else if reserved {
                ListFilter::Reserved
            } else {
                ListFilter::All
            };
            commands::gift::list(&store, filter, &output).await
        }
        Commands::Show { id } => commands::gift::show(&store, id, &output).await,
        Commands::Add { name, fields } => commands::gift::add(&store, name, fields, &output)
            .await
            .map(|_| ()),
        Commands::Edit {
            id,
            name,
            fields,
            clear_price,
        } => commands::gift::edit(&store, id, name, fields, clear_price, &output)
            .await
            .map(|_| ()),
        Commands::Delete { id, yes } => commands::gift::delete(&store, id, yes, &output).await,
        Commands::Reserve { id, name } => commands::gift::reserve(&store, id, name, &output)
            .await
            .map(|_| ()),
        Commands::Status => commands::status::show(&store, &config, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// Only initializes if WISHLIST_LOG is set. Logs go to `config.log_file`
/// when configured, otherwise to stderr.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("WISHLIST_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "wishlist_core={},wishlist_cli={}",
        log_level, log_level
    ));

    match &config.log_file {
        Some(log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(log_file)
                .try_init();
            info!("Logging to {:?}", log_path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
