//! mcp-youtrack - YouTrack tools for AI assistants.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use youtrack_api::YouTrackClient;
use youtrack_cli::shell::{DirectBackend, Shell, ToolsBackend};
use youtrack_core::config::{TOKEN_VAR, URL_VAR};
use youtrack_core::{Config, IssueTracker, TrackerConfig};
use youtrack_mcp::{McpServer, ToolHandler, Tools};

const SETTINGS_KEYS: &[&str] = &["youtrack.url", "youtrack.timeout"];

#[derive(Parser)]
#[command(name = "mcp-youtrack")]
#[command(author, version, about = "YouTrack tools for AI assistants over MCP", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server on stdin/stdout (default)
    Serve,

    /// Start the interactive shell
    Shell {
        /// Call the tracker directly instead of going through the MCP tools
        #[arg(long)]
        direct: bool,
    },

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print a single setting
    Get {
        /// Setting key, e.g. youtrack.url
        key: String,
    },

    /// Store a setting
    Set {
        /// Setting key, e.g. youtrack.url
        key: String,
        /// New value
        value: String,
    },

    /// Print the settings file location
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    // Logs go to stderr; stdout carries the protocol or the shell
    let default_level = match (&command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Shell { .. }, false) => "warn",
        _ => "info",
    };
    let filter = if cli.verbose {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Serve => {
            let tracker = connect()?;
            tracing::info!("Starting MCP server for {}", tracker.name());

            let mut server = McpServer::new(ToolHandler::new(Tools::new(tracker)));
            server.run().await?;
        }
        Commands::Shell { direct } => {
            let tracker = connect()?;
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let output = tokio::io::stdout();

            if direct {
                Shell::new(DirectBackend::new(tracker))
                    .run(input, output)
                    .await?;
            } else {
                Shell::new(ToolsBackend::new(Tools::new(tracker)))
                    .run(input, output)
                    .await?;
            }
        }
        Commands::Config { command } => run_config(command)?,
    }

    Ok(())
}

/// Resolve configuration and build the tracker client.
///
/// Missing or invalid configuration ends the process with exit code 1.
fn connect() -> anyhow::Result<Arc<dyn IssueTracker>> {
    let config = match TrackerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::error!("Set {} and {} (or add them to .env)", URL_VAR, TOKEN_VAR);
            std::process::exit(1);
        }
    };

    tracing::debug!(?config, "resolved configuration");
    Ok(Arc::new(YouTrackClient::new(&config)?))
}

fn run_config(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load()?;
            println!("Settings file: {}", Config::config_path()?.display());
            for key in SETTINGS_KEYS {
                let value = config.get(key)?;
                println!("{} = {}", key, value.as_deref().unwrap_or("(not set)"));
            }

            for var in [URL_VAR, TOKEN_VAR] {
                let state = match std::env::var(var) {
                    Ok(v) if !v.trim().is_empty() => "set",
                    _ => "not set",
                };
                println!("{}: {}", var, state);
            }
        }
        ConfigCommands::Get { key } => match Config::load()?.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(not set)"),
        },
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            tracing::info!("Saved {} to {}", key, Config::config_path()?.display());
        }
        ConfigCommands::Path => println!("{}", Config::config_path()?.display()),
    }

    Ok(())
}
