//! incident-jira-relay
//!
//! Main entry point for the webhook relay.

use anyhow::Context;
use clap::{Parser, Subcommand};
use incident_jira_relay::config::{validate_config, validate_config_result, RelayConfig};
use incident_jira_relay::server::RelayServer;
use incident_jira_relay::sync::ComponentSync;
use std::path::PathBuf;
use std::process;

/// Relay incident.io component fields into Jira Assets custom fields
#[derive(Parser, Debug)]
#[command(name = "incident-jira-relay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a YAML config file (default: read from environment variables)
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook listener
    Serve {
        /// Port to listen on (overrides PORT / listen_port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate configuration and print a redacted summary
    CheckConfig,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = incident_jira_relay::logging::init(&cli.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::CheckConfig => handle_check_config(&config),
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.listen_port = port;
            }
            handle_serve(config)
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RelayConfig> {
    let config = match path {
        Some(path) => RelayConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RelayConfig::from_env().context("Failed to read config from environment")?,
    };
    tracing::debug!(source = ?path, "Configuration loaded");
    Ok(config)
}

fn handle_check_config(config: &RelayConfig) -> anyhow::Result<()> {
    println!("{}", config.redacted_summary());

    let Err(errors) = validate_config(config) else {
        println!("\nConfiguration OK");
        return Ok(());
    };

    println!("\nConfiguration errors:");
    for error in &errors {
        println!("  - {}", error);
    }
    anyhow::bail!("{} configuration error(s)", errors.len())
}

fn handle_serve(config: RelayConfig) -> anyhow::Result<()> {
    validate_config_result(&config)?;

    if config.webhook_secret.is_some() {
        tracing::warn!("WEBHOOK_SECRET is set but signature verification is not enforced");
    }

    let syncer = ComponentSync::from_config(&config).context("Failed to build HTTP clients")?;
    let addr = format!("0.0.0.0:{}", config.listen_port);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime
        .block_on(RelayServer::new(syncer).run(&addr))
        .context("Webhook listener stopped")?;

    Ok(())
}
