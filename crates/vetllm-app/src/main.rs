//! VetLLM application binary - composition root.
//!
//! 1. Parse CLI args and load the JSON configuration
//! 2. Install tracing
//! 3. Build the shared prompt catalog
//! 4. Run the relay server, the terminal chat client, or write a config file

mod cli;
mod terminal;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vetllm_core::{Catalog, VetConfig};
use vetllm_flow::{ChatSession, FlowController, HttpRelayClient};
use vetllm_relay::{start_server, AppState};

use cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing so its log level can seed the filter.
    let config_file = args.resolve_config_path();
    let (mut config, load_error) = VetConfig::load_or_default(&config_file);

    // Tracing.
    let level = args.resolve_log_level(&config.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)))
        .init();

    tracing::info!("Starting VetLLM v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            api_base_url = %config.api_base_url,
            "Failed to load config, using fallback"
        ),
    }

    let catalog = Arc::new(Catalog::builtin());

    match args.command() {
        Command::Serve { port, public_dir } => {
            config.server.port = cli::resolve_port(port, config.server.port);
            if let Some(dir) = public_dir {
                config.server.public_dir = dir.to_string_lossy().to_string();
            }
            tracing::info!(
                api_base_url = %config.api_base_url,
                public_dir = %config.server.public_dir,
                "Relay configured"
            );

            let state = AppState::from_config(config, catalog)?;
            start_server(state).await?;
        }
        Command::Chat {
            relay_url,
            provider,
        } => {
            let relay_url = cli::resolve_relay_url(relay_url, &config.client.relay_url);
            let provider = provider.unwrap_or_else(|| config.client.provider.clone());
            tracing::info!(relay_url = %relay_url, provider = %provider, "Starting chat client");

            let transport = HttpRelayClient::new(&relay_url, config.request_timeout())?;
            let controller = FlowController::new(catalog, provider);
            let mut session = ChatSession::new(controller, Arc::new(transport));

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            terminal::run(&mut session, stdin, &mut stdout).await?;
        }
        Command::Init { force } => {
            write_default_config(&config_file, force)?;
        }
    }

    Ok(())
}

/// Write `VetConfig::default()` to `path`, refusing to overwrite unless forced.
fn write_default_config(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        tracing::error!(path = %path.display(), "Config file exists, pass --force to overwrite");
        return Err(format!("{} already exists", path.display()).into());
    }
    VetConfig::default().save(path)?;
    Ok(())
}
