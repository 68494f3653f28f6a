//! CLI argument definitions for the VetLLM binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vetllm_core::config::DEFAULT_PORT;

/// VetLLM - veterinary chat relay and terminal client.
#[derive(Parser, Debug)]
#[command(name = "vetllm", version, about)]
pub struct CliArgs {
    /// Path to the JSON configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the relay server (default).
    Serve {
        /// Port to listen on.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,

        /// Directory holding chat.html and static assets.
        #[arg(long = "public-dir")]
        public_dir: Option<PathBuf>,
    },
    /// Chat with a running relay from the terminal.
    Chat {
        /// Relay base URL.
        #[arg(short = 'r', long = "relay-url")]
        relay_url: Option<String>,

        /// LLM provider to request.
        #[arg(long = "provider")]
        provider: Option<String>,
    },
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long = "force")]
        force: bool,
    },
}

impl CliArgs {
    /// The subcommand to run, `serve` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            port: None,
            public_dir: None,
        })
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > VETLLM_CONFIG env var > public/config.json.
    pub fn resolve_config_path(&self) -> PathBuf {
        config_path_from(self.config.clone(), std::env::var("VETLLM_CONFIG").ok())
    }

    /// Resolve the log filter directive.
    ///
    /// Priority: --log-level flag > config file value > info.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        match &self.log_level {
            Some(level) => level.clone(),
            None if !config_level.trim().is_empty() => config_level.to_string(),
            None => "info".to_string(),
        }
    }
}

/// Resolve the relay server port.
///
/// Priority: --port flag > PORT env var > config file value > 6543.
pub fn resolve_port(cli_port: Option<u16>, config_port: u16) -> u16 {
    port_from(cli_port, std::env::var("PORT").ok(), config_port)
}

/// Resolve the relay URL for the chat client.
///
/// Priority: --relay-url flag > VETLLM_RELAY_URL env var > config file value.
pub fn resolve_relay_url(cli_url: Option<String>, config_url: &str) -> String {
    cli_url
        .or_else(|| std::env::var("VETLLM_RELAY_URL").ok())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| config_url.to_string())
}

fn config_path_from(cli: Option<PathBuf>, env: Option<String>) -> PathBuf {
    if let Some(p) = cli {
        return p;
    }
    if let Some(p) = env.filter(|p| !p.is_empty()) {
        return PathBuf::from(p);
    }
    PathBuf::from("public").join("config.json")
}

fn port_from(cli_port: Option<u16>, env: Option<String>, config_port: u16) -> u16 {
    if let Some(p) = cli_port {
        return p;
    }
    if let Some(p) = env.and_then(|val| val.parse::<u16>().ok()) {
        return p;
    }
    if config_port != 0 {
        return config_port;
    }
    DEFAULT_PORT
}
