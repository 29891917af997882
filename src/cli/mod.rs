//! CLI module for Switchyard
//!
//! # Commands
//!
//! - `serve` - Start the proxy
//! - `providers` - Show the configured provider catalog
//! - `status` - Show live provider health from a running server
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! switchyard serve -c switchyard.toml
//! switchyard providers --json
//! switchyard status --url http://localhost:8000
//! switchyard completions bash > ~/.bash_completion.d/switchyard
//! ```

pub mod completions;
pub mod config;
pub mod output;
pub mod providers;
pub mod serve;
pub mod status;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Switchyard - resilient dispatch proxy for LLM providers
#[derive(Parser, Debug)]
#[command(
    name = "switchyard",
    version,
    about = "Health-ranked, circuit-broken dispatch proxy for OpenAI-compatible LLM providers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the proxy server
    Serve(ServeArgs),
    /// Show configured providers
    Providers(ProvidersArgs),
    /// Show live provider status from a running server
    Status(StatusArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "SWITCHYARD_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "SWITCHYARD_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SWITCHYARD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Disable background health probes
    #[arg(long)]
    pub no_health_check: bool,
}

#[derive(Args, Debug)]
pub struct ProvidersArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Only list providers serving this model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to configuration file
    #[arg(short, long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Base URL of the running server
    #[arg(short, long, default_value = "http://localhost:8000", env = "SWITCHYARD_URL")]
    pub url: String,

    /// Run a probe round before reporting
    #[arg(long)]
    pub check: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
