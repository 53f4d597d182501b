//! pagekit CLI — the main entry point.
//!
//! Commands:
//! - `init`     — Write a starter config and manifest directory
//! - `render`   — Render a configured page to stdout
//! - `resolve`  — Resolve a symbolic asset name to its path
//! - `serve`    — Start the HTTP gateway
//! - `config`   — Show, locate or validate the configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "pagekit",
    about = "pagekit — ordered page assets, rendered per request",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.pagekit/config.toml)
    #[arg(short, long, global = true, env = "PAGEKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config and manifest directory
    Init,

    /// Render a configured page to stdout
    Render {
        /// Page name from the config
        page: String,

        /// Override the configured render mode
        #[arg(short, long)]
        mode: Option<pagekit_core::RenderMode>,

        /// Print the head fragments as JSON instead of a full document
        #[arg(long)]
        fragments: bool,
    },

    /// Resolve a symbolic asset name to its path
    Resolve {
        /// Symbolic name such as `Shop.Checkout`
        name: String,

        /// File extension
        #[arg(short, long, default_value = "css")]
        ext: String,

        /// Root prefix (defaults to the configured css/js root)
        #[arg(short, long)]
        root: Option<String>,
    },

    /// Start the HTTP gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
    /// Validate the configuration and page definitions
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Init => commands::init::run(config_path).await?,
        Commands::Render {
            page,
            mode,
            fragments,
        } => commands::render::run(config_path, &page, mode, fragments).await?,
        Commands::Resolve { name, ext, root } => {
            commands::resolve::run(config_path, &name, &ext, root).await?
        }
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path).await?,
            ConfigAction::Path => commands::config_cmd::path(config_path).await?,
            ConfigAction::Validate => commands::config_cmd::validate(config_path).await?,
        },
    }

    Ok(())
}
