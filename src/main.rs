// src/main.rs
// office-mcp - MCP server for office document automation

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use office_mcp::config::OfficeConfig;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Log level override, e.g. OFFICE_MCP_LOG=debug
const LOG_ENV: &str = "OFFICE_MCP_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env files; variables already set win over both
    let _ = dotenvy::from_path(OfficeConfig::config_dir().join(".env"));
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up logging based on command
    let default_level = match &cli.command {
        Some(Commands::Serve) | None => Level::WARN, // Quiet for MCP stdio
        Some(Commands::Tool { .. }) | Some(Commands::Check) => Level::INFO,
    };
    let log_level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| Level::from_str(v.trim()).ok())
        .unwrap_or(default_level);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        None | Some(Commands::Serve) => {
            cli::run_mcp_server().await?;
        }
        Some(Commands::Tool { name, args }) => {
            cli::run_tool(name, args).await?;
        }
        Some(Commands::Check) => {
            cli::run_check().await?;
        }
    }

    Ok(())
}
