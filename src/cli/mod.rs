// src/cli/mod.rs
// CLI module for office-mcp commands

use clap::{Parser, Subcommand};

pub mod check;
pub mod serve;
pub mod tool;

pub use check::run_check;
pub use serve::run_mcp_server;
pub use tool::run_tool;

#[derive(Parser)]
#[command(name = "office-mcp")]
#[command(about = "MCP server for office document automation")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server over stdio (default)
    Serve,

    /// Execute a tool directly
    Tool {
        /// Tool name (e.g. new_document, set_cell_value)
        #[arg(index = 1)]
        name: String,

        /// JSON arguments (e.g. '{"doc_type": "calc"}')
        #[arg(index = 2, default_value = "{}")]
        args: String,
    },

    /// Validate configuration and try to reach the engine
    Check,
}
