// src/cli/check.rs
// Configuration and engine reachability check

use anyhow::{Result, bail};
use office_mcp::config::{EnvConfig, OfficeConfig};
use office_mcp::engine::{Connector, TcpConnector};

pub async fn run_check() -> Result<()> {
    let config = EnvConfig::load();
    let config_file = OfficeConfig::config_dir().join("config.toml");

    println!("Config file:        {}", config_file.display());
    println!("Engine:             {}", config.endpoint());
    println!("Output directory:   {}", config.output_dir.display());
    println!("Connect timeout:    {}s", config.connect_timeout.as_secs());
    println!("Request timeout:    {}s", config.request_timeout.as_secs());
    println!("Require connection: {}", config.require_connection);

    let validation = config.validate();
    if !validation.warnings.is_empty() || !validation.errors.is_empty() {
        println!();
        println!("{}", validation.report());
    }
    if !validation.is_valid() {
        bail!("configuration is invalid");
    }

    let engine = TcpConnector.connect(&config.endpoint()).await?;
    println!();
    println!("Engine reachable at {}", config.endpoint());
    engine.close().await;
    Ok(())
}
