// src/cli/serve.rs
// MCP server initialization and main loop

use anyhow::Result;
use office_mcp::OfficeError;
use office_mcp::config::EnvConfig;
use office_mcp::mcp::OfficeServer;
use office_mcp::state::OfficeState;
use std::sync::Arc;
use tracing::{info, warn};

/// Load configuration and build the shared state
pub fn setup_state() -> Result<Arc<OfficeState>> {
    let env_config = EnvConfig::load();

    let validation = env_config.validate();
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    if !validation.is_valid() {
        return Err(OfficeError::Config(validation.report()).into());
    }

    let state = OfficeState::from_config(&env_config);
    state.ensure_output_dir()?;
    info!(
        engine = %state.connection.endpoint(),
        output_dir = %state.output_dir.display(),
        "Office state ready"
    );
    Ok(Arc::new(state))
}

/// Close what is still open and report it
pub async fn shutdown(state: &OfficeState) {
    let report = state.shutdown().await;
    if !report.closed.is_empty() {
        info!(count = report.closed.len(), "Closed documents at shutdown");
    }
    for (id, error) in &report.failed {
        warn!(session = %id, %error, "Document left open at shutdown");
    }
}

pub async fn run_mcp_server() -> Result<()> {
    let state = setup_state()?;
    let server = OfficeServer::new(state.clone());

    // Run with stdio transport
    let transport = rmcp::transport::io::stdio();
    let served = match rmcp::serve_server(server, transport).await {
        Ok(service) => service.waiting().await.map(|_| ()).map_err(anyhow::Error::from),
        Err(e) => Err(e.into()),
    };

    shutdown(&state).await;
    served
}
