// src/engine/connection.rs
// Owns the one process-wide link to the engine

use super::{Connector, EngineEndpoint, RemoteEngine};
use crate::error::{OfficeError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Lazily connects on first use and hands out the shared engine link.
///
/// The async mutex is held across the connect attempt, so concurrent callers
/// wait for one attempt instead of racing several sockets. There is no retry
/// loop: a failed `connect` leaves the manager disconnected and the next
/// explicit `connect` tries again.
pub struct ConnectionManager {
    endpoint: EngineEndpoint,
    connector: Arc<dyn Connector>,
    engine: Mutex<Option<Arc<dyn RemoteEngine>>>,
}

impl ConnectionManager {
    pub fn new(endpoint: EngineEndpoint, connector: Arc<dyn Connector>) -> Self {
        Self {
            endpoint,
            connector,
            engine: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &EngineEndpoint {
        &self.endpoint
    }

    /// Return the live link, connecting first if needed.
    pub async fn connect(&self) -> Result<Arc<dyn RemoteEngine>> {
        let mut slot = self.engine.lock().await;

        if let Some(engine) = slot.as_ref() {
            if engine.is_alive() {
                return Ok(engine.clone());
            }
            warn!(endpoint = %self.endpoint, "Discarding dead engine link");
            *slot = None;
        }

        info!(endpoint = %self.endpoint, "Connecting to office engine");
        let engine = self.connector.connect(&self.endpoint).await.map_err(|e| {
            warn!(endpoint = %self.endpoint, error = %e, "Failed to connect to office engine");
            match e {
                OfficeError::Connection(_) => e,
                other => OfficeError::Connection(other.to_string()),
            }
        })?;
        *slot = Some(engine.clone());
        Ok(engine)
    }

    /// Drop the link. Does nothing when already disconnected.
    pub async fn disconnect(&self) {
        let engine = self.engine.lock().await.take();
        if let Some(engine) = engine {
            engine.close().await;
            info!(endpoint = %self.endpoint, "Disconnected from office engine");
        }
    }

    /// The current link without connecting
    pub async fn current(&self) -> Option<Arc<dyn RemoteEngine>> {
        self.engine
            .lock()
            .await
            .as_ref()
            .filter(|e| e.is_alive())
            .cloned()
    }

    pub async fn state(&self) -> ConnectionState {
        if self.current().await.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }
}
