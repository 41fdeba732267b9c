// src/state.rs
// Shared server state: connection, session table and output location

use crate::config::EnvConfig;
use crate::dispatch::{self, Operation};
use crate::engine::{self, ConnectionManager, Connector, RemoteEngine, TcpConnector};
use crate::error::{OfficeError, Result};
use crate::session::{DocumentHandle, DocumentKind, SessionId, SessionRegistry};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a tool call needs, owned in one place and passed explicitly.
pub struct OfficeState {
    pub connection: ConnectionManager,
    pub registry: SessionRegistry,
    pub output_dir: PathBuf,
    /// Reject session registration while no engine link exists
    pub require_connection: bool,
}

/// Outcome of closing the remaining sessions at shutdown
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub closed: Vec<SessionId>,
    pub failed: Vec<(SessionId, String)>,
}

/// A session that passed dispatch, not yet bound to an engine link
#[derive(Debug, Clone)]
pub struct Admitted {
    pub handle: DocumentHandle,
    pub kind: DocumentKind,
}

/// A session that passed dispatch, with the engine link to act on it
pub struct Authorized {
    pub engine: Arc<dyn RemoteEngine>,
    pub handle: DocumentHandle,
    pub kind: DocumentKind,
}

impl OfficeState {
    pub fn new(config: &EnvConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            connection: ConnectionManager::new(config.endpoint(), connector),
            registry: SessionRegistry::new(),
            output_dir: config.output_dir.clone(),
            require_connection: config.require_connection,
        }
    }

    /// State backed by the real TCP bridge
    pub fn from_config(config: &EnvConfig) -> Self {
        Self::new(config, Arc::new(TcpConnector))
    }

    /// Create the output directory if missing
    pub fn ensure_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// The engine link, connecting on first use
    pub async fn engine(&self) -> Result<Arc<dyn RemoteEngine>> {
        self.connection.connect().await
    }

    /// Add an opened document to the session table.
    pub async fn register(&self, handle: DocumentHandle, kind: DocumentKind) -> Result<SessionId> {
        if self.require_connection && !self.connection.is_connected().await {
            return Err(OfficeError::Connection(
                "cannot register a document while disconnected from the engine".to_string(),
            ));
        }
        Ok(self.registry.allocate(handle, kind))
    }

    /// Run dispatch for `op` on `doc_id` without touching the engine.
    pub fn admit(&self, doc_id: &str, op: Operation) -> Result<Admitted> {
        let (handle, kind) = dispatch::authorize_operation(&self.registry, doc_id, op)?;
        Ok(Admitted { handle, kind })
    }

    /// Pair an admitted session with the engine link, connecting on first use.
    pub async fn attach(&self, admitted: Admitted) -> Result<Authorized> {
        let engine = self.engine().await?;
        Ok(Authorized {
            engine,
            handle: admitted.handle,
            kind: admitted.kind,
        })
    }

    /// Run dispatch for `op` on `doc_id`, then fetch the engine link.
    ///
    /// Dispatch runs first so a bad id or kind never triggers a connection attempt.
    /// Tools with input to parse call `admit` and `attach` separately instead.
    pub async fn authorize(&self, doc_id: &str, op: Operation) -> Result<Authorized> {
        let admitted = self.admit(doc_id, op)?;
        self.attach(admitted).await
    }

    /// Resolve a save target against the output directory.
    ///
    /// Only relative paths that stay inside the directory are accepted.
    pub fn resolve_output_path(&self, url: &str) -> Result<PathBuf> {
        let relative = Path::new(url.trim());
        if relative.as_os_str().is_empty() {
            return Err(OfficeError::InvalidInput("save path is empty".to_string()));
        }
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(OfficeError::InvalidInput(format!(
                        "save path '{}' must be relative to the output directory",
                        url
                    )));
                }
            }
        }
        Ok(self.output_dir.join(relative))
    }

    /// Close every remaining session, then drop the engine link.
    pub async fn shutdown(&self) -> ShutdownReport {
        let sessions = self.registry.drain_all();
        let mut report = ShutdownReport::default();

        if !sessions.is_empty() {
            info!(count = sessions.len(), "Closing remaining documents");
        }

        let engine = self.connection.current().await;
        for session in sessions {
            let outcome = match &engine {
                Some(engine) => engine::dispose_document(engine.as_ref(), &session.handle).await,
                None => Err(OfficeError::Connection("engine not connected".to_string())),
            };
            match outcome {
                Ok(()) => report.closed.push(session.id),
                Err(e) => {
                    warn!(session = %session.id, error = %e, "Failed to close document at shutdown");
                    report.failed.push((session.id, e.to_string()));
                }
            }
        }

        self.connection.disconnect().await;
        report
    }
}
