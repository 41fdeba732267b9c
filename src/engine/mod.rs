// src/engine/mod.rs
// Remote automation engine: the abstract call seam and document lifecycle calls

pub mod client;
pub mod connection;
pub mod protocol;

pub use client::{BridgeClient, TcpConnector};
pub use connection::{ConnectionManager, ConnectionState};

use crate::error::{OfficeError, Result};
use crate::session::{DocumentHandle, DocumentKind};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Where the engine listens and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEndpoint {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl EngineEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl fmt::Display for EngineEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A live link to the engine. Every remote operation goes through `call`.
#[async_trait]
pub trait RemoteEngine: Send + Sync {
    /// Invoke a named engine method. Engine-reported failures come back as
    /// [`OfficeError::RemoteOperation`], link failures as [`OfficeError::Connection`].
    async fn call(&self, method: &str, params: Value) -> Result<Value>;

    /// Tell the engine this client is going away. Failures are ignored.
    async fn close(&self) {}

    /// False once the link has failed; a later `connect` replaces it.
    fn is_alive(&self) -> bool {
        true
    }
}

/// Opens links to the engine. Swapped out in tests for an in-memory engine.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &EngineEndpoint) -> Result<Arc<dyn RemoteEngine>>;
}

fn handle_from_result(method: &str, value: Value) -> Result<DocumentHandle> {
    let opened: protocol::OpenedDocument = serde_json::from_value(value).map_err(|e| {
        OfficeError::RemoteOperation(format!("{} returned no document handle: {}", method, e))
    })?;
    Ok(DocumentHandle::new(opened.handle))
}

/// Load an existing file into the engine
pub async fn open_document(
    engine: &dyn RemoteEngine,
    path: &str,
    kind: DocumentKind,
) -> Result<DocumentHandle> {
    let result = engine
        .call(
            protocol::METHOD_OPEN_DOCUMENT,
            json!({ "path": path, "kind": kind.doc_type() }),
        )
        .await?;
    handle_from_result(protocol::METHOD_OPEN_DOCUMENT, result)
}

/// Create a blank document of `kind`
pub async fn create_document(engine: &dyn RemoteEngine, kind: DocumentKind) -> Result<DocumentHandle> {
    let result = engine
        .call(
            protocol::METHOD_CREATE_DOCUMENT,
            json!({ "kind": kind.doc_type() }),
        )
        .await?;
    handle_from_result(protocol::METHOD_CREATE_DOCUMENT, result)
}

pub async fn dispose_document(engine: &dyn RemoteEngine, handle: &DocumentHandle) -> Result<()> {
    engine
        .call(protocol::METHOD_DISPOSE_DOCUMENT, json!({ "handle": handle }))
        .await?;
    Ok(())
}

pub async fn save_document(
    engine: &dyn RemoteEngine,
    handle: &DocumentHandle,
    path: &str,
) -> Result<()> {
    engine
        .call(
            protocol::METHOD_SAVE_DOCUMENT,
            json!({ "handle": handle, "path": path }),
        )
        .await?;
    Ok(())
}
