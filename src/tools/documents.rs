// src/tools/documents.rs
// Document lifecycle tools: open, create, save, close, list, run macro

use crate::dispatch::Operation;
use crate::engine::{self, RemoteEngine};
use crate::error::{OfficeError, Result};
use crate::session::{DocumentHandle, DocumentKind, SessionId};
use crate::state::OfficeState;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Register a handle the engine just issued; dispose it again if registration is refused.
async fn register_or_dispose(
    state: &OfficeState,
    engine: &Arc<dyn RemoteEngine>,
    handle: DocumentHandle,
    kind: DocumentKind,
) -> Result<SessionId> {
    match state.register(handle.clone(), kind).await {
        Ok(id) => Ok(id),
        Err(e) => {
            if let Err(dispose_err) = engine::dispose_document(engine.as_ref(), &handle).await {
                warn!(handle = %handle, error = %dispose_err, "Failed to dispose unregistered document");
            }
            Err(e)
        }
    }
}

/// Open an existing file. Returns the new session id.
pub async fn open_document(state: &OfficeState, url: &str, doc_type: &str) -> Result<String> {
    let kind = DocumentKind::from_doc_type(doc_type)?;
    if url.trim().is_empty() {
        return Err(OfficeError::InvalidInput("document path is empty".to_string()));
    }

    let engine = state.engine().await?;
    let handle = engine::open_document(engine.as_ref(), url, kind)
        .await
        .map_err(|e| match e {
            OfficeError::RemoteOperation(msg) => {
                OfficeError::RemoteOperation(format!("Failed to open document: {}", msg))
            }
            other => other,
        })?;

    let id = register_or_dispose(state, &engine, handle, kind).await?;
    info!(session = %id, kind = %kind, path = url, "Opened document");
    Ok(id.to_string())
}

/// Create a blank document. Returns the new session id.
pub async fn new_document(state: &OfficeState, doc_type: &str) -> Result<String> {
    let kind = DocumentKind::from_doc_type(doc_type)?;

    let engine = state.engine().await?;
    let handle = engine::create_document(engine.as_ref(), kind)
        .await
        .map_err(|e| match e {
            OfficeError::RemoteOperation(msg) => {
                OfficeError::RemoteOperation(format!("Failed to create new document: {}", msg))
            }
            other => other,
        })?;

    let id = register_or_dispose(state, &engine, handle, kind).await?;
    info!(session = %id, kind = %kind, "Created document");
    Ok(id.to_string())
}

/// Save to a path inside the output directory
pub async fn save_document(state: &OfficeState, doc_id: &str, url: &str) -> Result<String> {
    let target = state.resolve_output_path(url)?;
    let doc = state.authorize(doc_id, Operation::SaveDocument).await?;

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let path = target.to_string_lossy();
    engine::save_document(doc.engine.as_ref(), &doc.handle, &path).await?;
    info!(session = doc_id, path = %path, "Saved document");
    Ok(format!("Document saved to {}", url))
}

/// Close a document and forget its session.
///
/// The session is removed before the engine is asked to dispose the document,
/// so a second close of the same id always reports `SessionNotFound`.
pub async fn close_document(state: &OfficeState, doc_id: &str) -> Result<String> {
    let doc = state.authorize(doc_id, Operation::CloseDocument).await?;
    let id: SessionId = doc_id.parse()?;
    state.registry.remove(id)?;

    engine::dispose_document(doc.engine.as_ref(), &doc.handle)
        .await
        .map_err(|e| match e {
            OfficeError::RemoteOperation(msg) => OfficeError::RemoteOperation(format!(
                "Session {} was removed but the engine failed to close it: {}",
                id, msg
            )),
            other => other,
        })?;

    info!(session = %id, "Closed document");
    Ok(format!("Document {} closed", id))
}

#[derive(Debug, Serialize)]
struct DocumentSummary {
    doc_id: String,
    kind: DocumentKind,
    doc_type: &'static str,
    created_at: String,
}

/// List open sessions
pub async fn list_documents(state: &OfficeState) -> Result<String> {
    let sessions = state.registry.list();
    if sessions.is_empty() {
        return Ok("No open documents.".to_string());
    }
    let summaries: Vec<DocumentSummary> = sessions
        .into_iter()
        .map(|s| DocumentSummary {
            doc_id: s.id.to_string(),
            kind: s.kind,
            doc_type: s.kind.doc_type(),
            created_at: s.created_at.to_rfc3339(),
        })
        .collect();
    super::to_pretty_json(&summaries)
}

/// Run a Python macro stored in the document
pub async fn run_macro(state: &OfficeState, doc_id: &str, macro_name: &str) -> Result<String> {
    let name = macro_name.trim();
    if name.is_empty() || name.contains(['?', '&', '\n']) {
        return Err(OfficeError::InvalidInput(format!(
            "invalid macro name '{}'",
            macro_name
        )));
    }

    let doc = state.authorize(doc_id, Operation::RunMacro).await?;
    let uri = format!(
        "vnd.sun.star.script:{}?language=Python&location=document",
        name
    );
    doc.engine
        .call(
            "document.invoke_script",
            json!({ "handle": doc.handle, "uri": uri }),
        )
        .await?;
    Ok(format!("Executed macro '{}'", name))
}
