// src/engine/protocol.rs
// Wire format for the office bridge: newline-delimited JSON over TCP
//
// Every request carries a numeric id that the bridge echoes back. A response
// holds exactly one of `result` or `error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum line size (10MB). Protects against memory exhaustion from malformed messages.
pub const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// Handshake method sent right after the socket opens
pub const METHOD_HELLO: &str = "hello";
/// Best-effort notice sent before the client drops the link
pub const METHOD_SHUTDOWN: &str = "shutdown";

pub const METHOD_OPEN_DOCUMENT: &str = "open_document";
pub const METHOD_CREATE_DOCUMENT: &str = "create_document";
pub const METHOD_DISPOSE_DOCUMENT: &str = "dispose_document";
pub const METHOD_SAVE_DOCUMENT: &str = "save_document";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
}

/// Failure reported by the bridge for a single request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl RemoteError {
    /// Message with the bridge's error code prefixed when present
    pub fn describe(&self) -> String {
        match &self.code {
            Some(code) => format!("[{}] {}", code, self.message),
            None => self.message.clone(),
        }
    }
}

/// Handshake parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hello {
    pub client: String,
    pub version: String,
}

/// Result of `open_document`/`create_document`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenedDocument {
    pub handle: String,
}
