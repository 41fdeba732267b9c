// src/session/mod.rs
// Session model: identifiers, document handles and document kinds

pub mod registry;

pub use registry::SessionRegistry;

use crate::error::{OfficeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Prefix of every rendered session identifier (`doc_0`, `doc_1`, ...)
const SESSION_ID_PREFIX: &str = "doc_";

/// Category of document a session holds.
///
/// Fixed at session creation. Which operations a session accepts is decided
/// by [`crate::dispatch::Operation::required_kind`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DocumentKind {
    Spreadsheet,
    Text,
    Drawing,
    Presentation,
    Database,
}

impl DocumentKind {
    /// Office module names accepted by `open_document`/`new_document`
    pub const DOC_TYPES: [&'static str; 5] = ["writer", "calc", "draw", "impress", "base"];

    /// Resolve a user-facing document type (`calc`, `writer`, ...) or a kind name.
    pub fn from_doc_type(doc_type: &str) -> Result<Self> {
        let normalized = doc_type.trim().to_lowercase();
        let kind = match normalized.as_str() {
            "writer" => Some(DocumentKind::Text),
            "calc" => Some(DocumentKind::Spreadsheet),
            "draw" => Some(DocumentKind::Drawing),
            "impress" => Some(DocumentKind::Presentation),
            "base" => Some(DocumentKind::Database),
            other => DocumentKind::from_str(other).ok(),
        };
        kind.ok_or_else(|| {
            OfficeError::InvalidInput(format!(
                "Invalid document type '{}'. Use: {}",
                doc_type,
                Self::DOC_TYPES.join(", ")
            ))
        })
    }

    /// Office module name, as sent to the engine
    pub fn doc_type(&self) -> &'static str {
        match self {
            DocumentKind::Text => "writer",
            DocumentKind::Spreadsheet => "calc",
            DocumentKind::Drawing => "draw",
            DocumentKind::Presentation => "impress",
            DocumentKind::Database => "base",
        }
    }
}

/// Opaque session identifier, rendered as `doc_<n>`.
///
/// Only [`SessionRegistry::allocate`] mints new values; parsing text yields an
/// identifier that may or may not name a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn from_counter(n: u64) -> Self {
        Self(n)
    }

    pub fn counter(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", SESSION_ID_PREFIX, self.0)
    }
}

impl FromStr for SessionId {
    type Err = OfficeError;

    fn from_str(s: &str) -> Result<Self> {
        s.strip_prefix(SESSION_ID_PREFIX)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<u64>().ok())
            .map(SessionId)
            .ok_or_else(|| OfficeError::SessionNotFound(s.to_string()))
    }
}

/// Engine-issued reference to an open document.
///
/// The document itself lives in the engine; this token is what every remote
/// call uses to address it. A fresh token is issued per open/create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentHandle(String);

impl DocumentHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registry entry binding a document handle to its kind
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub handle: DocumentHandle,
    pub kind: DocumentKind,
    pub created_at: DateTime<Utc>,
}
