// src/dispatch.rs
// Typed dispatch: the single place where session kinds are checked against operations

use crate::error::{OfficeError, Result};
use crate::session::{DocumentHandle, DocumentKind, SessionId, SessionRegistry};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Every catalog operation that touches an open document.
///
/// Names match the MCP tool names. `open_document`/`new_document` create
/// sessions instead of consuming one, so they are not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    // Any document
    SaveDocument,
    CloseDocument,
    RunMacro,

    // Spreadsheet
    GetSheetNames,
    GetCellValue,
    SetCellValue,
    CreateNewSheet,
    CreatePivotTable,
    SortRange,
    CalculateStatistics,
    FormatTable,
    CreateChart,
    InsertFormControl,
    ApplyFilter,
    AddConditionalFormat,
    GroupRange,

    // Text
    InsertText,
    ApplyStyle,

    // Database
    RunQuery,
    ListTables,
    CreateTable,
    InsertData,
    CreateForm,
    CreateReport,
}

impl Operation {
    /// Kind compatibility table. `None` accepts every kind.
    pub fn required_kind(&self) -> Option<DocumentKind> {
        use Operation::*;
        match self {
            SaveDocument | CloseDocument | RunMacro => None,

            GetSheetNames | GetCellValue | SetCellValue | CreateNewSheet | CreatePivotTable
            | SortRange | CalculateStatistics | FormatTable | CreateChart | InsertFormControl
            | ApplyFilter | AddConditionalFormat | GroupRange => Some(DocumentKind::Spreadsheet),

            InsertText | ApplyStyle => Some(DocumentKind::Text),

            RunQuery | ListTables | CreateTable | InsertData | CreateForm | CreateReport => {
                Some(DocumentKind::Database)
            }
        }
    }

    pub fn accepts(&self, kind: DocumentKind) -> bool {
        self.required_kind().is_none_or(|required| required == kind)
    }
}

/// Resolve `id` and require that it holds a `required` document.
pub fn authorize(
    registry: &SessionRegistry,
    id: SessionId,
    required: DocumentKind,
) -> Result<DocumentHandle> {
    let session = registry.lookup(id)?;
    if session.kind != required {
        return Err(OfficeError::TypeMismatch {
            actual: session.kind,
            expected: required,
        });
    }
    Ok(session.handle)
}

/// Resolve a textual session id for `op`, returning the handle and the session's kind.
pub fn authorize_operation(
    registry: &SessionRegistry,
    id: &str,
    op: Operation,
) -> Result<(DocumentHandle, DocumentKind)> {
    let id: SessionId = id.parse()?;
    match op.required_kind() {
        Some(required) => Ok((authorize(registry, id, required)?, required)),
        None => {
            let session = registry.lookup(id)?;
            Ok((session.handle, session.kind))
        }
    }
}
