// src/mcp/requests.rs
// MCP tool request types

use crate::tools::base::ColumnSpec;
use rmcp::schemars;
use serde::Deserialize;
use serde_json::{Map, Value};

// ============================================================================
// Document management
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OpenDocumentRequest {
    #[schemars(description = "Path or file URL of the document to open")]
    pub url: String,
    #[schemars(description = "Document type: writer, calc, draw, impress, base")]
    pub doc_type: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NewDocumentRequest {
    #[schemars(description = "Document type: writer, calc, draw, impress, base")]
    pub doc_type: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DocumentRequest {
    #[schemars(description = "Session ID returned by open_document or new_document (e.g. doc_0)")]
    pub doc_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveDocumentRequest {
    #[schemars(description = "Session ID")]
    pub doc_id: String,
    #[schemars(description = "Target path, relative to the output directory")]
    pub url: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RunMacroRequest {
    #[schemars(description = "Session ID")]
    pub doc_id: String,
    #[schemars(description = "Macro name stored in the document, e.g. Module.function")]
    pub macro_name: String,
}

// ============================================================================
// Spreadsheet
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CellRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Sheet name")]
    pub sheet_name: String,
    #[schemars(description = "Cell address, e.g. B7")]
    pub cell_address: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetCellRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Sheet name")]
    pub sheet_name: String,
    #[schemars(description = "Cell address, e.g. B7")]
    pub cell_address: String,
    #[schemars(description = "Value; numeric text is stored as a number")]
    pub value: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NewSheetRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Name of the sheet to append")]
    pub sheet_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RangeRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Sheet name")]
    pub sheet_name: String,
    #[schemars(description = "Range, e.g. A1:C10")]
    pub range_address: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PivotTableRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Sheet name")]
    pub sheet_name: String,
    #[schemars(description = "Source data range, e.g. A1:D50")]
    pub source_range: String,
    #[schemars(description = "Top-left cell of the pivot table")]
    pub target_cell: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SortRangeRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Sheet name")]
    pub sheet_name: String,
    #[schemars(description = "Range to sort")]
    pub range_address: String,
    #[schemars(description = "Column to sort by, zero-based within the range")]
    pub sort_column: u32,
    #[schemars(description = "Ascending order (default: true)")]
    pub ascending: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FormatTableRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Sheet name")]
    pub sheet_name: String,
    #[schemars(description = "Range to format")]
    pub range_address: String,
    #[schemars(description = "Border width (default: 1)")]
    pub border_width: Option<u32>,
    #[schemars(description = "Background color as #RRGGBB (default: #FFFFFF)")]
    pub background_color: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ChartRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Sheet name")]
    pub sheet_name: String,
    #[schemars(description = "Data range")]
    pub range_address: String,
    #[schemars(description = "Cell where the chart is anchored")]
    pub target_cell: String,
    #[schemars(description = "Chart type: column, bar, line, pie (default: column)")]
    pub chart_type: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FormControlRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Sheet name")]
    pub sheet_name: String,
    #[schemars(description = "Cell where the control is placed")]
    pub cell_address: String,
    #[schemars(description = "Control type: checkbox, button, listbox")]
    pub control_type: String,
    #[schemars(description = "Control label")]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FilterRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Sheet name")]
    pub sheet_name: String,
    #[schemars(description = "Range to filter")]
    pub range_address: String,
    #[schemars(description = "Column to filter on, zero-based within the range")]
    pub column: u32,
    #[schemars(description = "Value rows must equal to stay visible")]
    pub value: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConditionalFormatRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Sheet name")]
    pub sheet_name: String,
    #[schemars(description = "Range the condition applies to")]
    pub range_address: String,
    #[schemars(description = "Operator: equal, not_equal, greater, greater_equal, less, less_equal")]
    pub operator: String,
    #[schemars(description = "Value compared against")]
    pub value: String,
    #[schemars(description = "Cell style applied when the condition holds")]
    pub style_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GroupRangeRequest {
    #[schemars(description = "Session ID of a spreadsheet")]
    pub doc_id: String,
    #[schemars(description = "Sheet name")]
    pub sheet_name: String,
    #[schemars(description = "Range to group")]
    pub range_address: String,
    #[schemars(description = "Group by: rows or columns (default: rows)")]
    pub by: Option<String>,
}

// ============================================================================
// Text
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct InsertTextRequest {
    #[schemars(description = "Session ID of a text document")]
    pub doc_id: String,
    #[schemars(description = "Text to insert")]
    pub text: String,
    #[schemars(description = "Character offset (default: 0)")]
    pub position: Option<u64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ApplyStyleRequest {
    #[schemars(description = "Session ID of a text document")]
    pub doc_id: String,
    #[schemars(description = "Paragraph style name, e.g. Heading 1")]
    pub style_name: String,
    #[schemars(description = "Start character offset")]
    pub start: u64,
    #[schemars(description = "End character offset")]
    pub end: u64,
}

// ============================================================================
// Database
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueryRequest {
    #[schemars(description = "Session ID of a database document")]
    pub doc_id: String,
    #[schemars(description = "SQL statement")]
    pub sql: String,
    #[schemars(description = "Database user (default: empty)")]
    pub username: Option<String>,
    #[schemars(description = "Database password (default: empty)")]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateTableRequest {
    #[schemars(description = "Session ID of a database document")]
    pub doc_id: String,
    #[schemars(description = "Table name")]
    pub table_name: String,
    #[schemars(description = "Columns as [{name, type}]")]
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct InsertDataRequest {
    #[schemars(description = "Session ID of a database document")]
    pub doc_id: String,
    #[schemars(description = "Table name")]
    pub table_name: String,
    #[schemars(description = "One row as {column: value}")]
    pub data: Map<String, Value>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateFormRequest {
    #[schemars(description = "Session ID of a database document")]
    pub doc_id: String,
    #[schemars(description = "Table the form edits")]
    pub table_name: String,
    #[schemars(description = "Form name")]
    pub form_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateReportRequest {
    #[schemars(description = "Session ID of a database document")]
    pub doc_id: String,
    #[schemars(description = "Table the report reads")]
    pub table_name: String,
    #[schemars(description = "Report name")]
    pub report_name: String,
}
