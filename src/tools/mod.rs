//! Operation catalog.
//!
//! Every tool is an async function taking `&OfficeState` and returning
//! `Result<String>`. Document-bound tools pass through
//! [`OfficeState::authorize`] first, and parse any cell or range text before
//! the first remote call, so bad input never reaches the engine.

pub mod base;
pub mod calc;
pub mod documents;
pub mod writer;

pub use base::{create_form, create_report, create_table, insert_data, list_tables, run_query};
pub use calc::{
    add_conditional_format, apply_filter, calculate_statistics, create_chart, create_new_sheet,
    create_pivot_table, format_table, get_cell_value, get_sheet_names, group_range,
    insert_form_control, set_cell_value, sort_range,
};
pub use documents::{
    close_document, list_documents, new_document, open_document, run_macro, save_document,
};
pub use writer::{apply_style, insert_text};

use crate::error::{OfficeError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode an engine result into the shape a tool expects.
pub(crate) fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        OfficeError::RemoteOperation(format!("unexpected result from {}: {}", method, e))
    })
}

/// Render values for tool output
pub(crate) fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
