// src/tools/writer.rs
// Text document tools

use super::decode;
use crate::dispatch::Operation;
use crate::error::{OfficeError, Result};
use crate::state::{Authorized, OfficeState};
use serde_json::json;

async fn text_length(doc: &Authorized) -> Result<u64> {
    let method = "writer.get_text_length";
    let value = doc.engine.call(method, json!({ "handle": doc.handle })).await?;
    decode(method, value)
}

/// Positions are character offsets into the body text, `0..=len`.
fn check_position(position: u64, len: u64) -> Result<()> {
    if position > len {
        return Err(OfficeError::InvalidInput(format!(
            "position {} is past the end of the text (length {})",
            position, len
        )));
    }
    Ok(())
}

fn check_span(start: u64, end: u64, len: u64) -> Result<()> {
    if start > end {
        return Err(OfficeError::InvalidInput(format!(
            "start {} is after end {}",
            start, end
        )));
    }
    check_position(end, len)
}

pub async fn insert_text(
    state: &OfficeState,
    doc_id: &str,
    text: &str,
    position: u64,
) -> Result<String> {
    let doc = state.authorize(doc_id, Operation::InsertText).await?;
    check_position(position, text_length(&doc).await?)?;

    doc.engine
        .call(
            "writer.insert_text",
            json!({ "handle": doc.handle, "position": position, "text": text }),
        )
        .await?;
    Ok(format!(
        "Inserted {} character(s) at position {}",
        text.chars().count(),
        position
    ))
}

/// Apply a named paragraph style to the paragraphs touching `start..end`
pub async fn apply_style(
    state: &OfficeState,
    doc_id: &str,
    style_name: &str,
    start: u64,
    end: u64,
) -> Result<String> {
    if style_name.trim().is_empty() {
        return Err(OfficeError::InvalidInput("style name is empty".to_string()));
    }
    // Ordering is checked before any remote call; the length check needs the engine.
    check_span(start, end, u64::MAX)?;
    let doc = state.authorize(doc_id, Operation::ApplyStyle).await?;
    check_span(start, end, text_length(&doc).await?)?;

    doc.engine
        .call(
            "writer.apply_paragraph_style",
            json!({
                "handle": doc.handle,
                "start": start,
                "end": end,
                "style": style_name,
            }),
        )
        .await?;
    Ok(format!(
        "Applied style '{}' to text {}..{}",
        style_name, start, end
    ))
}
