// src/tools/calc.rs
// Spreadsheet tools

use super::{decode, to_pretty_json};
use crate::address::{Address, RangeAddress};
use crate::dispatch::Operation;
use crate::error::{OfficeError, Result};
use crate::state::{Authorized, OfficeState};
use serde::Serialize;
use serde_json::{Value, json};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString, VariantNames};

/// Chart width and height in centimetres
const CHART_SIZE_CM: (u32, u32) = (15, 11);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ChartKind {
    Column,
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    /// Engine chart template
    pub fn template(&self) -> &'static str {
        match self {
            ChartKind::Column => "com.sun.star.chart2.template.StackedColumn",
            ChartKind::Bar => "com.sun.star.chart2.template.StackedBar",
            ChartKind::Line => "com.sun.star.chart2.template.Line",
            ChartKind::Pie => "com.sun.star.chart2.template.Donut",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ControlKind {
    Checkbox,
    Button,
    Listbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ConditionOperator {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GroupOrientation {
    Rows,
    Columns,
}

/// Parse one of a closed set of names, listing the choices on failure.
fn parse_choice<T>(label: &str, value: &str) -> Result<T>
where
    T: FromStr + VariantNames,
{
    T::from_str(value.trim()).map_err(|_| {
        OfficeError::InvalidInput(format!(
            "Invalid {} '{}'. Use: {}",
            label,
            value,
            T::VARIANTS.join(", ")
        ))
    })
}

/// A value written into a cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Numbers when the text parses as a finite number, text otherwise
    pub fn infer(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }
}

/// Sum and mean over the numeric cells of a range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeStatistics {
    pub sum: f64,
    pub average: f64,
    pub count: usize,
}

impl RangeStatistics {
    /// Only JSON numbers count; text, booleans and empty cells are skipped.
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a Value>) -> Self {
        let (sum, count) = cells
            .into_iter()
            .filter_map(Value::as_f64)
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        let average = if count == 0 { 0.0 } else { sum / count as f64 };
        Self {
            sum,
            average,
            count,
        }
    }
}

/// Parse `#RRGGBB` into a packed RGB integer
pub fn parse_color(text: &str) -> Result<u32> {
    let hex = text.trim().strip_prefix('#').unwrap_or(text.trim());
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(OfficeError::InvalidInput(format!(
            "invalid color '{}', expected #RRGGBB",
            text
        )));
    }
    u32::from_str_radix(hex, 16)
        .map_err(|_| OfficeError::InvalidInput(format!("invalid color '{}'", text)))
}

async fn sheet_names(doc: &Authorized) -> Result<Vec<String>> {
    let method = "calc.get_sheet_names";
    let value = doc.engine.call(method, json!({ "handle": doc.handle })).await?;
    decode(method, value)
}

/// Position of `sheet_name` in the workbook
async fn sheet_index(doc: &Authorized, sheet_name: &str) -> Result<u32> {
    let names = sheet_names(doc).await?;
    names
        .iter()
        .position(|n| n == sheet_name)
        .map(|i| i as u32)
        .ok_or_else(|| {
            OfficeError::InvalidInput(format!(
                "Sheet '{}' not found. Sheets: {}",
                sheet_name,
                names.join(", ")
            ))
        })
}

/// Resolve the sheet and attach its index to an already-parsed range
async fn on_sheet(doc: &Authorized, sheet_name: &str, range: RangeAddress) -> Result<RangeAddress> {
    Ok(RangeAddress {
        sheet_index: sheet_index(doc, sheet_name).await?,
        ..range
    })
}

/// Column offset inside a range, zero-based
fn check_column_in_range(range: &RangeAddress, column: u32, what: &str) -> Result<()> {
    if column >= range.width() {
        return Err(OfficeError::InvalidInput(format!(
            "{} {} is outside range {} (width {})",
            what,
            column,
            range,
            range.width()
        )));
    }
    Ok(())
}

pub async fn get_sheet_names(state: &OfficeState, doc_id: &str) -> Result<String> {
    let doc = state.authorize(doc_id, Operation::GetSheetNames).await?;
    to_pretty_json(&sheet_names(&doc).await?)
}

/// Read a cell. Empty cells read as "".
pub async fn get_cell_value(
    state: &OfficeState,
    doc_id: &str,
    sheet_name: &str,
    cell_address: &str,
) -> Result<String> {
    let session = state.admit(doc_id, Operation::GetCellValue)?;
    let cell = Address::parse(cell_address)?;
    let doc = state.attach(session).await?;
    let sheet = sheet_index(&doc, sheet_name).await?;

    let value = doc
        .engine
        .call(
            "calc.get_cell",
            json!({ "handle": doc.handle, "sheet_index": sheet, "cell": cell }),
        )
        .await?;

    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

pub async fn set_cell_value(
    state: &OfficeState,
    doc_id: &str,
    sheet_name: &str,
    cell_address: &str,
    value: &str,
) -> Result<String> {
    let session = state.admit(doc_id, Operation::SetCellValue)?;
    let cell = Address::parse(cell_address)?;
    let doc = state.attach(session).await?;
    let sheet = sheet_index(&doc, sheet_name).await?;

    doc.engine
        .call(
            "calc.set_cell",
            json!({
                "handle": doc.handle,
                "sheet_index": sheet,
                "cell": cell,
                "value": CellValue::infer(value),
            }),
        )
        .await?;
    Ok(format!("Set {} to {}", cell, value))
}

/// Append a sheet after the last one
pub async fn create_new_sheet(state: &OfficeState, doc_id: &str, sheet_name: &str) -> Result<String> {
    if sheet_name.trim().is_empty() {
        return Err(OfficeError::InvalidInput("sheet name is empty".to_string()));
    }
    let doc = state.authorize(doc_id, Operation::CreateNewSheet).await?;
    let names = sheet_names(&doc).await?;
    if names.iter().any(|n| n == sheet_name) {
        return Err(OfficeError::InvalidInput(format!(
            "Sheet '{}' already exists",
            sheet_name
        )));
    }

    doc.engine
        .call(
            "calc.insert_sheet",
            json!({ "handle": doc.handle, "name": sheet_name, "position": names.len() }),
        )
        .await?;
    Ok(format!("Created new sheet '{}'", sheet_name))
}

pub async fn create_pivot_table(
    state: &OfficeState,
    doc_id: &str,
    sheet_name: &str,
    source_range: &str,
    target_cell: &str,
) -> Result<String> {
    let session = state.admit(doc_id, Operation::CreatePivotTable)?;
    let source = RangeAddress::parse(source_range, 0)?;
    let target = Address::parse(target_cell)?;
    let doc = state.attach(session).await?;
    let source = on_sheet(&doc, sheet_name, source).await?;

    doc.engine
        .call(
            "calc.create_pivot_table",
            json!({ "handle": doc.handle, "source": source, "target": target }),
        )
        .await?;
    Ok(format!("Created pivot table at {}", target))
}

/// Sort a range by one of its columns (zero-based, relative to the range)
pub async fn sort_range(
    state: &OfficeState,
    doc_id: &str,
    sheet_name: &str,
    range_address: &str,
    sort_column: u32,
    ascending: bool,
) -> Result<String> {
    let session = state.admit(doc_id, Operation::SortRange)?;
    let range = RangeAddress::parse(range_address, 0)?;
    check_column_in_range(&range, sort_column, "sort column")?;
    let doc = state.attach(session).await?;
    let range = on_sheet(&doc, sheet_name, range).await?;

    doc.engine
        .call(
            "calc.sort_range",
            json!({
                "handle": doc.handle,
                "range": range,
                "field": sort_column,
                "ascending": ascending,
            }),
        )
        .await?;
    Ok(format!(
        "Sorted range {} by column {} {}",
        range,
        sort_column,
        if ascending { "ascending" } else { "descending" }
    ))
}

/// Sum and average of the numeric cells in a range, as JSON
pub async fn calculate_statistics(
    state: &OfficeState,
    doc_id: &str,
    sheet_name: &str,
    range_address: &str,
) -> Result<String> {
    let session = state.admit(doc_id, Operation::CalculateStatistics)?;
    let range = RangeAddress::parse(range_address, 0)?;
    let doc = state.attach(session).await?;
    let range = on_sheet(&doc, sheet_name, range).await?;

    let method = "calc.get_range_values";
    let value = doc
        .engine
        .call(method, json!({ "handle": doc.handle, "range": range }))
        .await?;
    let rows: Vec<Vec<Value>> = decode(method, value)?;

    let stats = RangeStatistics::from_cells(rows.iter().flatten());
    to_pretty_json(&stats)
}

pub async fn format_table(
    state: &OfficeState,
    doc_id: &str,
    sheet_name: &str,
    range_address: &str,
    border_width: u32,
    background_color: &str,
) -> Result<String> {
    let session = state.admit(doc_id, Operation::FormatTable)?;
    let range = RangeAddress::parse(range_address, 0)?;
    let color = parse_color(background_color)?;
    let doc = state.attach(session).await?;
    let range = on_sheet(&doc, sheet_name, range).await?;

    doc.engine
        .call(
            "calc.format_range",
            json!({
                "handle": doc.handle,
                "range": range,
                "border_width_mm": border_width,
                "background_color": color,
            }),
        )
        .await?;
    Ok(format!(
        "Formatted table {} with border width {} and background {}",
        range, border_width, background_color
    ))
}

pub async fn create_chart(
    state: &OfficeState,
    doc_id: &str,
    sheet_name: &str,
    range_address: &str,
    target_cell: &str,
    chart_type: &str,
) -> Result<String> {
    let session = state.admit(doc_id, Operation::CreateChart)?;
    let chart: ChartKind = parse_choice("chart type", chart_type)?;
    let source = RangeAddress::parse(range_address, 0)?;
    let target = Address::parse(target_cell)?;
    let doc = state.attach(session).await?;
    let source = on_sheet(&doc, sheet_name, source).await?;

    let (width, height) = CHART_SIZE_CM;
    doc.engine
        .call(
            "calc.insert_chart",
            json!({
                "handle": doc.handle,
                "source": source,
                "target": target,
                "template": chart.template(),
                "width_cm": width,
                "height_cm": height,
            }),
        )
        .await?;
    Ok(format!("Created {} chart at {}", chart, target))
}

pub async fn insert_form_control(
    state: &OfficeState,
    doc_id: &str,
    sheet_name: &str,
    cell_address: &str,
    control_type: &str,
    label: &str,
) -> Result<String> {
    let session = state.admit(doc_id, Operation::InsertFormControl)?;
    let control: ControlKind = parse_choice("control type", control_type)?;
    let cell = Address::parse(cell_address)?;
    let doc = state.attach(session).await?;
    let sheet = sheet_index(&doc, sheet_name).await?;

    doc.engine
        .call(
            "calc.insert_control",
            json!({
                "handle": doc.handle,
                "sheet_index": sheet,
                "cell": cell,
                "control": control.as_ref(),
                "label": label,
            }),
        )
        .await?;
    Ok(format!(
        "Inserted {} control '{}' at {}",
        control, label, cell
    ))
}

/// Show only rows of a range whose `column` equals `value`
pub async fn apply_filter(
    state: &OfficeState,
    doc_id: &str,
    sheet_name: &str,
    range_address: &str,
    column: u32,
    value: &str,
) -> Result<String> {
    let session = state.admit(doc_id, Operation::ApplyFilter)?;
    let range = RangeAddress::parse(range_address, 0)?;
    check_column_in_range(&range, column, "filter column")?;
    let doc = state.attach(session).await?;
    let range = on_sheet(&doc, sheet_name, range).await?;

    doc.engine
        .call(
            "calc.apply_filter",
            json!({
                "handle": doc.handle,
                "range": range,
                "field": column,
                "value": CellValue::infer(value),
            }),
        )
        .await?;
    Ok(format!(
        "Filtered {} on column {} = {}",
        range, column, value
    ))
}

pub async fn add_conditional_format(
    state: &OfficeState,
    doc_id: &str,
    sheet_name: &str,
    range_address: &str,
    operator: &str,
    value: &str,
    style_name: &str,
) -> Result<String> {
    let session = state.admit(doc_id, Operation::AddConditionalFormat)?;
    let operator: ConditionOperator = parse_choice("operator", operator)?;
    let range = RangeAddress::parse(range_address, 0)?;
    if style_name.trim().is_empty() {
        return Err(OfficeError::InvalidInput("style name is empty".to_string()));
    }
    let doc = state.attach(session).await?;
    let range = on_sheet(&doc, sheet_name, range).await?;

    doc.engine
        .call(
            "calc.add_conditional_format",
            json!({
                "handle": doc.handle,
                "range": range,
                "operator": operator.as_ref(),
                "value": CellValue::infer(value),
                "style": style_name,
            }),
        )
        .await?;
    Ok(format!(
        "Added conditional format on {}: {} {} -> '{}'",
        range, operator, value, style_name
    ))
}

pub async fn group_range(
    state: &OfficeState,
    doc_id: &str,
    sheet_name: &str,
    range_address: &str,
    by: &str,
) -> Result<String> {
    let session = state.admit(doc_id, Operation::GroupRange)?;
    let orientation: GroupOrientation = parse_choice("grouping", by)?;
    let range = RangeAddress::parse(range_address, 0)?;
    let doc = state.attach(session).await?;
    let range = on_sheet(&doc, sheet_name, range).await?;

    doc.engine
        .call(
            "calc.group_range",
            json!({ "handle": doc.handle, "range": range, "by": orientation.as_ref() }),
        )
        .await?;
    Ok(format!("Grouped {} of {}", orientation, range))
}
