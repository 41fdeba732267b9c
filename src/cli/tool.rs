// src/cli/tool.rs
// Direct tool execution from CLI

use super::serve::{setup_state, shutdown};
use anyhow::Result;
use office_mcp::OfficeError;
use office_mcp::mcp::requests::*;
use office_mcp::state::OfficeState;
use office_mcp::tools;
use serde::de::DeserializeOwned;

fn parse<T: DeserializeOwned>(args: &str) -> office_mcp::Result<T> {
    serde_json::from_str(args)
        .map_err(|e| OfficeError::InvalidInput(format!("invalid arguments: {}", e)))
}

/// Dispatch one tool by name against `state`
pub async fn execute(state: &OfficeState, name: &str, args: &str) -> office_mcp::Result<String> {
    match name {
        "open_document" => {
            let req: OpenDocumentRequest = parse(args)?;
            tools::open_document(state, &req.url, &req.doc_type).await
        }
        "new_document" => {
            let req: NewDocumentRequest = parse(args)?;
            tools::new_document(state, &req.doc_type).await
        }
        "save_document" => {
            let req: SaveDocumentRequest = parse(args)?;
            tools::save_document(state, &req.doc_id, &req.url).await
        }
        "close_document" => {
            let req: DocumentRequest = parse(args)?;
            tools::close_document(state, &req.doc_id).await
        }
        "list_documents" => tools::list_documents(state).await,
        "run_macro" => {
            let req: RunMacroRequest = parse(args)?;
            tools::run_macro(state, &req.doc_id, &req.macro_name).await
        }
        "get_sheet_names" => {
            let req: DocumentRequest = parse(args)?;
            tools::get_sheet_names(state, &req.doc_id).await
        }
        "get_cell_value" => {
            let req: CellRequest = parse(args)?;
            tools::get_cell_value(state, &req.doc_id, &req.sheet_name, &req.cell_address).await
        }
        "set_cell_value" => {
            let req: SetCellRequest = parse(args)?;
            tools::set_cell_value(state, &req.doc_id, &req.sheet_name, &req.cell_address, &req.value).await
        }
        "create_new_sheet" => {
            let req: NewSheetRequest = parse(args)?;
            tools::create_new_sheet(state, &req.doc_id, &req.sheet_name).await
        }
        "create_pivot_table" => {
            let req: PivotTableRequest = parse(args)?;
            tools::create_pivot_table(state, &req.doc_id, &req.sheet_name, &req.source_range, &req.target_cell).await
        }
        "sort_range" => {
            let req: SortRangeRequest = parse(args)?;
            tools::sort_range(state, &req.doc_id, &req.sheet_name, &req.range_address, req.sort_column, req.ascending.unwrap_or(true)).await
        }
        "calculate_statistics" => {
            let req: RangeRequest = parse(args)?;
            tools::calculate_statistics(state, &req.doc_id, &req.sheet_name, &req.range_address).await
        }
        "format_table" => {
            let req: FormatTableRequest = parse(args)?;
            tools::format_table(
                state,
                &req.doc_id,
                &req.sheet_name,
                &req.range_address,
                req.border_width.unwrap_or(1),
                req.background_color.as_deref().unwrap_or("#FFFFFF"),
            )
            .await
        }
        "create_chart" => {
            let req: ChartRequest = parse(args)?;
            tools::create_chart(
                state,
                &req.doc_id,
                &req.sheet_name,
                &req.range_address,
                &req.target_cell,
                req.chart_type.as_deref().unwrap_or("column"),
            )
            .await
        }
        "insert_form_control" => {
            let req: FormControlRequest = parse(args)?;
            tools::insert_form_control(
                state,
                &req.doc_id,
                &req.sheet_name,
                &req.cell_address,
                &req.control_type,
                req.label.as_deref().unwrap_or_default(),
            )
            .await
        }
        "apply_filter" => {
            let req: FilterRequest = parse(args)?;
            tools::apply_filter(state, &req.doc_id, &req.sheet_name, &req.range_address, req.column, &req.value).await
        }
        "add_conditional_format" => {
            let req: ConditionalFormatRequest = parse(args)?;
            tools::add_conditional_format(
                state,
                &req.doc_id,
                &req.sheet_name,
                &req.range_address,
                &req.operator,
                &req.value,
                &req.style_name,
            )
            .await
        }
        "group_range" => {
            let req: GroupRangeRequest = parse(args)?;
            tools::group_range(state, &req.doc_id, &req.sheet_name, &req.range_address, req.by.as_deref().unwrap_or("rows")).await
        }
        "insert_text" => {
            let req: InsertTextRequest = parse(args)?;
            tools::insert_text(state, &req.doc_id, &req.text, req.position.unwrap_or(0)).await
        }
        "apply_style" => {
            let req: ApplyStyleRequest = parse(args)?;
            tools::apply_style(state, &req.doc_id, &req.style_name, req.start, req.end).await
        }
        "run_query" => {
            let req: QueryRequest = parse(args)?;
            tools::run_query(
                state,
                &req.doc_id,
                &req.sql,
                req.username.as_deref().unwrap_or_default(),
                req.password.as_deref().unwrap_or_default(),
            )
            .await
        }
        "list_tables" => {
            let req: DocumentRequest = parse(args)?;
            tools::list_tables(state, &req.doc_id).await
        }
        "create_table" => {
            let req: CreateTableRequest = parse(args)?;
            tools::create_table(state, &req.doc_id, &req.table_name, &req.columns).await
        }
        "insert_data" => {
            let req: InsertDataRequest = parse(args)?;
            tools::insert_data(state, &req.doc_id, &req.table_name, &req.data).await
        }
        "create_form" => {
            let req: CreateFormRequest = parse(args)?;
            tools::create_form(state, &req.doc_id, &req.table_name, &req.form_name).await
        }
        "create_report" => {
            let req: CreateReportRequest = parse(args)?;
            tools::create_report(state, &req.doc_id, &req.table_name, &req.report_name).await
        }
        _ => Err(OfficeError::InvalidInput(format!("Unknown tool: {}", name))),
    }
}

/// Execute a tool directly from the command line.
///
/// Each invocation is its own process, so any document the tool opens is
/// closed again before returning.
pub async fn run_tool(name: String, args: String) -> Result<()> {
    let state = setup_state()?;
    let res = execute(&state, &name, &args).await;
    shutdown(&state).await;

    match res {
        Ok(output) => println!("{}", output),
        Err(e) if e.is_client_error() => eprintln!("Error: {}", e.to_user_string()),
        Err(e) => eprintln!("Engine error: {}", e.to_user_string()),
    }
    Ok(())
}

/// Returns the list of tool names supported by the CLI dispatcher.
#[cfg(test)]
fn list_cli_tool_names() -> Vec<&'static str> {
    vec![
        "open_document",
        "new_document",
        "save_document",
        "close_document",
        "list_documents",
        "run_macro",
        "get_sheet_names",
        "get_cell_value",
        "set_cell_value",
        "create_new_sheet",
        "create_pivot_table",
        "sort_range",
        "calculate_statistics",
        "format_table",
        "create_chart",
        "insert_form_control",
        "apply_filter",
        "add_conditional_format",
        "group_range",
        "insert_text",
        "apply_style",
        "run_query",
        "list_tables",
        "create_table",
        "insert_data",
        "create_form",
        "create_report",
    ]
}
