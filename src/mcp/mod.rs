// src/mcp/mod.rs
// MCP Server implementation

pub mod requests;

use crate::state::OfficeState;
use crate::tools;
use requests::*;
use rmcp::{
    ErrorData, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::ToolCallContext, wrapper::Parameters},
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

const DEFAULT_BORDER_WIDTH: u32 = 1;
const DEFAULT_BACKGROUND: &str = "#FFFFFF";
const DEFAULT_CHART: &str = "column";
const DEFAULT_GROUP_BY: &str = "rows";

/// MCP Server state
#[derive(Clone)]
pub struct OfficeServer {
    pub state: Arc<OfficeState>,
    tool_router: ToolRouter<Self>,
}

impl OfficeServer {
    pub fn new(state: Arc<OfficeState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    /// Names of every registered tool
    pub fn list_tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect()
    }
}

#[tool_router]
impl OfficeServer {
    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    #[tool(description = "Open an existing document. Returns a session ID (doc_N) used by every other tool.")]
    async fn open_document(
        &self,
        Parameters(req): Parameters<OpenDocumentRequest>,
    ) -> Result<String, String> {
        tools::open_document(&self.state, &req.url, &req.doc_type)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Create a blank document of the given type. Returns a session ID.")]
    async fn new_document(
        &self,
        Parameters(req): Parameters<NewDocumentRequest>,
    ) -> Result<String, String> {
        tools::new_document(&self.state, &req.doc_type)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Save a document to a path inside the output directory.")]
    async fn save_document(
        &self,
        Parameters(req): Parameters<SaveDocumentRequest>,
    ) -> Result<String, String> {
        tools::save_document(&self.state, &req.doc_id, &req.url)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Close a document and end its session.")]
    async fn close_document(
        &self,
        Parameters(req): Parameters<DocumentRequest>,
    ) -> Result<String, String> {
        tools::close_document(&self.state, &req.doc_id)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "List open documents with their session IDs and types.")]
    async fn list_documents(&self) -> Result<String, String> {
        tools::list_documents(&self.state)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Run a Python macro stored in the document.")]
    async fn run_macro(
        &self,
        Parameters(req): Parameters<RunMacroRequest>,
    ) -> Result<String, String> {
        tools::run_macro(&self.state, &req.doc_id, &req.macro_name)
            .await
            .map_err(|e| e.to_user_string())
    }

    // ------------------------------------------------------------------
    // Spreadsheets
    // ------------------------------------------------------------------

    #[tool(description = "List the sheet names of a spreadsheet.")]
    async fn get_sheet_names(
        &self,
        Parameters(req): Parameters<DocumentRequest>,
    ) -> Result<String, String> {
        tools::get_sheet_names(&self.state, &req.doc_id)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Read a cell value. Empty cells return an empty string.")]
    async fn get_cell_value(
        &self,
        Parameters(req): Parameters<CellRequest>,
    ) -> Result<String, String> {
        tools::get_cell_value(&self.state, &req.doc_id, &req.sheet_name, &req.cell_address)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Write a cell value. Numeric text is stored as a number.")]
    async fn set_cell_value(
        &self,
        Parameters(req): Parameters<SetCellRequest>,
    ) -> Result<String, String> {
        tools::set_cell_value(
            &self.state,
            &req.doc_id,
            &req.sheet_name,
            &req.cell_address,
            &req.value,
        )
        .await
        .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Append a new sheet after the last one.")]
    async fn create_new_sheet(
        &self,
        Parameters(req): Parameters<NewSheetRequest>,
    ) -> Result<String, String> {
        tools::create_new_sheet(&self.state, &req.doc_id, &req.sheet_name)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Create a pivot table from a source range.")]
    async fn create_pivot_table(
        &self,
        Parameters(req): Parameters<PivotTableRequest>,
    ) -> Result<String, String> {
        tools::create_pivot_table(
            &self.state,
            &req.doc_id,
            &req.sheet_name,
            &req.source_range,
            &req.target_cell,
        )
        .await
        .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Sort a range by one of its columns.")]
    async fn sort_range(
        &self,
        Parameters(req): Parameters<SortRangeRequest>,
    ) -> Result<String, String> {
        tools::sort_range(
            &self.state,
            &req.doc_id,
            &req.sheet_name,
            &req.range_address,
            req.sort_column,
            req.ascending.unwrap_or(true),
        )
        .await
        .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Sum, average and count of the numeric cells in a range, as JSON.")]
    async fn calculate_statistics(
        &self,
        Parameters(req): Parameters<RangeRequest>,
    ) -> Result<String, String> {
        tools::calculate_statistics(&self.state, &req.doc_id, &req.sheet_name, &req.range_address)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Apply borders and a background color to a range.")]
    async fn format_table(
        &self,
        Parameters(req): Parameters<FormatTableRequest>,
    ) -> Result<String, String> {
        tools::format_table(
            &self.state,
            &req.doc_id,
            &req.sheet_name,
            &req.range_address,
            req.border_width.unwrap_or(DEFAULT_BORDER_WIDTH),
            req.background_color.as_deref().unwrap_or(DEFAULT_BACKGROUND),
        )
        .await
        .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Insert a chart of a range. Types: column, bar, line, pie.")]
    async fn create_chart(
        &self,
        Parameters(req): Parameters<ChartRequest>,
    ) -> Result<String, String> {
        tools::create_chart(
            &self.state,
            &req.doc_id,
            &req.sheet_name,
            &req.range_address,
            &req.target_cell,
            req.chart_type.as_deref().unwrap_or(DEFAULT_CHART),
        )
        .await
        .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Insert a form control at a cell. Types: checkbox, button, listbox.")]
    async fn insert_form_control(
        &self,
        Parameters(req): Parameters<FormControlRequest>,
    ) -> Result<String, String> {
        tools::insert_form_control(
            &self.state,
            &req.doc_id,
            &req.sheet_name,
            &req.cell_address,
            &req.control_type,
            req.label.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Filter a range to rows whose column equals a value.")]
    async fn apply_filter(
        &self,
        Parameters(req): Parameters<FilterRequest>,
    ) -> Result<String, String> {
        tools::apply_filter(
            &self.state,
            &req.doc_id,
            &req.sheet_name,
            &req.range_address,
            req.column,
            &req.value,
        )
        .await
        .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Apply a cell style to a range where a condition holds.")]
    async fn add_conditional_format(
        &self,
        Parameters(req): Parameters<ConditionalFormatRequest>,
    ) -> Result<String, String> {
        tools::add_conditional_format(
            &self.state,
            &req.doc_id,
            &req.sheet_name,
            &req.range_address,
            &req.operator,
            &req.value,
            &req.style_name,
        )
        .await
        .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Group (outline) the rows or columns of a range.")]
    async fn group_range(
        &self,
        Parameters(req): Parameters<GroupRangeRequest>,
    ) -> Result<String, String> {
        tools::group_range(
            &self.state,
            &req.doc_id,
            &req.sheet_name,
            &req.range_address,
            req.by.as_deref().unwrap_or(DEFAULT_GROUP_BY),
        )
        .await
        .map_err(|e| e.to_user_string())
    }

    // ------------------------------------------------------------------
    // Text documents
    // ------------------------------------------------------------------

    #[tool(description = "Insert text at a character offset.")]
    async fn insert_text(
        &self,
        Parameters(req): Parameters<InsertTextRequest>,
    ) -> Result<String, String> {
        tools::insert_text(&self.state, &req.doc_id, &req.text, req.position.unwrap_or(0))
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Apply a paragraph style to the text between two offsets.")]
    async fn apply_style(
        &self,
        Parameters(req): Parameters<ApplyStyleRequest>,
    ) -> Result<String, String> {
        tools::apply_style(&self.state, &req.doc_id, &req.style_name, req.start, req.end)
            .await
            .map_err(|e| e.to_user_string())
    }

    // ------------------------------------------------------------------
    // Databases
    // ------------------------------------------------------------------

    #[tool(description = "Run SQL. SELECT returns rows as JSON; other statements return the affected row count.")]
    async fn run_query(
        &self,
        Parameters(req): Parameters<QueryRequest>,
    ) -> Result<String, String> {
        tools::run_query(
            &self.state,
            &req.doc_id,
            &req.sql,
            req.username.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(|e| e.to_user_string())
    }

    #[tool(description = "List the tables of a database document.")]
    async fn list_tables(
        &self,
        Parameters(req): Parameters<DocumentRequest>,
    ) -> Result<String, String> {
        tools::list_tables(&self.state, &req.doc_id)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Create a table from a list of {name, type} columns.")]
    async fn create_table(
        &self,
        Parameters(req): Parameters<CreateTableRequest>,
    ) -> Result<String, String> {
        tools::create_table(&self.state, &req.doc_id, &req.table_name, &req.columns)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Insert one row given as {column: value}.")]
    async fn insert_data(
        &self,
        Parameters(req): Parameters<InsertDataRequest>,
    ) -> Result<String, String> {
        tools::insert_data(&self.state, &req.doc_id, &req.table_name, &req.data)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Create a data entry form for a table.")]
    async fn create_form(
        &self,
        Parameters(req): Parameters<CreateFormRequest>,
    ) -> Result<String, String> {
        tools::create_form(&self.state, &req.doc_id, &req.table_name, &req.form_name)
            .await
            .map_err(|e| e.to_user_string())
    }

    #[tool(description = "Create a report over a table.")]
    async fn create_report(
        &self,
        Parameters(req): Parameters<CreateReportRequest>,
    ) -> Result<String, String> {
        tools::create_report(&self.state, &req.doc_id, &req.table_name, &req.report_name)
            .await
            .map_err(|e| e.to_user_string())
    }
}

impl ServerHandler for OfficeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "office-mcp".into(),
                title: Some("Office document automation".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Open or create a document first; the returned doc_id is passed to every other tool. \
                 Spreadsheet tools need a calc document, text tools a writer document and SQL tools a base document."
                    .into(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            let tool_name = request.name.to_string();
            let start = Instant::now();

            let ctx = ToolCallContext::new(self, request, context);
            let result = self.tool_router.call(ctx).await;

            let duration_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(r) if r.is_error == Some(true) => {
                    let message = r
                        .content
                        .first()
                        .and_then(|c| c.as_text())
                        .map(|t| t.text.to_string())
                        .unwrap_or_default();
                    warn!(tool = %tool_name, duration_ms, error = %message, "Tool failed");
                }
                Ok(_) => debug!(tool = %tool_name, duration_ms, "Tool completed"),
                Err(e) => warn!(tool = %tool_name, duration_ms, error = %e.message, "Tool call rejected"),
            }

            result
        }
    }
}
