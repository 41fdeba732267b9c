//! Integration tests for office-mcp tools
//!
//! Tools run against `OfficeState` wired to an in-memory engine, so the
//! session table, dispatch and remote calls are exercised end to end.


use office_mcp::OfficeError;
use office_mcp::engine::ConnectionState;
use office_mcp::tools::base::ColumnSpec;
use office_mcp::tools::{
    add_conditional_format, apply_filter, apply_style, calculate_statistics, close_document,
    create_chart, create_form, create_new_sheet, create_pivot_table, create_report, create_table,
    format_table, get_cell_value, get_sheet_names, group_range, insert_data,
    insert_form_control, insert_text, list_documents, list_tables, new_document, open_document,
    run_macro, run_query, save_document, set_cell_value, sort_range,
};
use serde_json::{Value, json};
use std::sync::atomic::Ordering;
use test_utils::TestContext;

#[tokio::test]
async fn test_new_documents_get_sequential_ids() {
    let ctx = TestContext::new();

    let first = new_document(&ctx.state, "calc").await.unwrap();
    let second = new_document(&ctx.state, "writer").await.unwrap();
    let third = open_document(&ctx.state, "/data/q3.odb", "base").await.unwrap();

    assert_eq!(first, "doc_0");
    assert_eq!(second, "doc_1");
    assert_eq!(third, "doc_2");
    assert_eq!(ctx.state.registry.len(), 3);
    assert_eq!(ctx.connector.attempts(), 1, "connection is shared");
}

#[tokio::test]
async fn test_invalid_doc_type_never_connects() {
    let ctx = TestContext::new();

    let err = new_document(&ctx.state, "spreadsheet-ish").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    assert!(err.to_string().contains("writer, calc, draw, impress, base"));
    assert_eq!(ctx.connector.attempts(), 0);
}

#[tokio::test]
async fn test_close_twice_reports_session_not_found() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "writer").await.unwrap();

    let closed = close_document(&ctx.state, &id).await.unwrap();
    assert!(closed.contains(&id));
    assert_eq!(ctx.engine.open_handles(), 0);

    let err = close_document(&ctx.state, &id).await.unwrap_err();
    assert!(matches!(err, OfficeError::SessionNotFound(_)));
    assert_eq!(ctx.engine.count("dispose_document"), 1);
}

#[tokio::test]
async fn test_closed_ids_are_not_reused() {
    let ctx = TestContext::new();
    let a = new_document(&ctx.state, "calc").await.unwrap();
    close_document(&ctx.state, &a).await.unwrap();

    let b = new_document(&ctx.state, "calc").await.unwrap();
    assert_ne!(a, b);
    assert_eq!(b, "doc_1");
}

#[tokio::test]
async fn test_close_when_engine_fails_still_forgets_session() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();
    ctx.engine.fail_on("dispose_document");

    let err = close_document(&ctx.state, &id).await.unwrap_err();
    assert!(matches!(err, OfficeError::RemoteOperation(_)));
    assert!(ctx.state.registry.is_empty());
}

#[tokio::test]
async fn test_text_operation_on_spreadsheet_is_type_mismatch() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();
    let before = ctx.engine.calls().len();

    let err = insert_text(&ctx.state, &id, "hello", 0).await.unwrap_err();
    assert!(matches!(err, OfficeError::TypeMismatch { .. }));
    assert_eq!(ctx.engine.calls().len(), before, "no remote call after mismatch");
}

#[tokio::test]
async fn test_sql_on_text_document_is_type_mismatch() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "writer").await.unwrap();

    let err = list_tables(&ctx.state, &id).await.unwrap_err();
    assert!(matches!(err, OfficeError::TypeMismatch { .. }));
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let ctx = TestContext::new();
    for id in ["doc_7", "doc_x", "", "7"] {
        let err = get_sheet_names(&ctx.state, id).await.unwrap_err();
        assert!(matches!(err, OfficeError::SessionNotFound(_)), "{:?}", id);
    }
    assert_eq!(ctx.connector.attempts(), 0);
}

#[tokio::test]
async fn test_set_and_get_cell_roundtrip() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    set_cell_value(&ctx.state, &id, "Sheet1", "B3", "42").await.unwrap();
    set_cell_value(&ctx.state, &id, "Sheet1", "C3", "Total").await.unwrap();

    assert_eq!(get_cell_value(&ctx.state, &id, "Sheet1", "B3").await.unwrap(), "42.0");
    assert_eq!(get_cell_value(&ctx.state, &id, "Sheet1", "C3").await.unwrap(), "Total");
    assert_eq!(get_cell_value(&ctx.state, &id, "Sheet1", "Z99").await.unwrap(), "");

    let (_, params) = ctx
        .engine
        .calls()
        .into_iter()
        .find(|(m, _)| m == "calc.set_cell")
        .unwrap();
    assert_eq!(params["cell"], json!({ "column": 1, "row": 2 }));
    assert_eq!(params["value"], json!(42.0));
}

#[tokio::test]
async fn test_invalid_address_makes_no_remote_call() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();
    let before = ctx.engine.calls().len();

    for bad in ["", "1A", "A", "A0", "B-2", "A1:B2:C3"] {
        let err = get_cell_value(&ctx.state, &id, "Sheet1", bad).await.unwrap_err();
        assert!(matches!(err, OfficeError::InvalidAddress(_)), "{:?}", bad);
    }
    let err = sort_range(&ctx.state, &id, "Sheet1", "A1:C", 0, true).await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidAddress(_)));

    assert_eq!(ctx.engine.calls().len(), before);
}

#[tokio::test]
async fn test_invalid_address_on_dead_link_does_not_reconnect() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();
    ctx.engine.kill();
    ctx.connector.refuse.store(true, Ordering::SeqCst);

    let err = get_cell_value(&ctx.state, &id, "Sheet1", "1A").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidAddress(_)), "{:?}", err);
    let err = sort_range(&ctx.state, &id, "Sheet1", "A1:B2:C3", 0, true).await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidAddress(_)), "{:?}", err);
    let err = create_chart(&ctx.state, &id, "Sheet1", "A1:B4", "Z", "pie").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidAddress(_)), "{:?}", err);
    let err = group_range(&ctx.state, &id, "Sheet1", "A1:B4", "diagonal").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)), "{:?}", err);

    assert_eq!(ctx.connector.attempts(), 1);
}

#[tokio::test]
async fn test_spreadsheet_tools_reject_other_kinds() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "writer").await.unwrap();
    let before = ctx.engine.calls().len();

    let err = create_chart(&ctx.state, &id, "Sheet1", "A1:B4", "D1", "bar").await.unwrap_err();
    assert!(matches!(err, OfficeError::TypeMismatch { .. }));
    let err = format_table(&ctx.state, &id, "Sheet1", "A1:B4", 1, "#FFFFFF").await.unwrap_err();
    assert!(matches!(err, OfficeError::TypeMismatch { .. }));
    let err = create_pivot_table(&ctx.state, &id, "Sheet1", "A1:B4", "D1").await.unwrap_err();
    assert!(matches!(err, OfficeError::TypeMismatch { .. }));
    let err = create_form(&ctx.state, &id, "Customers", "Entry").await.unwrap_err();
    assert!(matches!(err, OfficeError::TypeMismatch { .. }));

    assert_eq!(ctx.engine.calls().len(), before);
}

#[tokio::test]
async fn test_pivot_table_targets_named_sheet() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();
    create_new_sheet(&ctx.state, &id, "Sales").await.unwrap();

    let out = create_pivot_table(&ctx.state, &id, "Sales", "C5:A1", "E2").await.unwrap();
    assert!(out.contains("E2"));

    let params = ctx.engine.last_params("calc.create_pivot_table").unwrap();
    assert_eq!(params["source"]["sheet_index"], json!(1));
    assert_eq!(params["source"]["start_column"], json!(0));
    assert_eq!(params["source"]["end_row"], json!(4));
    assert_eq!(params["target"], json!({ "column": 4, "row": 1 }));

    let before = ctx.engine.calls().len();
    let err = create_pivot_table(&ctx.state, &id, "Sales", "A1:C5", "E").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidAddress(_)));
    assert_eq!(ctx.engine.calls().len(), before);
}

#[tokio::test]
async fn test_sort_sends_relative_field() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    sort_range(&ctx.state, &id, "Sheet1", "B2:D9", 1, false).await.unwrap();
    let params = ctx.engine.last_params("calc.sort_range").unwrap();
    assert_eq!(params["field"], json!(1));
    assert_eq!(params["ascending"], json!(false));
    assert_eq!(params["range"]["start_column"], json!(1));
    assert_eq!(params["range"]["sheet_index"], json!(0));
}

#[tokio::test]
async fn test_format_table_sends_packed_color() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    format_table(&ctx.state, &id, "Sheet1", "A1:D10", 2, "#FF8000").await.unwrap();
    let params = ctx.engine.last_params("calc.format_range").unwrap();
    assert_eq!(params["background_color"], json!(0xFF8000));
    assert_eq!(params["border_width_mm"], json!(2));

    let before = ctx.engine.calls().len();
    let err = format_table(&ctx.state, &id, "Sheet1", "A1:D10", 1, "orange").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    assert_eq!(ctx.engine.calls().len(), before);
}

#[tokio::test]
async fn test_create_chart_uses_template_and_size() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();
    create_new_sheet(&ctx.state, &id, "Data").await.unwrap();

    let out = create_chart(&ctx.state, &id, "Data", "A1:B6", "D2", "Line").await.unwrap();
    assert!(out.contains("line"));

    let params = ctx.engine.last_params("calc.insert_chart").unwrap();
    assert_eq!(params["template"], json!("com.sun.star.chart2.template.Line"));
    assert_eq!(params["source"]["sheet_index"], json!(1));
    assert_eq!(params["target"], json!({ "column": 3, "row": 1 }));
    assert_eq!(params["width_cm"], json!(15));
    assert_eq!(params["height_cm"], json!(11));

    let before = ctx.engine.calls().len();
    let err = create_chart(&ctx.state, &id, "Data", "A1:B6", "D2", "radar").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    assert!(err.to_string().contains("column, bar, line, pie"));
    assert_eq!(ctx.engine.calls().len(), before);
}

#[tokio::test]
async fn test_insert_form_control() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    insert_form_control(&ctx.state, &id, "Sheet1", "C3", "checkbox", "Paid")
        .await
        .unwrap();
    let params = ctx.engine.last_params("calc.insert_control").unwrap();
    assert_eq!(params["control"], json!("checkbox"));
    assert_eq!(params["label"], json!("Paid"));
    assert_eq!(params["cell"], json!({ "column": 2, "row": 2 }));
    assert_eq!(params["sheet_index"], json!(0));

    let before = ctx.engine.calls().len();
    let err = insert_form_control(&ctx.state, &id, "Sheet1", "C3", "slider", "x")
        .await
        .unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    assert_eq!(ctx.engine.calls().len(), before);
}

#[tokio::test]
async fn test_apply_filter_checks_column_and_infers_value() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    apply_filter(&ctx.state, &id, "Sheet1", "A1:C20", 2, "100").await.unwrap();
    let params = ctx.engine.last_params("calc.apply_filter").unwrap();
    assert_eq!(params["field"], json!(2));
    assert_eq!(params["value"], json!(100.0));

    apply_filter(&ctx.state, &id, "Sheet1", "A1:C20", 0, "Open").await.unwrap();
    let params = ctx.engine.last_params("calc.apply_filter").unwrap();
    assert_eq!(params["value"], json!("Open"));

    let err = apply_filter(&ctx.state, &id, "Sheet1", "A1:C20", 3, "x").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    assert_eq!(ctx.engine.count("calc.apply_filter"), 2);
}

#[tokio::test]
async fn test_add_conditional_format() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    add_conditional_format(&ctx.state, &id, "Sheet1", "B2:B50", "greater_equal", "10", "Good")
        .await
        .unwrap();
    let params = ctx.engine.last_params("calc.add_conditional_format").unwrap();
    assert_eq!(params["operator"], json!("greater_equal"));
    assert_eq!(params["value"], json!(10.0));
    assert_eq!(params["style"], json!("Good"));

    let err = add_conditional_format(&ctx.state, &id, "Sheet1", "B2:B50", "between", "1", "Good")
        .await
        .unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    let err = add_conditional_format(&ctx.state, &id, "Sheet1", "B2:B50", "less", "1", " ")
        .await
        .unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    assert_eq!(ctx.engine.count("calc.add_conditional_format"), 1);
}

#[tokio::test]
async fn test_group_range_orientation() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    group_range(&ctx.state, &id, "Sheet1", "A2:A8", "rows").await.unwrap();
    assert_eq!(ctx.engine.last_params("calc.group_range").unwrap()["by"], json!("rows"));
    group_range(&ctx.state, &id, "Sheet1", "B1:E1", "COLUMNS").await.unwrap();
    assert_eq!(ctx.engine.last_params("calc.group_range").unwrap()["by"], json!("columns"));
    assert_eq!(ctx.engine.count("calc.group_range"), 2);
}

#[tokio::test]
async fn test_unknown_sheet_is_invalid_input() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    let err = get_cell_value(&ctx.state, &id, "Budget", "A1").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    assert!(err.to_string().contains("Sheet1"));
}

#[tokio::test]
async fn test_new_sheet_is_appended_and_addressable() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    create_new_sheet(&ctx.state, &id, "Budget").await.unwrap();
    let names: Vec<String> =
        serde_json::from_str(&get_sheet_names(&ctx.state, &id).await.unwrap()).unwrap();
    assert_eq!(names, vec!["Sheet1", "Budget"]);

    set_cell_value(&ctx.state, &id, "Budget", "A1", "7").await.unwrap();
    let (_, params) = ctx
        .engine
        .calls()
        .into_iter()
        .rfind(|(m, _)| m == "calc.set_cell")
        .unwrap();
    assert_eq!(params["sheet_index"], json!(1));

    let err = create_new_sheet(&ctx.state, &id, "Budget").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
}

#[tokio::test]
async fn test_statistics_over_empty_range_are_zero() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();
    let handle = ctx.handle_of(&id);
    ctx.engine.put_cell(&handle, 0, 0, 0, json!("label"));

    let out = calculate_statistics(&ctx.state, &id, "Sheet1", "A1:C4").await.unwrap();
    let stats: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats, json!({ "sum": 0.0, "average": 0.0, "count": 0 }));
}

#[tokio::test]
async fn test_statistics_use_reversed_range_corners() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();
    let handle = ctx.handle_of(&id);
    ctx.engine.put_cell(&handle, 0, 0, 0, json!(10));
    ctx.engine.put_cell(&handle, 0, 2, 9, json!(20));
    ctx.engine.put_cell(&handle, 0, 1, 4, json!("n/a"));

    let forward = calculate_statistics(&ctx.state, &id, "Sheet1", "A1:C10").await.unwrap();
    let reversed = calculate_statistics(&ctx.state, &id, "Sheet1", "C10:A1").await.unwrap();
    assert_eq!(forward, reversed);

    let stats: Value = serde_json::from_str(&forward).unwrap();
    assert_eq!(stats["sum"], json!(30.0));
    assert_eq!(stats["average"], json!(15.0));
    assert_eq!(stats["count"], json!(2));
}

#[tokio::test]
async fn test_sort_column_outside_range_is_rejected() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    let err = sort_range(&ctx.state, &id, "Sheet1", "A1:C10", 3, true).await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    sort_range(&ctx.state, &id, "Sheet1", "A1:C10", 2, false).await.unwrap();
    assert_eq!(ctx.engine.count("calc.sort_range"), 1);
}

#[tokio::test]
async fn test_insert_text_checks_position() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "writer").await.unwrap();
    let handle = ctx.handle_of(&id);

    insert_text(&ctx.state, &id, "Hello", 0).await.unwrap();
    insert_text(&ctx.state, &id, " world", 5).await.unwrap();
    assert_eq!(ctx.engine.text_of(&handle), "Hello world");

    let err = insert_text(&ctx.state, &id, "!", 12).await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    assert_eq!(ctx.engine.count("writer.insert_text"), 2);
}

#[tokio::test]
async fn test_apply_style_bounds() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "writer").await.unwrap();
    insert_text(&ctx.state, &id, "Title", 0).await.unwrap();

    let err = apply_style(&ctx.state, &id, "Heading 1", 4, 2).await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    let err = apply_style(&ctx.state, &id, "Heading 1", 0, 6).await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));

    apply_style(&ctx.state, &id, "Heading 1", 0, 5).await.unwrap();
    assert_eq!(ctx.engine.count("writer.apply_paragraph_style"), 1);
}

#[tokio::test]
async fn test_database_tools() {
    let ctx = TestContext::new();
    let id = open_document(&ctx.state, "/data/crm.odb", "base").await.unwrap();

    let tables: Vec<String> =
        serde_json::from_str(&list_tables(&ctx.state, &id).await.unwrap()).unwrap();
    assert_eq!(tables, vec!["Customers", "Orders"]);

    let rows: Value =
        serde_json::from_str(&run_query(&ctx.state, &id, "SELECT * FROM \"Customers\"", "", "").await.unwrap())
            .unwrap();
    assert_eq!(rows[1], json!({ "id": 2, "name": "Grace" }));

    let out = run_query(&ctx.state, &id, "DELETE FROM \"Orders\"", "sa", "").await.unwrap();
    assert_eq!(out, "Affected 1 rows");

    let data = json!({ "name": "O'Brien" });
    insert_data(&ctx.state, &id, "Customers", data.as_object().unwrap())
        .await
        .unwrap();
    let (_, params) = ctx
        .engine
        .calls()
        .into_iter()
        .rfind(|(m, _)| m == "base.execute_update")
        .unwrap();
    assert_eq!(
        params["sql"],
        json!("INSERT INTO \"Customers\" (\"name\") VALUES ('O''Brien')")
    );
}

#[tokio::test]
async fn test_create_table_sends_quoted_ddl() {
    let ctx = TestContext::new();
    let id = open_document(&ctx.state, "/data/crm.odb", "base").await.unwrap();
    let columns: Vec<ColumnSpec> = serde_json::from_value(json!([
        { "name": "id", "type": "INTEGER" },
        { "name": "full name", "type": "VARCHAR(100)" },
    ]))
    .unwrap();

    let out = create_table(&ctx.state, &id, "People", &columns).await.unwrap();
    assert!(out.contains("2 column(s)"));
    let params = ctx.engine.last_params("base.execute_update").unwrap();
    assert_eq!(
        params["sql"],
        json!("CREATE TABLE \"People\" (\"id\" INTEGER, \"full name\" VARCHAR(100))")
    );
}

#[tokio::test]
async fn test_forms_and_reports() {
    let ctx = TestContext::new();
    let id = open_document(&ctx.state, "/data/crm.odb", "base").await.unwrap();

    let out = create_form(&ctx.state, &id, "Customers", "Customer entry").await.unwrap();
    assert!(out.contains("Customer entry"));
    let params = ctx.engine.last_params("base.create_form").unwrap();
    assert_eq!(params["table"], json!("Customers"));
    assert_eq!(params["name"], json!("Customer entry"));

    create_report(&ctx.state, &id, "Orders", "Monthly").await.unwrap();
    let params = ctx.engine.last_params("base.create_report").unwrap();
    assert_eq!(params["table"], json!("Orders"));
    assert_eq!(params["name"], json!("Monthly"));

    let err = create_report(&ctx.state, &id, "Orders", "").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
    assert_eq!(ctx.engine.count("base.create_report"), 1);
}

#[tokio::test]
async fn test_create_table_rejects_bad_column_type_before_dispatch() {
    let ctx = TestContext::new();
    let columns: Vec<ColumnSpec> =
        serde_json::from_value(json!([{ "name": "id", "type": "INT; DROP" }])).unwrap();
    let err = create_table(&ctx.state, "doc_0", "t", &columns).await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
}

#[tokio::test]
async fn test_save_document_resolves_into_output_dir() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "writer").await.unwrap();

    save_document(&ctx.state, &id, "reports/q3.odt").await.unwrap();
    let (_, params) = ctx
        .engine
        .calls()
        .into_iter()
        .find(|(m, _)| m == "save_document")
        .unwrap();
    let expected = ctx.output_dir().join("reports/q3.odt");
    assert_eq!(params["path"], json!(expected.to_string_lossy()));
    assert!(ctx.output_dir().join("reports").is_dir());

    let err = save_document(&ctx.state, &id, "../escape.odt").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
}

#[tokio::test]
async fn test_run_macro_builds_script_uri() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    run_macro(&ctx.state, &id, "Tools.refresh").await.unwrap();
    let (_, params) = ctx.engine.calls().pop().unwrap();
    assert_eq!(
        params["uri"],
        json!("vnd.sun.star.script:Tools.refresh?language=Python&location=document")
    );

    let err = run_macro(&ctx.state, &id, "x?language=Basic").await.unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInput(_)));
}

#[tokio::test]
async fn test_list_documents() {
    let ctx = TestContext::new();
    assert_eq!(list_documents(&ctx.state).await.unwrap(), "No open documents.");

    new_document(&ctx.state, "impress").await.unwrap();
    let listed: Value = serde_json::from_str(&list_documents(&ctx.state).await.unwrap()).unwrap();
    assert_eq!(listed[0]["doc_id"], json!("doc_0"));
    assert_eq!(listed[0]["kind"], json!("presentation"));
    assert_eq!(listed[0]["doc_type"], json!("impress"));
}

#[tokio::test]
async fn test_connect_failure_is_connection_error() {
    let ctx = TestContext::new();
    ctx.connector.refuse.store(true, Ordering::SeqCst);

    let err = new_document(&ctx.state, "calc").await.unwrap_err();
    assert!(matches!(err, OfficeError::Connection(_)));
    assert!(ctx.state.registry.is_empty());
    assert_eq!(ctx.state.connection.state().await, ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_dead_link_is_replaced_on_next_call() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "calc").await.unwrap();

    ctx.engine.kill();
    let err = get_sheet_names(&ctx.state, &id).await;
    // The dead link is discarded and the connector hands back the same fake,
    // which is still dead, so the call fails as a connection error.
    assert!(matches!(err, Err(OfficeError::Connection(_))));
    assert_eq!(ctx.connector.attempts(), 2);
}

#[tokio::test]
async fn test_shutdown_closes_every_session_then_disconnects() {
    let ctx = TestContext::new();
    let a = new_document(&ctx.state, "calc").await.unwrap();
    let b = new_document(&ctx.state, "writer").await.unwrap();
    let c = new_document(&ctx.state, "base").await.unwrap();
    close_document(&ctx.state, &b).await.unwrap();

    let report = ctx.state.shutdown().await;
    let closed: Vec<String> = report.closed.iter().map(|id| id.to_string()).collect();
    assert_eq!(closed, vec![a, c]);
    assert!(report.failed.is_empty());
    assert!(ctx.state.registry.is_empty());
    assert_eq!(ctx.engine.open_handles(), 0);
    assert!(ctx.engine.was_closed());
    assert!(!ctx.state.connection.is_connected().await);
}

#[tokio::test]
async fn test_shutdown_reports_failed_disposals() {
    let ctx = TestContext::new();
    let id = new_document(&ctx.state, "draw").await.unwrap();
    ctx.engine.fail_on("dispose_document");

    let report = ctx.state.shutdown().await;
    assert!(report.closed.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0.to_string(), id);
    assert!(ctx.state.registry.is_empty());
}
