// src/tools/base.rs
// Database document tools. SQL is assembled here; the engine only executes it.

use super::{decode, to_pretty_json};
use crate::dispatch::Operation;
use crate::error::{OfficeError, Result};
use crate::state::{Authorized, OfficeState};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

/// A column in `create_table`
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// SQL type, e.g. INTEGER or VARCHAR(100)
    #[serde(rename = "type")]
    pub sql_type: String,
}

#[derive(Debug, Deserialize)]
struct QueryRows {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct UpdateCount {
    affected: u64,
}

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(OfficeError::InvalidInput("identifier is empty".to_string()));
    }
    if name.contains('\0') {
        return Err(OfficeError::InvalidInput(format!(
            "identifier '{}' contains a NUL byte",
            name.escape_debug()
        )));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Render a JSON value as a SQL literal
pub fn sql_literal(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(format!("'{}'", s.replace('\'', "''"))),
        Value::Array(_) | Value::Object(_) => Err(OfficeError::InvalidInput(format!(
            "unsupported value {}: only strings, numbers, booleans and null",
            value
        ))),
    }
}

/// Column types are a word optionally followed by a parenthesised size,
/// e.g. `INTEGER`, `VARCHAR(255)`, `DECIMAL(10,2)`, `DOUBLE PRECISION`.
fn check_sql_type(sql_type: &str) -> Result<&str> {
    let trimmed = sql_type.trim();
    let invalid = || OfficeError::InvalidInput(format!("invalid column type '{}'", sql_type));

    let (word, size) = match trimmed.split_once('(') {
        Some((word, rest)) => (word.trim_end(), Some(rest.strip_suffix(')').ok_or_else(invalid)?)),
        None => (trimmed, None),
    };
    if word.is_empty()
        || !word.starts_with(|c: char| c.is_ascii_alphabetic())
        || !word.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '_')
    {
        return Err(invalid());
    }
    if let Some(size) = size
        && (size.is_empty() || !size.split(',').all(|p| !p.trim().is_empty() && p.trim().bytes().all(|b| b.is_ascii_digit())))
    {
        return Err(invalid());
    }
    Ok(trimmed)
}

pub fn create_table_sql(table_name: &str, columns: &[ColumnSpec]) -> Result<String> {
    if columns.is_empty() {
        return Err(OfficeError::InvalidInput(
            "a table needs at least one column".to_string(),
        ));
    }
    let defs = columns
        .iter()
        .map(|c| Ok(format!("{} {}", quote_ident(&c.name)?, check_sql_type(&c.sql_type)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(
        "CREATE TABLE {} ({})",
        quote_ident(table_name)?,
        defs.join(", ")
    ))
}

pub fn insert_sql(table_name: &str, data: &Map<String, Value>) -> Result<String> {
    if data.is_empty() {
        return Err(OfficeError::InvalidInput("no data to insert".to_string()));
    }
    let mut names = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());
    for (column, value) in data {
        names.push(quote_ident(column)?);
        values.push(sql_literal(value)?);
    }
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table_name)?,
        names.join(", "),
        values.join(", ")
    ))
}

/// Drop leading whitespace, opening parentheses and comments
fn skip_leading_comments(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return sql;
        }
    }
}

/// Words outside parentheses, quotes and comments, in order
fn top_level_words(sql: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut depth = 0usize;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_alphanumeric() || c == '_' {
            if depth == 0 {
                word.push(c);
            }
            continue;
        }
        if !word.is_empty() {
            words.push(std::mem::take(&mut word));
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '\'' | '"' => {
                for q in chars.by_ref() {
                    if q == c {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for q in chars.by_ref() {
                    if q == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for q in chars.by_ref() {
                    if prev == '*' && q == '/' {
                        break;
                    }
                    prev = q;
                }
            }
            _ => {}
        }
    }
    if !word.is_empty() {
        words.push(word);
    }
    words
}

/// Whether the statement returns rows.
///
/// A `WITH` statement is classified by the first data statement after its
/// common table expressions, so `WITH .. INSERT` runs as an update.
fn is_query(sql: &str) -> bool {
    let words = top_level_words(skip_leading_comments(sql));
    let Some(first) = words.first() else {
        return false;
    };
    if first.eq_ignore_ascii_case("select") || first.eq_ignore_ascii_case("values") {
        return true;
    }
    if !first.eq_ignore_ascii_case("with") {
        return false;
    }
    words
        .iter()
        .skip(1)
        .find_map(|w| match w.to_ascii_lowercase().as_str() {
            "select" => Some(true),
            "insert" | "update" | "delete" | "merge" => Some(false),
            _ => None,
        })
        .unwrap_or(true)
}

async fn execute_update(doc: &Authorized, sql: &str, credentials: Value) -> Result<u64> {
    let method = "base.execute_update";
    debug!(sql, "Executing update");
    let value = doc
        .engine
        .call(
            method,
            json!({ "handle": doc.handle, "sql": sql, "credentials": credentials }),
        )
        .await?;
    Ok(decode::<UpdateCount>(method, value)?.affected)
}

fn credentials(username: &str, password: &str) -> Value {
    json!({ "username": username, "password": password })
}

/// Run arbitrary SQL. Queries come back as JSON rows, updates as a row count.
pub async fn run_query(
    state: &OfficeState,
    doc_id: &str,
    sql: &str,
    username: &str,
    password: &str,
) -> Result<String> {
    if sql.trim().is_empty() {
        return Err(OfficeError::InvalidInput("query is empty".to_string()));
    }
    let doc = state.authorize(doc_id, Operation::RunQuery).await?;

    if !is_query(sql) {
        let affected = execute_update(&doc, sql, credentials(username, password)).await?;
        return Ok(format!("Affected {} rows", affected));
    }

    let method = "base.execute_query";
    debug!(sql, "Executing query");
    let value = doc
        .engine
        .call(
            method,
            json!({
                "handle": doc.handle,
                "sql": sql,
                "credentials": credentials(username, password),
            }),
        )
        .await?;
    let result: QueryRows = decode(method, value)?;

    let records: Vec<Map<String, Value>> = result
        .rows
        .into_iter()
        .map(|row| result.columns.iter().cloned().zip(row).collect())
        .collect();
    to_pretty_json(&records)
}

pub async fn list_tables(state: &OfficeState, doc_id: &str) -> Result<String> {
    let doc = state.authorize(doc_id, Operation::ListTables).await?;
    let method = "base.list_tables";
    let value = doc.engine.call(method, json!({ "handle": doc.handle })).await?;
    let tables: Vec<String> = decode(method, value)?;
    to_pretty_json(&tables)
}

pub async fn create_table(
    state: &OfficeState,
    doc_id: &str,
    table_name: &str,
    columns: &[ColumnSpec],
) -> Result<String> {
    let sql = create_table_sql(table_name, columns)?;
    let doc = state.authorize(doc_id, Operation::CreateTable).await?;
    execute_update(&doc, &sql, Value::Null).await?;
    Ok(format!(
        "Created table '{}' with {} column(s)",
        table_name,
        columns.len()
    ))
}

/// Insert one row given as `{column: value}`
pub async fn insert_data(
    state: &OfficeState,
    doc_id: &str,
    table_name: &str,
    data: &Map<String, Value>,
) -> Result<String> {
    let sql = insert_sql(table_name, data)?;
    let doc = state.authorize(doc_id, Operation::InsertData).await?;
    let affected = execute_update(&doc, &sql, Value::Null).await?;
    Ok(format!("Inserted {} row(s) into '{}'", affected, table_name))
}

pub async fn create_form(
    state: &OfficeState,
    doc_id: &str,
    table_name: &str,
    form_name: &str,
) -> Result<String> {
    if form_name.trim().is_empty() {
        return Err(OfficeError::InvalidInput("form name is empty".to_string()));
    }
    let doc = state.authorize(doc_id, Operation::CreateForm).await?;
    doc.engine
        .call(
            "base.create_form",
            json!({ "handle": doc.handle, "table": table_name, "name": form_name }),
        )
        .await?;
    Ok(format!("Created form '{}' for table '{}'", form_name, table_name))
}

pub async fn create_report(
    state: &OfficeState,
    doc_id: &str,
    table_name: &str,
    report_name: &str,
) -> Result<String> {
    if report_name.trim().is_empty() {
        return Err(OfficeError::InvalidInput("report name is empty".to_string()));
    }
    let doc = state.authorize(doc_id, Operation::CreateReport).await?;
    doc.engine
        .call(
            "base.create_report",
            json!({ "handle": doc.handle, "table": table_name, "name": report_name }),
        )
        .await?;
    Ok(format!(
        "Created report '{}' for table '{}'",
        report_name, table_name
    ))
}
