//! Output rendering shared by the CLI commands

use serde_json::Value;

use crate::prelude::*;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Output {
    /// Pretty-printed table
    Table,
    /// Tab separated values
    Tsv,
    /// Pretty-printed JSON
    Json,
    /// Standalone HTML document
    Html,
}

/// Render a JSON field value as a single table/TSV cell
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Render story points without a trailing `.0` when integral
pub fn points(value: Option<f64>) -> String {
    match value {
        Some(points) if points.fract() == 0.0 => format!("{}", points as i64),
        Some(points) => format!("{points}"),
        None => String::new(),
    }
}

/// Render headers and rows as tab separated values
pub fn tsv(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join("\t"));
    for row in rows {
        lines.push(row.join("\t"));
    }
    lines.join("\n")
}

/// Render headers and rows into a standalone HTML document
pub fn html(title: &str, headers: &[String], rows: &[Vec<String>]) -> Result<String> {
    let template = include_str!("../templates/report.html.tera");

    let mut context = tera::Context::new();
    context.insert("title", title);
    context.insert("headers", headers);
    context.insert("rows", rows);

    tera::Tera::one_off(template, &context, true).map_err(|e| eyre!("Failed to render HTML: {e}"))
}
