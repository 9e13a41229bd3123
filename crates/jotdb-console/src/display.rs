use std::io::Write;

use jotdb_core::api::filter::scalar_text;
use jotdb_core::types::{Record, TableInfo};
use serde_json::{Value, json};

use crate::error::ConsoleError;
use crate::executor::CommandResult;

/// Output mode for rendering command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable output.
    Pretty,
    /// Machine-parseable JSON (one JSON object per result on stdout).
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Pretty
        }
    }
}

/// Render a command result in the given mode.
pub fn render(
    result: &CommandResult,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    match result {
        CommandResult::Ok(msg) => match mode {
            OutputMode::Pretty => writeln!(out, "{msg}")?,
            OutputMode::Json => writeln!(out, "{}", json!({"ok": true, "message": msg}))?,
        },
        CommandResult::Rows(rows) => match mode {
            OutputMode::Pretty => print_rows(rows, out)?,
            OutputMode::Json => writeln!(out, "{}", json!({"rows": rows, "count": rows.len()}))?,
        },
        CommandResult::Item(item) => match mode {
            OutputMode::Pretty => match item {
                Some(row) => print_rows(std::slice::from_ref(row), out)?,
                None => writeln!(out, "Row not found.")?,
            },
            OutputMode::Json => match item {
                Some(row) => writeln!(out, "{}", json!({"found": true, "row": row}))?,
                None => writeln!(out, "{}", json!({"found": false}))?,
            },
        },
        CommandResult::Inserted(id) => match mode {
            OutputMode::Pretty => writeln!(out, "Inserted row {id}.")?,
            OutputMode::Json => writeln!(out, "{}", json!({"ok": true, "id": id}))?,
        },
        CommandResult::Affected { action, count } => match mode {
            OutputMode::Pretty => writeln!(out, "{} {count}.", capitalize(action))?,
            OutputMode::Json => writeln!(out, "{}", json!({"ok": true, *action: count}))?,
        },
        CommandResult::Key(key) => match mode {
            OutputMode::Pretty => match key {
                Some(v) => writeln!(out, "{}", scalar_text(v))?,
                None => writeln!(out, "(none)")?,
            },
            OutputMode::Json => writeln!(out, "{}", json!({"key": key}))?,
        },
        CommandResult::Info(info) => match mode {
            OutputMode::Pretty => print_info(info, out)?,
            OutputMode::Json => writeln!(out, "{}", serde_json::to_value(info)?)?,
        },
    }
    Ok(())
}

/// Render an error in the given mode (always to stderr).
pub fn render_error(err: &dyn std::fmt::Display, mode: OutputMode) {
    match mode {
        OutputMode::Pretty => eprintln!("Error: {err}"),
        OutputMode::Json => eprintln!("{}", json!({"error": err.to_string()})),
    }
}

// ---- Pretty-print helpers ----

/// Print rows as an aligned text table. Columns appear in the order they
/// are first seen; missing cells are left blank.
fn print_rows(rows: &[Record], out: &mut dyn Write) -> std::io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "No rows.");
    }

    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(*c).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    write_line(out, columns.iter().copied(), &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_line(out, rule.iter().map(String::as_str), &widths)?;
    for row in &cells {
        write_line(out, row.iter().map(String::as_str), &widths)?;
    }
    writeln!(out, "({} row(s))", rows.len())
}

fn write_line<'a>(
    out: &mut dyn Write,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> std::io::Result<()> {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    writeln!(out, "{}", line.join(" | ").trim_end())
}

fn cell_text(value: &Value) -> String {
    scalar_text(value).into_owned()
}

fn print_info(info: &TableInfo, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "Table: {}", info.name)?;
    writeln!(out, "  Primary key:      {}", info.primary_key)?;
    writeln!(out, "  Next primary key: {}", info.next_primary_key)?;
    writeln!(out, "  Fields:           {}", info.fields.join(", "))?;
    writeln!(out, "  Rows:             {}", info.rows)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
