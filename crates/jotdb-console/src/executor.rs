use jotdb_core::api::update::{Assignments, parse_pairs};
use jotdb_core::api::{JotDb, Query, Table};
use jotdb_core::types::{Record, TableInfo};
use serde_json::Value;
use tracing::debug;

use crate::commands::Command;
use crate::error::ConsoleError;

/// Structured result from executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Table-level change succeeded (CREATE, REMOVE, RENAME PRIMARY KEY).
    Ok(String),
    /// Rows returned by SELECT.
    Rows(Vec<Record>),
    /// Single row (FIND, FIRST, LAST).
    Item(Option<Record>),
    /// Row inserted with this primary key.
    Inserted(u64),
    /// Rows or fields changed by a mutation.
    Affected { action: &'static str, count: usize },
    /// A primary-key value (LAST-ID, NEXT-ID).
    Key(Option<Value>),
    /// Table summary (DESCRIBE).
    Info(TableInfo),
}

/// Execute a command against the database's selected table.
pub fn execute(db: &JotDb, cmd: Command) -> Result<CommandResult, ConsoleError> {
    let table = db.selected()?;
    debug!(table = table.name(), ?cmd, "executing command");
    match cmd {
        Command::Create { fields } => exec_create(&table, fields.as_deref()),
        Command::Select {
            fields,
            condition,
            order_by,
            limit,
            offset,
            reverse,
        } => {
            let query = build_query(
                fields.as_deref(),
                condition.as_deref(),
                order_by.as_deref(),
                limit,
                offset,
                reverse,
            );
            Ok(CommandResult::Rows(table.select(&query)?))
        }
        Command::Insert { assignments } => {
            let id = table.insert(Assignments::from_items(&assignments)?)?;
            Ok(CommandResult::Inserted(id))
        }
        Command::Update { assignments } => {
            let count = table.update(Assignments::from_items(&assignments)?)?;
            Ok(CommandResult::Affected {
                action: "updated",
                count,
            })
        }
        Command::Delete { hard } => {
            let count = table.delete(hard)?;
            Ok(CommandResult::Affected {
                action: "deleted",
                count,
            })
        }
        Command::Remove { hard } => exec_remove(&table, hard),
        Command::AddFields { fields } => {
            let count = table.add_fields(fields.join(","))?;
            Ok(CommandResult::Affected {
                action: "added",
                count,
            })
        }
        Command::RemoveFields { fields } => {
            let count = table.remove_fields(fields.join(","))?;
            Ok(CommandResult::Affected {
                action: "removed",
                count,
            })
        }
        Command::RenameFields { mapping } => {
            let pairs = parse_pairs(&mapping.join(","))?;
            let count = table.rename_fields(pairs)?;
            Ok(CommandResult::Affected {
                action: "renamed",
                count,
            })
        }
        Command::RenamePrimaryKey { name } => {
            table.rename_primary_key(&name)?;
            Ok(CommandResult::Ok(format!(
                "Primary key of '{}' renamed to '{}'.",
                table.name(),
                name.trim()
            )))
        }
        Command::Find { id, or_fail } => exec_find(&table, &id, or_fail),
        Command::First => Ok(CommandResult::Item(table.first()?)),
        Command::Last => Ok(CommandResult::Item(table.last()?)),
        Command::LastId => Ok(CommandResult::Key(table.last_primary_key()?)),
        Command::NextId => Ok(CommandResult::Key(Some(table.next_primary_key()?.into()))),
        Command::Describe => Ok(CommandResult::Info(table.describe()?)),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn exec_create(table: &Table<'_>, fields: Option<&str>) -> Result<CommandResult, ConsoleError> {
    table.create_with_fields(fields.unwrap_or_default())?;
    Ok(CommandResult::Ok(format!("Table '{}' created.", table.name())))
}

fn exec_remove(table: &Table<'_>, hard: bool) -> Result<CommandResult, ConsoleError> {
    table.remove(hard)?;
    let msg = if hard {
        format!("Table '{}' deleted permanently.", table.name())
    } else {
        format!("Table '{}' moved to backups.", table.name())
    };
    Ok(CommandResult::Ok(msg))
}

fn exec_find(table: &Table<'_>, id: &str, or_fail: bool) -> Result<CommandResult, ConsoleError> {
    let id = id.trim().to_string();
    if or_fail {
        Ok(CommandResult::Item(Some(table.find_or_fail(id)?)))
    } else {
        Ok(CommandResult::Item(table.find(id)?))
    }
}

fn build_query(
    fields: Option<&str>,
    condition: Option<&str>,
    order_by: Option<&str>,
    limit: Option<usize>,
    offset: Option<usize>,
    reverse: bool,
) -> Query {
    let mut query = Query::new().reverse(reverse);
    if let Some(fields) = fields {
        query = query.project(fields);
    }
    if let Some(condition) = condition {
        query = query.filter(condition);
    }
    if let Some(order_by) = order_by {
        query = query.order_by_text(order_by);
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    if let Some(offset) = offset {
        query = query.offset(offset);
    }
    query
}
