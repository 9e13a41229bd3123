//! Core types: cells, rows, records, and the per-table document.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Default directory holding the table files.
pub const DEFAULT_DATABASE_PATH: &str = "database";

/// Default name of the primary-key field.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Sub-directory of the database path that receives backups.
pub const BACKUP_DIR: &str = "saves";

/// `chrono` format of the timestamp embedded in backup file names.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%d.%m.%Y--%H-%M";

/// Top-level keys of the table document. A primary key may not use them.
pub const RESERVED_KEYS: [&str; 3] = ["table", "fields", "data"];

/// A single stored value.
///
/// On disk a cell is a one-element array holding a scalar, or an empty
/// array when no value is present.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(Number),
}

impl Cell {
    /// Build a cell from user-supplied text. Surrounding whitespace is
    /// trimmed and an empty result becomes [`Cell::Empty`].
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// Convert a JSON scalar into a cell. Returns `None` for arrays and
    /// objects, which have no cell representation.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Cell::Empty),
            Value::String(s) => Some(Cell::Text(s.clone())),
            Value::Number(n) => Some(Cell::Number(n.clone())),
            Value::Bool(b) => Some(Cell::Text(b.to_string())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The JSON value of this cell, or `None` when empty.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(Value::String(s.clone())),
            Cell::Number(n) => Some(Value::Number(n.clone())),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n.into())
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Cell::Number(n.into())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Cell::Empty, Cell::Number)
    }
}

/// A stored row: cells positionally aligned to [`Document::fields`].
pub type Row = Vec<Cell>;

/// A flattened row keyed by field name. Empty cells contribute no key.
pub type Record = Map<String, Value>;

/// The in-memory form of one table file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub primary_key_name: String,
    /// The value the next insert will assign.
    pub primary_key_counter: u64,
    /// Field names; `fields[0]` is the primary key.
    pub fields: Vec<String>,
    pub rows: Vec<Row>,
}

impl Document {
    /// The minimal document written by `create`.
    pub fn new(name: impl Into<String>, primary_key_name: impl Into<String>) -> Self {
        let primary_key_name = primary_key_name.into();
        Self {
            name: name.into(),
            fields: vec![primary_key_name.clone()],
            primary_key_name,
            primary_key_counter: 1,
            rows: Vec::new(),
        }
    }

    /// Column index of the first field with this name.
    pub fn column(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// True when every row has exactly one cell per field.
    pub fn is_aligned(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.fields.len())
    }

    /// Pad short rows with trailing empty cells until they match `fields`.
    pub fn pad_rows(&mut self) {
        let width = self.fields.len();
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, Cell::Empty);
            }
        }
    }

    /// Key the cells of `row` by field name, dropping empty cells.
    pub fn flatten_row(&self, row: &Row) -> Record {
        let mut record = Map::new();
        for (field, cell) in self.fields.iter().zip(row) {
            if let Some(value) = cell.to_value() {
                record.insert(field.clone(), value);
            }
        }
        record
    }

    /// All rows flattened, in storage order.
    pub fn records(&self) -> Vec<Record> {
        self.rows.iter().map(|row| self.flatten_row(row)).collect()
    }
}

/// Summary of a table as returned by `describe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub primary_key: String,
    pub next_primary_key: u64,
    pub fields: Vec<String>,
    pub rows: usize,
}

impl From<&Document> for TableInfo {
    fn from(doc: &Document) -> Self {
        Self {
            name: doc.name.clone(),
            primary_key: doc.primary_key_name.clone(),
            next_primary_key: doc.primary_key_counter,
            fields: doc.fields.clone(),
            rows: doc.rows.len(),
        }
    }
}
