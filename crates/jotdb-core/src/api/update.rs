//! Field assignments for insert and update.
//!
//! Assignments arrive as `(field, value)` pairs, a JSON object, or the text
//! form `"house = Stark, words = Winter Is Coming"`. They are validated
//! against the schema before any row is touched.

use serde_json::Value;

use crate::error::{Error, QueryError};
use crate::types::{Cell, Document, Row};

/// An ordered list of `field = value` assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments(Vec<(String, Cell)>);

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment. Empty text becomes an empty cell.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Cell>) -> Self {
        let value = match value.into() {
            Cell::Text(s) if s.is_empty() => Cell::Empty,
            other => other,
        };
        self.0.push((field.into().trim().to_string(), value));
        self
    }

    /// Parse `"field = value, ..."`. Each item splits on its first `=`.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut out = Self::new();
        for (field, value) in parse_pairs(text)? {
            out.0.push((field, Cell::from_text(&value)));
        }
        Ok(out)
    }

    /// Build from separate `field=value` items, as given on a command line.
    /// Each item splits on its first `=` only, so values may hold commas.
    pub fn from_items<I, S>(items: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Self::new();
        for item in items {
            if let Some((field, value)) = split_item(item.as_ref())? {
                out.0.push((field, Cell::from_text(&value)));
            }
        }
        Ok(out)
    }

    /// Build from a JSON object of scalars.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        let Value::Object(map) = value else {
            return Err(QueryError::InvalidAssignment(value.to_string()).into());
        };
        let mut out = Self::new();
        for (field, v) in map {
            let cell = Cell::from_value(v)
                .ok_or_else(|| QueryError::InvalidAssignment(format!("{field}={v}")))?;
            out = out.set(field.as_str(), cell);
        }
        Ok(out)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.0.iter().map(|(f, c)| (f.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value assigned to `field`. When a field is assigned twice the last
    /// assignment wins.
    pub fn value_for(&self, field: &str) -> Option<&Cell> {
        self.0.iter().rev().find(|(f, _)| f == field).map(|(_, c)| c)
    }
}

/// Split `"a = 1, b = 2"` into trimmed `(field, value)` pairs.
///
/// Blank items are skipped. An item without `=` or with an empty field name
/// fails with `InvalidAssignment`.
pub fn parse_pairs(text: &str) -> Result<Vec<(String, String)>, Error> {
    let mut pairs = Vec::new();
    for item in text.split(',') {
        if let Some(pair) = split_item(item)? {
            pairs.push(pair);
        }
    }
    Ok(pairs)
}

/// Split one `field = value` item. `None` for a blank item.
fn split_item(item: &str) -> Result<Option<(String, String)>, Error> {
    if item.trim().is_empty() {
        return Ok(None);
    }
    let Some((field, value)) = item.split_once('=') else {
        return Err(QueryError::InvalidAssignment(item.trim().to_string()).into());
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(QueryError::InvalidAssignment(item.trim().to_string()).into());
    }
    Ok(Some((field.to_string(), value.trim().to_string())))
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Anything accepted as the values of an insert or update.
pub trait IntoAssignments {
    fn into_assignments(self) -> Result<Assignments, Error>;
}

impl IntoAssignments for Assignments {
    fn into_assignments(self) -> Result<Assignments, Error> {
        Ok(self)
    }
}

impl IntoAssignments for &str {
    fn into_assignments(self) -> Result<Assignments, Error> {
        Assignments::parse(self)
    }
}

impl IntoAssignments for String {
    fn into_assignments(self) -> Result<Assignments, Error> {
        Assignments::parse(&self)
    }
}

impl IntoAssignments for Value {
    fn into_assignments(self) -> Result<Assignments, Error> {
        match &self {
            Value::String(text) => Assignments::parse(text),
            other => Assignments::from_json(other),
        }
    }
}

impl IntoAssignments for &Value {
    fn into_assignments(self) -> Result<Assignments, Error> {
        match self {
            Value::String(text) => Assignments::parse(text),
            other => Assignments::from_json(other),
        }
    }
}

impl<K, V> IntoAssignments for Vec<(K, V)>
where
    K: Into<String>,
    V: Into<Cell>,
{
    fn into_assignments(self) -> Result<Assignments, Error> {
        Ok(self
            .into_iter()
            .fold(Assignments::new(), |acc, (k, v)| acc.set(k, v)))
    }
}

impl<K, V, const N: usize> IntoAssignments for [(K, V); N]
where
    K: Into<String>,
    V: Into<Cell>,
{
    fn into_assignments(self) -> Result<Assignments, Error> {
        Ok(self
            .into_iter()
            .fold(Assignments::new(), |acc, (k, v)| acc.set(k, v)))
    }
}

// ---------------------------------------------------------------------------
// Row building
// ---------------------------------------------------------------------------

/// Fail with `FieldsNotFound` naming every assigned field the schema lacks,
/// in input order.
pub fn validate_fields(doc: &Document, values: &Assignments) -> Result<(), Error> {
    let mut missing: Vec<String> = Vec::new();
    for (field, _) in values.iter() {
        if doc.column(field).is_none() && !missing.iter().any(|m| m == field) {
            missing.push(field.to_string());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(QueryError::FieldsNotFound(missing).into())
    }
}

/// Build a new row in schema order. Column 0 takes the current counter and
/// any supplied primary-key value is ignored.
pub fn build_row(doc: &Document, values: &Assignments) -> Row {
    let mut row: Row = Vec::with_capacity(doc.fields.len());
    for (index, field) in doc.fields.iter().enumerate() {
        if index == 0 {
            row.push(Cell::from(doc.primary_key_counter));
        } else {
            row.push(values.value_for(field).cloned().unwrap_or_default());
        }
    }
    row
}

/// Apply the assignments to every row. Returns the number of rows touched.
pub fn apply_to_rows(doc: &mut Document, values: &Assignments) -> usize {
    if values.is_empty() {
        return 0;
    }
    let targets: Vec<(usize, Cell)> = doc
        .fields
        .iter()
        .enumerate()
        .filter_map(|(index, field)| values.value_for(field).map(|c| (index, c.clone())))
        .collect();
    for row in &mut doc.rows {
        for (index, cell) in &targets {
            if let Some(slot) = row.get_mut(*index) {
                *slot = cell.clone();
            }
        }
    }
    doc.rows.len()
}
