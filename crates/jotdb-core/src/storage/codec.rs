//! Table document wire format.
//!
//! ```text
//! {"table":"houses","id":3,"fields":[["id"],["house"]],"data":[[[1],["Stark"]],[[2],[]]]}
//! ```
//!
//! Keys are written in exactly this order. The primary-key counter sits under
//! a key named after the primary key. Each field is a one-element array and
//! each cell is either a one-element array or `[]` for "no value".

use serde_json::{Map, Value};

use crate::error::StorageError;
use crate::types::{Cell, Document, RESERVED_KEYS, Row};

/// Encode a document as a JSON value with the canonical key order.
pub fn encode_document(doc: &Document) -> Value {
    let mut obj = Map::new();
    obj.insert("table".to_string(), Value::String(doc.name.clone()));
    obj.insert(
        doc.primary_key_name.clone(),
        Value::from(doc.primary_key_counter),
    );
    obj.insert(
        "fields".to_string(),
        Value::Array(
            doc.fields
                .iter()
                .map(|f| Value::Array(vec![Value::String(f.clone())]))
                .collect(),
        ),
    );
    obj.insert(
        "data".to_string(),
        Value::Array(doc.rows.iter().map(encode_row).collect()),
    );
    Value::Object(obj)
}

fn encode_row(row: &Row) -> Value {
    Value::Array(
        row.iter()
            .map(|cell| Value::Array(cell.to_value().into_iter().collect()))
            .collect(),
    )
}

/// Serialize a document to its compact on-disk bytes.
pub fn to_bytes(doc: &Document) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(&encode_document(doc))
        .map_err(|e| StorageError::Corrupted(format!("failed to serialize document: {e}")))
}

/// Parse on-disk bytes into a document.
///
/// Short rows are padded with empty cells so every loaded document is aligned.
pub fn from_bytes(bytes: &[u8]) -> Result<Document, StorageError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| StorageError::Corrupted(format!("invalid JSON: {e}")))?;
    decode_document(&value)
}

/// Decode a parsed JSON value into a document.
pub fn decode_document(value: &Value) -> Result<Document, StorageError> {
    let obj = value
        .as_object()
        .ok_or_else(|| corrupted("document is not an object"))?;

    let name = obj
        .get("table")
        .and_then(Value::as_str)
        .ok_or_else(|| corrupted("missing table name"))?
        .to_string();

    let fields = obj
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| corrupted("missing fields"))?
        .iter()
        .map(decode_field)
        .collect::<Result<Vec<_>, _>>()?;
    if fields.is_empty() {
        return Err(corrupted("field list is empty"));
    }

    let rows = match obj.get("data") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(rows)) => rows.iter().map(decode_row).collect::<Result<_, _>>()?,
        Some(_) => return Err(corrupted("data is not an array")),
    };

    // The counter lives under the first key that is not part of the fixed layout.
    let (primary_key_name, primary_key_counter) =
        match obj.iter().find(|(k, _)| !RESERVED_KEYS.contains(&k.as_str())) {
            Some((key, counter)) => {
                let counter = counter.as_u64().ok_or_else(|| {
                    corrupted(format!("primary key counter '{key}' is not an integer"))
                })?;
                (key.clone(), counter)
            }
            None => (fields[0].clone(), 1),
        };

    let mut doc = Document {
        name,
        primary_key_name,
        primary_key_counter,
        fields,
        rows,
    };
    doc.pad_rows();
    Ok(doc)
}

fn decode_field(value: &Value) -> Result<String, StorageError> {
    match value {
        Value::Array(items) => match items.first() {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(corrupted("field entry must hold a single name")),
        },
        // Bare strings are accepted for hand-edited files.
        Value::String(s) => Ok(s.clone()),
        _ => Err(corrupted("field entry must be an array")),
    }
}

fn decode_row(value: &Value) -> Result<Row, StorageError> {
    value
        .as_array()
        .ok_or_else(|| corrupted("row is not an array"))?
        .iter()
        .map(decode_cell)
        .collect()
}

fn decode_cell(value: &Value) -> Result<Cell, StorageError> {
    let inner = match value {
        Value::Array(items) => match items.first() {
            Some(v) => v,
            None => return Ok(Cell::Empty),
        },
        scalar => scalar,
    };
    Cell::from_value(inner).ok_or_else(|| corrupted("cell holds a nested structure"))
}

fn corrupted(msg: impl Into<String>) -> StorageError {
    StorageError::Corrupted(msg.into())
}
