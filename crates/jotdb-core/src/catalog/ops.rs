//! Schema operations: add, remove, and rename fields, rename the primary key.
//!
//! All functions edit a loaded [`Document`] in place and leave every row
//! aligned with the field list. Persisting the result is up to the caller.
//! Field names other than the primary key are not required to be unique.

use tracing::{debug, warn};

use crate::error::{Error, SchemaError};
use crate::types::{Document, RESERVED_KEYS};

/// Reject primary-key names that would clash with the document layout.
pub fn validate_primary_key_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() || RESERVED_KEYS.contains(&name) {
        return Err(SchemaError::ReservedName(name.to_string()).into());
    }
    Ok(())
}

/// Append fields that do not exist yet, then pad every row to the new width.
///
/// Names already present anywhere in the schema are skipped without error.
/// Returns the number of fields actually added.
pub fn add_fields(doc: &mut Document, names: &[String]) -> usize {
    let mut added = 0;
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if doc.column(name).is_some() {
            debug!(table = %doc.name, field = name, "field already exists, skipping");
            continue;
        }
        doc.fields.push(name.to_string());
        added += 1;
    }
    doc.pad_rows();
    added
}

/// Remove fields and their cells from every row.
///
/// Unknown names are ignored. The primary-key column can never be removed.
/// Returns the number of columns removed.
pub fn remove_fields(doc: &mut Document, names: &[String]) -> usize {
    let mut removed = 0;
    for name in names {
        let name = name.trim();
        if doc.fields.first().is_some_and(|pk| pk == name) {
            warn!(table = %doc.name, field = name, "refusing to remove the primary key column");
            continue;
        }
        while let Some(index) = doc.column(name) {
            doc.fields.remove(index);
            for row in &mut doc.rows {
                if index < row.len() {
                    row.remove(index);
                }
            }
            removed += 1;
        }
    }
    removed
}

/// Relabel fields according to `mapping` (old name, new name).
///
/// Every pair is matched against the labels as they were before the call, so
/// `a -> b, b -> c` renames the old `a` to `b` and the old `b` to `c`.
/// Unmatched pairs are ignored and row data is never touched. Renaming the
/// primary-key column also renames the primary key. A rename that would leave
/// two columns with the same label is skipped.
/// Returns the number of fields relabelled.
pub fn rename_fields(doc: &mut Document, mapping: &[(String, String)]) -> Result<usize, Error> {
    let mut renames: Vec<(usize, String)> = Vec::new();
    for (old, new) in mapping {
        let new = new.trim();
        if new.is_empty() {
            continue;
        }
        for (index, field) in doc.fields.iter().enumerate() {
            if field == old.trim() && !renames.iter().any(|(i, _)| *i == index) {
                renames.push((index, new.to_string()));
            }
        }
    }

    let mut labels = doc.fields.clone();
    for (index, new) in &renames {
        labels[*index] = new.clone();
    }
    // Dropping one rename restores an old label, which can clash in turn.
    while let Some(pos) = renames
        .iter()
        .position(|(_, new)| labels.iter().filter(|l| *l == new).count() > 1)
    {
        let (index, new) = renames.remove(pos);
        warn!(
            table = %doc.name,
            field = %doc.fields[index],
            new_name = %new,
            "rename would duplicate a field name, skipping"
        );
        labels[index] = doc.fields[index].clone();
    }

    if let Some((_, new_pk)) = renames.iter().find(|(index, _)| *index == 0) {
        validate_primary_key_name(new_pk)?;
    }

    for (index, new) in &renames {
        if *index == 0 {
            doc.primary_key_name = new.clone();
        }
        doc.fields[*index] = new.clone();
    }
    Ok(renames.len())
}

/// Rename the primary key. The counter and all row data are preserved.
///
/// Fails with `DuplicateField` when another column already carries the name.
pub fn rename_primary_key(doc: &mut Document, new_name: &str) -> Result<(), Error> {
    let new_name = new_name.trim();
    validate_primary_key_name(new_name)?;
    if doc.fields.iter().skip(1).any(|f| f == new_name) {
        return Err(SchemaError::DuplicateField(new_name.to_string()).into());
    }
    doc.primary_key_name = new_name.to_string();
    match doc.fields.first_mut() {
        Some(first) => *first = new_name.to_string(),
        None => doc.fields.push(new_name.to_string()),
    }
    Ok(())
}
