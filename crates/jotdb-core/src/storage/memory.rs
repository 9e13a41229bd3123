use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{Error, SchemaError};
use crate::types::Document;

use super::DocumentStore;
use super::codec;

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Vec<u8>>,
    backups: Vec<(String, Vec<u8>)>,
}

/// A [`DocumentStore`] holding encoded documents in memory.
///
/// Documents are stored in their wire encoding, so every `load` returns a
/// fresh copy exactly as a file-backed store would.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored wire text of `table`, if present.
    pub fn raw(&self, table: &str) -> Option<String> {
        self.state
            .lock()
            .tables
            .get(table)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Wire text of every backup taken of `table`, oldest first.
    pub fn backups(&self, table: &str) -> Vec<String> {
        self.state
            .lock()
            .backups
            .iter()
            .filter(|(name, _)| name == table)
            .map(|(_, bytes)| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    fn take_current(&self, table: &str) -> Result<Vec<u8>, Error> {
        self.state
            .lock()
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| SchemaError::TableNotFound(table.to_string()).into())
    }
}

impl DocumentStore for MemoryStore {
    fn exists(&self, table: &str) -> Result<bool, Error> {
        Ok(self.state.lock().tables.contains_key(table))
    }

    fn load(&self, table: &str) -> Result<Document, Error> {
        let bytes = self.take_current(table)?;
        Ok(codec::from_bytes(&bytes)?)
    }

    fn create(&self, table: &str, primary_key: &str) -> Result<Document, Error> {
        let mut state = self.state.lock();
        if state.tables.contains_key(table) {
            return Err(SchemaError::TableAlreadyExists(table.to_string()).into());
        }
        let doc = Document::new(table, primary_key);
        state.tables.insert(table.to_string(), codec::to_bytes(&doc)?);
        Ok(doc)
    }

    fn save(&self, doc: &Document) -> Result<(), Error> {
        let bytes = codec::to_bytes(doc)?;
        self.state.lock().tables.insert(doc.name.clone(), bytes);
        Ok(())
    }

    fn backup(&self, table: &str) -> Result<(), Error> {
        let bytes = self.take_current(table)?;
        self.state.lock().backups.push((table.to_string(), bytes));
        Ok(())
    }

    fn move_to_backup(&self, table: &str) -> Result<(), Error> {
        let mut state = self.state.lock();
        let bytes = state
            .tables
            .remove(table)
            .ok_or_else(|| SchemaError::TableNotFound(table.to_string()))?;
        state.backups.push((table.to_string(), bytes));
        Ok(())
    }

    fn hard_delete(&self, table: &str) -> Result<(), Error> {
        self.state
            .lock()
            .tables
            .remove(table)
            .map(|_| ())
            .ok_or_else(|| SchemaError::TableNotFound(table.to_string()).into())
    }
}
