//! Document storage: the [`DocumentStore`] contract, the wire codec, and the
//! file and in-memory stores.
//!
//! Every operation reads or replaces a whole table document. Stores perform
//! no locking: two processes writing the same table can lose updates or
//! observe partial writes. JotDB is meant for a single embedded writer.

pub mod codec;
pub mod file;
pub mod memory;

use std::sync::Arc;

use crate::error::Error;
use crate::types::Document;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Persistence boundary used by the query and mutation engine.
pub trait DocumentStore {
    /// Whether a document exists for `table`.
    fn exists(&self, table: &str) -> Result<bool, Error>;

    /// Load a table. Fails with `TableNotFound` when it does not exist.
    fn load(&self, table: &str) -> Result<Document, Error>;

    /// Write the boilerplate document for a new table.
    /// Fails with `TableAlreadyExists` when the table is present.
    fn create(&self, table: &str, primary_key: &str) -> Result<Document, Error>;

    /// Replace the stored document with `doc`.
    fn save(&self, doc: &Document) -> Result<(), Error>;

    /// Copy the current document into the backup area.
    fn backup(&self, table: &str) -> Result<(), Error>;

    /// Move the document into the backup area. Nothing remains under the
    /// table's own name afterwards.
    fn move_to_backup(&self, table: &str) -> Result<(), Error>;

    /// Permanently delete the document.
    fn hard_delete(&self, table: &str) -> Result<(), Error>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn exists(&self, table: &str) -> Result<bool, Error> {
        (**self).exists(table)
    }

    fn load(&self, table: &str) -> Result<Document, Error> {
        (**self).load(table)
    }

    fn create(&self, table: &str, primary_key: &str) -> Result<Document, Error> {
        (**self).create(table, primary_key)
    }

    fn save(&self, doc: &Document) -> Result<(), Error> {
        (**self).save(doc)
    }

    fn backup(&self, table: &str) -> Result<(), Error> {
        (**self).backup(table)
    }

    fn move_to_backup(&self, table: &str) -> Result<(), Error> {
        (**self).move_to_backup(table)
    }

    fn hard_delete(&self, table: &str) -> Result<(), Error> {
        (**self).hard_delete(table)
    }
}
