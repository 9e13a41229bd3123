use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::{IntoFieldList, ops as catalog_ops};
use crate::config::DatabaseOptions;
use crate::error::{Error, QueryError, SchemaError, StorageError};
use crate::storage::{DocumentStore, FileStore, MemoryStore};
use crate::types::{Document, Record, TableInfo};

use super::builders::Query;
use super::filter::scalar_text;
use super::query::execute_select;
use super::update::{self, IntoAssignments};

struct DatabaseInner {
    store: Box<dyn DocumentStore + Send + Sync>,
    options: DatabaseOptions,
}

/// The main database handle.
///
/// `JotDb` is cheaply clonable (`Arc`-based) and `Send + Sync`. It takes no
/// locks: every operation loads the whole table document, edits it, and
/// writes it back, so concurrent writers to the same table can lose updates.
#[derive(Clone)]
pub struct JotDb {
    inner: Arc<DatabaseInner>,
}

impl JotDb {
    /// Open a file-backed database, creating its directories when missing.
    pub fn open(options: DatabaseOptions) -> Result<Self, Error> {
        let store = FileStore::open(&options.path)?;
        info!(path = %options.path.display(), "opened database");
        Ok(Self::with_store(store, options))
    }

    /// Use an arbitrary store.
    pub fn with_store(
        store: impl DocumentStore + Send + Sync + 'static,
        options: DatabaseOptions,
    ) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                store: Box::new(store),
                options,
            }),
        }
    }

    /// An ephemeral database with default options.
    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::new(), DatabaseOptions::default())
    }

    pub fn options(&self) -> &DatabaseOptions {
        &self.inner.options
    }

    /// Handle to `name`. The table does not have to exist yet.
    pub fn table(&self, name: &str) -> Result<Table<'_>, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::NoTableSelected.into());
        }
        Ok(Table {
            db: self,
            name: name.to_string(),
        })
    }

    /// Handle to the table named in the options.
    pub fn selected(&self) -> Result<Table<'_>, Error> {
        match &self.inner.options.table {
            Some(name) => self.table(name),
            None => Err(SchemaError::NoTableSelected.into()),
        }
    }

    fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }
}

/// Operations on one table.
///
/// A failed operation never writes: validation happens on the loaded copy
/// before anything is saved.
pub struct Table<'a> {
    db: &'a JotDb,
    name: String,
}

impl Table<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exists(&self) -> Result<bool, Error> {
        self.db.store().exists(&self.name)
    }

    fn load(&self) -> Result<Document, Error> {
        self.db.store().load(&self.name)
    }

    fn save(&self, doc: &Document) -> Result<(), Error> {
        self.db.store().save(doc)
    }

    // -----------------------------------------------------------------------
    // Table lifecycle
    // -----------------------------------------------------------------------

    /// Create the table with only its primary-key field.
    pub fn create(&self) -> Result<(), Error> {
        let primary_key = &self.db.options().primary_key;
        catalog_ops::validate_primary_key_name(primary_key)?;
        self.db.store().create(&self.name, primary_key)?;
        Ok(())
    }

    /// Create the table and add the given fields after the primary key.
    pub fn create_with_fields(&self, fields: impl IntoFieldList) -> Result<(), Error> {
        let fields = fields.into_field_list();
        let primary_key = &self.db.options().primary_key;
        catalog_ops::validate_primary_key_name(primary_key)?;
        let mut doc = self.db.store().create(&self.name, primary_key)?;
        if catalog_ops::add_fields(&mut doc, &fields) > 0 {
            self.save(&doc)?;
        }
        Ok(())
    }

    /// Drop the table. A soft remove moves the file into the backup area.
    pub fn remove(&self, hard: bool) -> Result<(), Error> {
        if hard {
            self.db.store().hard_delete(&self.name)
        } else {
            self.db.store().move_to_backup(&self.name)
        }
    }

    /// Summary of the table's schema and size.
    pub fn describe(&self) -> Result<TableInfo, Error> {
        Ok(TableInfo::from(&self.load()?))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn select(&self, query: &Query) -> Result<Vec<Record>, Error> {
        let doc = self.load()?;
        execute_select(&doc, query)
    }

    pub fn select_all(&self) -> Result<Vec<Record>, Error> {
        Ok(self.load()?.records())
    }

    /// The row whose primary key equals `id`.
    pub fn find(&self, id: impl Into<Value>) -> Result<Option<Record>, Error> {
        let doc = self.load()?;
        let query = Query::new().field_eq(&doc.primary_key_name, id);
        Ok(execute_select(&doc, &query)?.into_iter().next())
    }

    /// Like [`find`](Self::find), failing with `DataNotFound` on no match.
    pub fn find_or_fail(&self, id: impl Into<Value>) -> Result<Record, Error> {
        let id = id.into();
        let text = scalar_text(&id).into_owned();
        self.find(id)?
            .ok_or_else(|| QueryError::DataNotFound(text).into())
    }

    pub fn first(&self) -> Result<Option<Record>, Error> {
        let doc = self.load()?;
        Ok(doc.rows.first().map(|row| doc.flatten_row(row)))
    }

    pub fn last(&self) -> Result<Option<Record>, Error> {
        let doc = self.load()?;
        Ok(doc.rows.last().map(|row| doc.flatten_row(row)))
    }

    /// Primary key of the last stored row.
    pub fn last_primary_key(&self) -> Result<Option<Value>, Error> {
        let doc = self.load()?;
        Ok(doc
            .rows
            .last()
            .and_then(|row| row.first())
            .and_then(|cell| cell.to_value()))
    }

    /// The key the next insert will assign.
    pub fn next_primary_key(&self) -> Result<u64, Error> {
        Ok(self.load()?.primary_key_counter)
    }

    // -----------------------------------------------------------------------
    // Row mutations
    // -----------------------------------------------------------------------

    /// Append a row and return its primary key. A supplied primary-key
    /// value is ignored.
    pub fn insert(&self, values: impl IntoAssignments) -> Result<u64, Error> {
        let values = values.into_assignments()?;
        let mut doc = self.load()?;
        update::validate_fields(&doc, &values)?;

        let id = doc.primary_key_counter;
        let next = id.checked_add(1).ok_or_else(|| {
            StorageError::Corrupted(format!("primary key counter of '{}' is exhausted", self.name))
        })?;
        let row = update::build_row(&doc, &values);
        doc.rows.push(row);
        doc.primary_key_counter = next;
        self.save(&doc)?;
        debug!(table = %self.name, id, "inserted row");
        Ok(id)
    }

    /// Apply the values to every row of the table. There is no row scoping.
    /// Returns the number of rows touched.
    pub fn update(&self, values: impl IntoAssignments) -> Result<usize, Error> {
        let values = values.into_assignments()?;
        let mut doc = self.load()?;
        update::validate_fields(&doc, &values)?;

        let touched = update::apply_to_rows(&mut doc, &values);
        if touched > 0 {
            self.save(&doc)?;
        }
        debug!(table = %self.name, touched, "updated rows");
        Ok(touched)
    }

    /// Clear every row. Unless `hard`, the table is backed up first.
    /// Returns the number of rows removed.
    pub fn delete(&self, hard: bool) -> Result<usize, Error> {
        let mut doc = self.load()?;
        if doc.rows.is_empty() {
            return Ok(0);
        }
        if !hard {
            self.db.store().backup(&self.name)?;
        }
        let removed = doc.rows.len();
        doc.rows.clear();
        self.save(&doc)?;
        info!(table = %self.name, removed, hard, "deleted all rows");
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Schema
    // -----------------------------------------------------------------------

    /// Add fields, skipping names already present. Returns the number added.
    pub fn add_fields(&self, names: impl IntoFieldList) -> Result<usize, Error> {
        let names = names.into_field_list();
        let mut doc = self.load()?;
        let added = catalog_ops::add_fields(&mut doc, &names);
        if added > 0 {
            self.save(&doc)?;
            info!(table = %self.name, added, "added fields");
        }
        Ok(added)
    }

    /// Remove fields and their data. Returns the number of columns removed.
    pub fn remove_fields(&self, names: impl IntoFieldList) -> Result<usize, Error> {
        let names = names.into_field_list();
        let mut doc = self.load()?;
        let removed = catalog_ops::remove_fields(&mut doc, &names);
        if removed > 0 {
            self.save(&doc)?;
            info!(table = %self.name, removed, "removed fields");
        }
        Ok(removed)
    }

    /// Relabel fields by `(old, new)` pairs. Returns the number relabelled.
    pub fn rename_fields<I, K, V>(&self, mapping: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mapping: Vec<(String, String)> = mapping
            .into_iter()
            .map(|(old, new)| (old.into(), new.into()))
            .collect();
        let mut doc = self.load()?;
        let renamed = catalog_ops::rename_fields(&mut doc, &mapping)?;
        if renamed > 0 {
            self.save(&doc)?;
            info!(table = %self.name, renamed, "renamed fields");
        }
        Ok(renamed)
    }

    pub fn rename_primary_key(&self, new_name: &str) -> Result<(), Error> {
        let mut doc = self.load()?;
        catalog_ops::rename_primary_key(&mut doc, new_name)?;
        self.save(&doc)?;
        info!(table = %self.name, primary_key = %doc.primary_key_name, "renamed primary key");
        Ok(())
    }
}
