//! Error types for all JotDB operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for JotDB operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("folder could not be created: {}", path.display())]
    FolderCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupted table document: {0}")]
    Corrupted(String),
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("no table selected")]
    NoTableSelected,

    #[error("'{0}' is reserved by the table document format")]
    ReservedName(String),

    #[error("field already exists: {0}")]
    DuplicateField(String),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("fields not found: {}", .0.join(", "))]
    FieldsNotFound(Vec<String>),

    #[error("no data found for primary key {0}")]
    DataNotFound(String),

    #[error("invalid assignment '{0}': expected field=value")]
    InvalidAssignment(String),
}

impl Error {
    /// Field names carried by a `FieldsNotFound` error, if this is one.
    pub fn missing_fields(&self) -> Option<&[String]> {
        match self {
            Error::Query(QueryError::FieldsNotFound(fields)) => Some(fields),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
