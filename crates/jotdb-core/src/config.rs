//! Database configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{DEFAULT_DATABASE_PATH, DEFAULT_PRIMARY_KEY};

/// Options for opening a [`JotDb`](crate::api::JotDb).
///
/// Missing keys fall back to their defaults, so the struct can be embedded
/// in a larger configuration file:
///
/// ```
/// use jotdb_core::config::DatabaseOptions;
///
/// let options: DatabaseOptions = serde_json::from_str(r#"{"table": "houses"}"#).unwrap();
/// assert_eq!(options.primary_key, "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseOptions {
    /// Table used by [`JotDb::selected`](crate::api::JotDb::selected).
    pub table: Option<String>,
    /// Directory holding the table files.
    pub path: PathBuf,
    /// Primary-key name given to newly created tables.
    pub primary_key: String,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            table: None,
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
        }
    }
}

impl DatabaseOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }
}
