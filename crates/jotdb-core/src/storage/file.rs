use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, info};

use crate::error::{Error, SchemaError, StorageError};
use crate::types::{BACKUP_DIR, BACKUP_TIMESTAMP_FORMAT, Document};

use super::DocumentStore;
use super::codec;

/// A [`DocumentStore`] keeping one JSON file per table.
///
/// Layout:
///
/// ```text
/// <root>/<table>.json
/// <root>/saves/<table>-<DD.MM.YYYY--HH-MM>.json
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `path`, creating the database and backup
    /// directories when missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = path.as_ref().to_path_buf();
        create_dir(&root)?;
        create_dir(&root.join(BACKUP_DIR))?;
        Ok(Self { root })
    }

    /// The database directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the live file for `table`.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.json"))
    }

    /// Backup path for `table` stamped with the current local time.
    pub fn backup_path(&self, table: &str) -> PathBuf {
        self.root
            .join(BACKUP_DIR)
            .join(backup_file_name(table, &Local::now()))
    }

    /// Map an io error on `table`'s file. `NotFound` only means a missing
    /// table when the table file itself is absent, not the backup directory.
    fn not_found(&self, table: &str, err: io::Error) -> Error {
        if err.kind() == io::ErrorKind::NotFound && !self.table_path(table).exists() {
            SchemaError::TableNotFound(table.to_string()).into()
        } else {
            StorageError::Io(err).into()
        }
    }
}

/// File name of a backup taken at `at`. Backups of the same table within
/// the same minute share a name and overwrite each other.
pub fn backup_file_name<Tz: TimeZone>(table: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{table}-{}.json", at.format(BACKUP_TIMESTAMP_FORMAT))
}

fn create_dir(path: &Path) -> Result<(), StorageError> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| StorageError::FolderCreateFailed {
        path: path.to_path_buf(),
        source,
    })
}

impl DocumentStore for FileStore {
    fn exists(&self, table: &str) -> Result<bool, Error> {
        Ok(self.table_path(table).is_file())
    }

    fn load(&self, table: &str) -> Result<Document, Error> {
        let path = self.table_path(table);
        let bytes = fs::read(&path).map_err(|e| self.not_found(table, e))?;
        debug!(table, path = %path.display(), bytes = bytes.len(), "loaded table");
        Ok(codec::from_bytes(&bytes)?)
    }

    fn create(&self, table: &str, primary_key: &str) -> Result<Document, Error> {
        let path = self.table_path(table);
        let doc = Document::new(table, primary_key);
        let bytes = codec::to_bytes(&doc)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    Error::from(SchemaError::TableAlreadyExists(table.to_string()))
                }
                _ => StorageError::Io(e).into(),
            })?;
        file.write_all(&bytes).map_err(StorageError::from)?;

        info!(table, path = %path.display(), "created table");
        Ok(doc)
    }

    fn save(&self, doc: &Document) -> Result<(), Error> {
        let path = self.table_path(&doc.name);
        let bytes = codec::to_bytes(doc)?;
        fs::write(&path, &bytes).map_err(StorageError::from)?;
        debug!(table = %doc.name, rows = doc.rows.len(), bytes = bytes.len(), "saved table");
        Ok(())
    }

    fn backup(&self, table: &str) -> Result<(), Error> {
        let target = self.backup_path(table);
        fs::copy(self.table_path(table), &target).map_err(|e| self.not_found(table, e))?;
        info!(table, backup = %target.display(), "backed up table");
        Ok(())
    }

    fn move_to_backup(&self, table: &str) -> Result<(), Error> {
        let target = self.backup_path(table);
        fs::rename(self.table_path(table), &target).map_err(|e| self.not_found(table, e))?;
        info!(table, backup = %target.display(), "moved table to backup");
        Ok(())
    }

    fn hard_delete(&self, table: &str) -> Result<(), Error> {
        fs::remove_file(self.table_path(table)).map_err(|e| self.not_found(table, e))?;
        info!(table, "deleted table permanently");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_directories() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("database");
        let store = FileStore::open(&root).unwrap();
        assert!(store.root().is_dir());
        assert!(root.join(BACKUP_DIR).is_dir());
    }

    #[test]
    fn test_open_fails_when_path_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("database");
        fs::write(&blocker, b"not a directory").unwrap();

        match FileStore::open(&blocker) {
            Err(StorageError::FolderCreateFailed { path, .. }) => assert_eq!(path, blocker),
            other => panic!("expected FolderCreateFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_backup_file_name_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(backup_file_name("houses", &at), "houses-07.03.2024--09-05.json");
    }

    #[test]
    fn test_create_then_load() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.create("t", "id").unwrap();
        assert!(store.exists("t").unwrap());
        assert_eq!(
            fs::read_to_string(store.table_path("t")).unwrap(),
            r#"{"table":"t","id":1,"fields":[["id"]],"data":[]}"#
        );
        assert_eq!(store.load("t").unwrap(), Document::new("t", "id"));
    }

    #[test]
    fn test_create_twice_fails() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.create("t", "id").unwrap();
        assert!(matches!(
            store.create("t", "id"),
            Err(Error::Schema(SchemaError::TableAlreadyExists(_)))
        ));
    }

    #[test]
    fn test_missing_table_operations() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        for result in [
            store.load("ghost").map(|_| ()),
            store.backup("ghost"),
            store.move_to_backup("ghost"),
            store.hard_delete("ghost"),
        ] {
            assert!(matches!(
                result,
                Err(Error::Schema(SchemaError::TableNotFound(_)))
            ));
        }
    }

    #[test]
    fn test_missing_backup_dir_is_io_error() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.create("t", "id").unwrap();
        fs::remove_dir(dir.path().join(BACKUP_DIR)).unwrap();

        for result in [store.backup("t"), store.move_to_backup("t")] {
            match result {
                Err(Error::Storage(StorageError::Io(e))) => {
                    assert_eq!(e.kind(), io::ErrorKind::NotFound)
                }
                other => panic!("expected Io error, got {other:?}"),
            }
        }
        assert!(store.table_path("t").is_file());
    }

    #[test]
    fn test_move_to_backup_keeps_content() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.create("t", "id").unwrap();
        let before = fs::read(store.table_path("t")).unwrap();

        store.move_to_backup("t").unwrap();
        assert!(!store.table_path("t").exists());

        let backups: Vec<_> = fs::read_dir(dir.path().join(BACKUP_DIR))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read(&backups[0]).unwrap(), before);
    }
}
