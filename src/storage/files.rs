// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

//! Durable JSON file storage for the vault records.
//!
//! The whole persistence layer is two small JSON files under the data
//! directory: the encrypted payload and the disclosure state. Records are
//! read fully on every request and written fully on every mutation; there
//! are no partial-field updates. Writes go through a temp file and an
//! atomic rename so a crash mid-write never leaves a torn record behind.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use super::StoragePaths;

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Record not found
    #[error("not found: {0}")]
    NotFound(String),
    /// Storage not initialized
    #[error("storage not initialized")]
    NotInitialized,
    /// Health self-test read back different bytes than were written
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// File-backed storage manager for the vault data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    paths: StoragePaths,
    initialized: bool,
}

impl FileStorage {
    /// Create a new FileStorage instance.
    ///
    /// Does NOT create the data directory. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Create the data directory. Safe to call multiple times (idempotent).
    pub fn initialize(&mut self) -> StorageResult<()> {
        fs::create_dir_all(self.paths.root())?;
        self.initialized = true;
        Ok(())
    }

    /// Check that the data directory is writable and reads back intact.
    ///
    /// Performs a write-read-delete round trip on a throwaway file.
    pub fn health_check(&self) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let test_file = self.paths.root().join(".health_check");
        let test_data = b"health_check_data";

        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StorageError::IntegrityViolation(
                "health check data mismatch".to_string(),
            ));
        }

        Ok(())
    }

    /// Read a JSON file and deserialize it.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StorageError::NotFound(path.display().to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        let reader = BufReader::new(file);
        let value = serde_json::from_reader(reader)?;
        Ok(value)
    }

    /// Write a JSON file (atomic write via rename).
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Check if a file exists. Only a definitive `NotFound` counts as
    /// absent; a file that cannot be opened for any other reason (for
    /// example a permission fault) is still there and must not be reported
    /// as gone.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        match File::open(path.as_ref()) {
            Ok(_) => true,
            Err(e) => e.kind() != io::ErrorKind::NotFound,
        }
    }

    /// Delete a file. Deleting a file that is already gone is not an error;
    /// the clear transition must stay idempotent.
    pub fn delete(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        match fs::remove_file(path.as_ref()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    fn test_storage() -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let paths = StoragePaths::new(dir.path());
        let mut storage = FileStorage::new(paths);
        storage.initialize().expect("initialize test storage");
        (dir, storage)
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        id: String,
        value: i32,
    }

    #[test]
    fn initialize_creates_data_dir() {
        let (dir, storage) = test_storage();
        assert!(storage.paths().root().exists());
        drop(dir);
    }

    #[test]
    fn write_and_read_json() {
        let (_dir, storage) = test_storage();
        let data = TestData {
            id: "test-1".to_string(),
            value: 42,
        };

        let path = storage.paths().state();
        storage.write_json(&path, &data).unwrap();

        let read: TestData = storage.read_json(&path).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let (_dir, storage) = test_storage();
        let result = storage.read_json::<TestData>(storage.paths().payload());
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn delete_is_idempotent() {
        let (_dir, storage) = test_storage();
        let path = storage.paths().payload();
        storage
            .write_json(&path, &TestData {
                id: "del".to_string(),
                value: 0,
            })
            .unwrap();

        assert!(storage.exists(&path));
        storage.delete(&path).unwrap();
        assert!(!storage.exists(&path));
        // second delete is a no-op
        storage.delete(&path).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_not_reported_absent() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, storage) = test_storage();
        let path = storage.paths().payload();
        storage
            .write_json(&path, &TestData {
                id: "locked".to_string(),
                value: 1,
            })
            .unwrap();

        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        // Whether the open succeeds (root) or fails with a permission error,
        // the file is present and must read as such.
        assert!(storage.exists(&path));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
    }

    #[test]
    fn health_check_works() {
        let (_dir, storage) = test_storage();
        storage.health_check().expect("health check should pass");
    }

    #[test]
    fn uninitialized_storage_returns_error() {
        let paths = StoragePaths::new("/tmp/never-init");
        let storage = FileStorage::new(paths);

        let result = storage.read_json::<TestData>("/tmp/any.json");
        assert!(matches!(result, Err(StorageError::NotInitialized)));
    }
}
