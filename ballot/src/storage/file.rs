use super::error::StorageError;
use super::Storage;
use crate::configuration::StorageConfiguration;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Keeps the voted fact as a marker file named after the storage key.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(conf: &StorageConfiguration) -> Self {
        Self {
            path: conf.dir.join(&conf.key),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, error: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            error,
        }
    }
}

impl Storage for FileStorage {
    fn has_voted(&self) -> Result<bool, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(!content.trim().is_empty()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn set_voted(&self) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, "true").map_err(|e| self.io_error(e))
    }

    fn clear_voted(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
