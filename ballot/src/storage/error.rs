use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum StorageError {
    Io { path: PathBuf, error: io::Error },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io { path, error } => {
                write!(f, "voted flag at {} is not accessible: ", path.display())?;
                error.fmt(f)
            }
        }
    }
}

impl error::Error for StorageError {}
