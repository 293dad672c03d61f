use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigurationError {
    Read(PathBuf, io::Error),
    Parse(PathBuf, toml::de::Error),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::Read(path, e) => {
                write!(f, "failed to read {}: ", path.display())?;
                e.fmt(f)
            }
            ConfigurationError::Parse(path, e) => {
                write!(f, "failed to parse {}: ", path.display())?;
                e.fmt(f)
            }
        }
    }
}

impl error::Error for ConfigurationError {}
