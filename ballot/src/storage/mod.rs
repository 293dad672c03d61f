pub mod error;
pub mod file;
pub mod in_memory;

pub use self::file::FileStorage;
pub use self::in_memory::MemoryStorage;

use self::error::StorageError;

/// Durable home of the per-device "already voted" fact.
pub trait Storage: Send + Sync {
    fn has_voted(&self) -> Result<bool, StorageError>;
    fn set_voted(&self) -> Result<(), StorageError>;
    fn clear_voted(&self) -> Result<(), StorageError>;
}
