use super::error::StorageError;
use super::Storage;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct MemoryStorage {
    voted: AtomicBool,
}

impl Storage for MemoryStorage {
    fn has_voted(&self) -> Result<bool, StorageError> {
        Ok(self.voted.load(Ordering::SeqCst))
    }

    fn set_voted(&self) -> Result<(), StorageError> {
        self.voted.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn clear_voted(&self) -> Result<(), StorageError> {
        self.voted.store(false, Ordering::SeqCst);
        Ok(())
    }
}
