pub mod candidate;
pub mod category;
pub mod mutation;
pub mod selection;
pub mod snapshot;
pub mod types;
