pub mod admin;
pub mod configuration;
mod context;
pub mod load;
pub mod queue;
pub mod storage;
pub mod store;
pub mod submit;
pub mod sync;
pub mod test_util;

pub use context::Ballot;
