pub mod configuration;
pub mod error;
mod http;

pub use self::http::HttpBackend;

use self::error::BackendError;
use async_trait::async_trait;
use ballot_common::{candidate::Vote, mutation::ConfigMutation, snapshot::RawSnapshot};

/// The spreadsheet backend as seen by the client.
///
/// Writes are best effort: `Ok` means the request left the client, not that
/// the backend recorded it. The form endpoint gives no readable answer, so a
/// write is delivered at most once and never confirmed.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Posts one vote to the form endpoint.
    async fn submit_vote(&self, vote: &Vote) -> Result<(), BackendError>;

    /// Posts a config mutation to the script endpoint.
    async fn send_config(&self, mutation: &ConfigMutation) -> Result<(), BackendError>;

    /// Reads the current config rows and score statistics.
    async fn fetch_snapshot(&self) -> Result<RawSnapshot, BackendError>;

    /// Issues a read and only checks that the endpoint answered with 2xx.
    async fn probe(&self) -> Result<(), BackendError>;

    /// Human-facing URL of the vote form, if the backend has one.
    fn form_view_url(&self) -> Option<String> {
        None
    }
}
