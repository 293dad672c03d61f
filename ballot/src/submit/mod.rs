pub mod error;

use self::error::Rejection;
use crate::queue::RequestQueue;
use crate::storage::Storage;
use crate::store::Store;
use ballot_client::Backend;
use ballot_common::{candidate::Vote, category::Category, selection::Selections};
use futures::future;
use std::sync::Arc;
use tokio::sync::oneshot;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubmitMode {
    /// A real attendee; subject to the open and already-voted gates.
    Attendee,
    /// Generated by the load driver; bypasses both gates and leaves no
    /// voted fact behind.
    Synthetic,
}

/// Turns a set of selections into one queued write per category.
pub struct Pipeline<B, S> {
    backend: Arc<B>,
    queue: RequestQueue,
    store: Arc<Store<S>>,
    storage: Arc<S>,
}

impl<B, S> Pipeline<B, S>
where
    B: Backend + 'static,
    S: Storage + 'static,
{
    pub fn new(backend: Arc<B>, queue: RequestQueue, store: Arc<Store<S>>, storage: Arc<S>) -> Self {
        Self {
            backend,
            queue,
            store,
            storage,
        }
    }

    /// Resolves once all three writes have been handed to the backend.
    ///
    /// `Ok` means the writes were accepted for delivery; the backend gives no
    /// acknowledgment, so a write that failed on the wire is only logged by
    /// the queue.
    pub async fn submit(&self, selections: &Selections, mode: SubmitMode) -> Result<(), Rejection> {
        let synthetic = mode == SubmitMode::Synthetic;

        if !synthetic && !self.store.voting_open() {
            return Err(Rejection::VotingClosed);
        }
        if !synthetic && !self.store.test_mode() && self.store.has_voted() {
            return Err(Rejection::AlreadyVoted);
        }
        if let Some(category) = selections.missing() {
            return Err(Rejection::Incomplete(category));
        }

        let receipts = Category::ALL
            .iter()
            .filter_map(|&category| {
                let candidate_id = selections.get(category)?;
                Some(self.enqueue_vote(Vote::new(candidate_id, category)))
            })
            .collect::<Vec<_>>();

        for receipt in future::join_all(receipts).await {
            if receipt.is_err() {
                return Err(Rejection::QueueClosed);
            }
        }

        if !synthetic && !self.store.test_mode() {
            if let Err(e) = self.storage.set_voted() {
                tracing::warn!("failed to persist the voted flag: {}", e);
            }
            self.store.notify();
        }

        tracing::debug!(?mode, "submission dispatched");
        Ok(())
    }

    // The receiver resolves once the write has run, whatever its outcome.
    fn enqueue_vote(&self, vote: Vote) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let backend = self.backend.clone();
        self.queue.enqueue(async move {
            let res = backend.submit_vote(&vote).await;
            let _ = tx.send(());
            res
        });
        rx
    }
}
