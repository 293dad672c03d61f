use crate::admin::Admin;
use crate::configuration::Configuration;
use crate::load::{error::LoadError, LoadDriver, LoadProgress};
use crate::queue::RequestQueue;
use crate::storage::Storage;
use crate::store::Store;
use crate::submit::{error::Rejection, Pipeline, SubmitMode};
use crate::sync::SyncEngine;
use ballot_client::Backend;
use ballot_common::selection::Selections;
use std::sync::Arc;

/// Wires every component around one backend and one voted-fact storage.
pub struct Ballot<B, S> {
    store: Arc<Store<S>>,
    queue: RequestQueue,
    sync: SyncEngine<B, S>,
    pipeline: Arc<Pipeline<B, S>>,
    admin: Admin<B, S>,
    load: LoadDriver<B, S>,
}

impl<B, S> Ballot<B, S>
where
    B: Backend + 'static,
    S: Storage + 'static,
{
    /// Spawns the request queue process. Must be called within a tokio
    /// runtime.
    pub fn new(conf: Configuration, backend: Arc<B>, storage: Arc<S>) -> Self {
        let store = Arc::new(Store::new(storage.clone()));
        let queue = RequestQueue::spawn(conf.queue);
        let sync = SyncEngine::new(conf.sync, backend.clone(), store.clone());
        let pipeline = Arc::new(Pipeline::new(
            backend.clone(),
            queue.clone(),
            store.clone(),
            storage.clone(),
        ));
        let admin = Admin::new(conf.admin, backend, store.clone(), storage, sync.clone());
        let load = LoadDriver::new(conf.load, pipeline.clone(), store.clone());

        Self {
            store,
            queue,
            sync,
            pipeline,
            admin,
            load,
        }
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn sync(&self) -> &SyncEngine<B, S> {
        &self.sync
    }

    pub fn admin(&self) -> &Admin<B, S> {
        &self.admin
    }

    pub fn load(&self) -> &LoadDriver<B, S> {
        &self.load
    }

    /// Submits an attendee's selections.
    pub async fn submit(&self, selections: &Selections) -> Result<(), Rejection> {
        self.pipeline.submit(selections, SubmitMode::Attendee).await
    }

    pub fn start_sync(&self) {
        self.sync.start()
    }

    pub fn stop_sync(&self) {
        self.sync.stop()
    }

    pub fn run_load<F>(&self, user_count: usize, on_progress: F) -> Result<(), LoadError>
    where
        F: Fn(LoadProgress) + Send + 'static,
    {
        self.load.run_load(user_count, on_progress)
    }

    pub fn stop_load(&self) {
        self.load.stop_load()
    }
}
