//! Load-test driver.
//!
//! Dispatches synthetic submissions through the regular pipeline and reports
//! progress as they complete. Dispatch and reporting run in spawned tasks so
//! the caller returns immediately.

pub mod error;

use self::error::LoadError;
use crate::configuration::LoadConfiguration;
use crate::storage::Storage;
use crate::store::Store;
use crate::submit::{Pipeline, SubmitMode};
use ballot_client::Backend;
use ballot_common::{candidate::Candidate, category::Category, selection::Selections};
use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, Duration};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    /// Submissions of this run that have completed so far.
    pub completed: usize,
    /// Submissions requested for this run.
    pub total: usize,
    pub message: String,
}

pub struct LoadDriver<B, S> {
    conf: LoadConfiguration,
    pipeline: Arc<Pipeline<B, S>>,
    store: Arc<Store<S>>,
    // Bumped by every start and stop; a run only acts while it still owns
    // the current value.
    generation: Arc<AtomicU64>,
}

impl<B, S> LoadDriver<B, S>
where
    B: Backend + 'static,
    S: Storage + 'static,
{
    pub fn new(conf: LoadConfiguration, pipeline: Arc<Pipeline<B, S>>, store: Arc<Store<S>>) -> Self {
        Self {
            conf,
            pipeline,
            store,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts a run of `user_count` synthetic voters and returns without
    /// waiting for any of them. `on_progress` is called once per completed
    /// submission, with strictly increasing counts.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run_load<F>(&self, user_count: usize, on_progress: F) -> Result<(), LoadError>
    where
        F: Fn(LoadProgress) + Send + 'static,
    {
        let started = self.store.update(|state| {
            if state.load_running {
                false
            } else {
                state.load_running = true;
                true
            }
        });
        if !started {
            return Err(LoadError::AlreadyRunning);
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.store.notify();

        let candidates = self.store.candidates();
        if candidates.is_empty() {
            tracing::warn!("load test aborted: no candidates");
            self.finish(generation);
            return Err(LoadError::NoCandidates);
        }

        tracing::info!(user_count, candidates = candidates.len(), "load test started");

        let (tx, rx) = mpsc::unbounded_channel();
        let reporter = Reporter {
            rx,
            total: user_count,
            on_progress,
            generation,
            current: self.generation.clone(),
            store: self.store.clone(),
        };
        tokio::spawn(reporter.run());

        let dispatcher = Dispatcher {
            conf: self.conf.clone(),
            pipeline: self.pipeline.clone(),
            candidates,
            user_count,
            tx,
            generation,
            current: self.generation.clone(),
        };
        tokio::spawn(dispatcher.run());

        Ok(())
    }

    /// Stops dispatching new submissions. Those already handed to the queue
    /// still run.
    pub fn stop_load(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let was_running = self.store.update(|state| std::mem::replace(&mut state.load_running, false));
        if was_running {
            tracing::info!("load test stopped");
            self.store.notify();
        }
    }

    pub fn is_running(&self) -> bool {
        self.store.load_running()
    }

    fn finish(&self, generation: u64) {
        clear_running(&self.store, &self.generation, generation);
    }
}

fn clear_running<S: Storage>(store: &Store<S>, current: &AtomicU64, generation: u64) {
    if current.load(Ordering::SeqCst) != generation {
        return;
    }
    store.update(|state| state.load_running = false);
    store.notify();
}

struct Dispatcher<B, S> {
    conf: LoadConfiguration,
    pipeline: Arc<Pipeline<B, S>>,
    candidates: Vec<Candidate>,
    user_count: usize,
    tx: mpsc::UnboundedSender<usize>,
    generation: u64,
    current: Arc<AtomicU64>,
}

impl<B, S> Dispatcher<B, S>
where
    B: Backend + 'static,
    S: Storage + 'static,
{
    async fn run(self) {
        for user in 1..=self.user_count {
            if self.current.load(Ordering::SeqCst) != self.generation {
                tracing::debug!(dispatched = user - 1, "load dispatch interrupted");
                break;
            }

            let selections = random_selections(&self.candidates);
            let pipeline = self.pipeline.clone();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                if let Err(e) = pipeline.submit(&selections, SubmitMode::Synthetic).await {
                    tracing::warn!(user, "synthetic submission rejected: {}", e);
                }
                let _ = tx.send(user);
            });

            if self.conf.pace_every > 0 && user % self.conf.pace_every == 0 {
                time::sleep(Duration::from_millis(self.conf.pace_millis)).await;
            }
        }
    }
}

struct Reporter<S, F> {
    rx: mpsc::UnboundedReceiver<usize>,
    total: usize,
    on_progress: F,
    generation: u64,
    current: Arc<AtomicU64>,
    store: Arc<Store<S>>,
}

impl<S, F> Reporter<S, F>
where
    S: Storage,
    F: Fn(LoadProgress),
{
    // Ends once the dispatcher and every submission it spawned have dropped
    // their senders.
    async fn run(mut self) {
        let mut completed = 0;
        while let Some(user) = self.rx.recv().await {
            completed += 1;
            (self.on_progress)(LoadProgress {
                completed,
                total: self.total,
                message: format!("simulated user #{} submitted", user),
            });
        }

        tracing::info!(completed, total = self.total, "load test finished");
        clear_running(&self.store, &self.current, self.generation);
    }
}

fn random_selections(candidates: &[Candidate]) -> Selections {
    let mut rng = rand::thread_rng();
    let mut selections = Selections::default();
    for &category in Category::ALL.iter() {
        if let Some(candidate) = candidates.choose(&mut rng) {
            selections.select(category, candidate.id.clone());
        }
    }
    selections
}
