//! Remote sync engine.
//!
//! Polls the read endpoint while at least one caller asked for it and folds
//! each snapshot into the store. Subscribers are notified only when the
//! merge changed something. A failed read leaves the store untouched until
//! the next tick.

mod merge;

use self::merge::Merger;
use crate::configuration::SyncConfiguration;
use crate::storage::Storage;
use crate::store::Store;
use ballot_client::{error::BackendError, Backend};
use ballot_common::snapshot::Snapshot;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::watch;
use tokio::time::{self, Duration, MissedTickBehavior};

pub struct SyncEngine<B, S> {
    inner: Arc<SyncInner<B, S>>,
}

impl<B, S> Clone for SyncEngine<B, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct SyncInner<B, S> {
    conf: SyncConfiguration,
    backend: Arc<B>,
    store: Arc<Store<S>>,
    merger: Mutex<Merger>,
    polling: Mutex<Polling>,
    consecutive_errors: AtomicU32,
}

#[derive(Default)]
struct Polling {
    subscribers: usize,
    stop: Option<watch::Sender<bool>>,
}

impl<B, S> SyncEngine<B, S>
where
    B: Backend + 'static,
    S: Storage + 'static,
{
    pub fn new(conf: SyncConfiguration, backend: Arc<B>, store: Arc<Store<S>>) -> Self {
        Self {
            inner: Arc::new(SyncInner {
                conf,
                backend,
                store,
                merger: Mutex::default(),
                polling: Mutex::default(),
                consecutive_errors: AtomicU32::new(0),
            }),
        }
    }

    /// Registers one more interested caller. The first one starts the poll
    /// loop, which reads immediately and then on every interval.
    pub fn start(&self) {
        let mut polling = self.polling();
        polling.subscribers += 1;
        if polling.stop.is_some() {
            tracing::trace!(subscribers = polling.subscribers, "polling already running");
            return;
        }

        let (tx, rx) = watch::channel(false);
        polling.stop = Some(tx);
        let process = PollProcess {
            engine: Arc::downgrade(&self.inner),
            interval: Duration::from_millis(self.inner.conf.interval_millis.max(1)),
            backoff_every: self.inner.conf.backoff_every,
            stop: rx,
        };
        tokio::spawn(process.run());
        tracing::info!(subscribers = polling.subscribers, "polling started");
    }

    /// Releases one caller. The loop stops once the last one is gone; a read
    /// already in flight is left to finish but its result is discarded.
    pub fn stop(&self) {
        let mut polling = self.polling();
        polling.subscribers = polling.subscribers.saturating_sub(1);
        if polling.subscribers > 0 {
            return;
        }
        if let Some(tx) = polling.stop.take() {
            let _ = tx.send(true);
            tracing::info!("polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.polling().stop.is_some()
    }

    pub fn subscribers(&self) -> usize {
        self.polling().subscribers
    }

    /// Reads once and merges the result. Returns whether the store changed.
    pub async fn refresh(&self) -> bool {
        let result = self.fetch().await;
        self.ingest(result)
    }

    async fn fetch(&self) -> Result<Snapshot, BackendError> {
        self.inner
            .backend
            .fetch_snapshot()
            .await
            .map(Snapshot::from)
    }

    fn ingest(&self, result: Result<Snapshot, BackendError>) -> bool {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let errors = self.inner.consecutive_errors.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::warn!(errors, "failed to read the snapshot: {}", e);
                return false;
            }
        };
        self.inner.consecutive_errors.store(0, Ordering::SeqCst);

        let changed = {
            let mut merger = self
                .inner
                .merger
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            self.inner
                .store
                .update(|state| merger.merge(state, snapshot))
        };

        if changed {
            tracing::debug!("snapshot changed the store");
            self.inner.store.notify();
        }
        changed
    }

    fn backing_off(&self) -> bool {
        let threshold = self.inner.conf.error_threshold;
        threshold > 0 && self.inner.consecutive_errors.load(Ordering::SeqCst) >= threshold
    }

    fn polling(&self) -> std::sync::MutexGuard<'_, Polling> {
        self.inner
            .polling
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

struct PollProcess<B, S> {
    engine: Weak<SyncInner<B, S>>,
    interval: Duration,
    backoff_every: u32,
    stop: watch::Receiver<bool>,
}

impl<B, S> PollProcess<B, S>
where
    B: Backend + 'static,
    S: Storage + 'static,
{
    async fn run(mut self) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut skipped: u32 = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.stop.changed() => break,
            }

            let engine = match self.engine.upgrade() {
                Some(inner) => SyncEngine { inner },
                None => {
                    tracing::debug!("poll process is terminated since the engine is dropped");
                    break;
                }
            };

            if engine.backing_off() && self.backoff_every > 1 {
                skipped += 1;
                if skipped % self.backoff_every != 0 {
                    tracing::trace!(skipped, "backing off; poll skipped");
                    continue;
                }
            } else {
                skipped = 0;
            }

            let result = engine.fetch().await;
            if *self.stop.borrow() {
                tracing::debug!("polling stopped during a read; result discarded");
                break;
            }
            engine.ingest(result);
        }
    }
}
