//! Bounded request queue.
//!
//! Every write reaching the network passes through here. Tasks start in the
//! order they were enqueued and at most `max_concurrent` run at once. A task
//! that fails is logged and dropped; nothing is retried and nothing is
//! reported back to the caller, who has to signal completion out of band if
//! it cares.

use crate::configuration::QueueConfiguration;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::collections::VecDeque;
use std::error;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};

type StdError = Box<dyn error::Error + Send + Sync + 'static>;

type Task = BoxFuture<'static, Result<(), StdError>>;

#[derive(Default)]
struct Counters {
    pending: AtomicUsize,
    active: AtomicUsize,
}

#[derive(Clone)]
pub struct RequestQueue {
    tx: mpsc::UnboundedSender<Task>,
    counters: Arc<Counters>,
}

impl RequestQueue {
    /// Spawns the queue process. Must be called within a tokio runtime.
    pub fn spawn(conf: QueueConfiguration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        let process = RequestQueueProcess {
            max_concurrent: conf.max_concurrent.max(1),
            completion_delay: Duration::from_millis(conf.completion_delay_millis),
            rx,
            pending: VecDeque::new(),
            running: FuturesUnordered::new(),
            counters: counters.clone(),
        };

        tokio::spawn(process.run());
        Self { tx, counters }
    }

    /// Schedules `task`. Its outcome is only logged.
    pub fn enqueue<F, E>(&self, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<StdError>,
    {
        let task: Task = task.map(|res| res.map_err(Into::into)).boxed();
        let pending = self.counters.pending.fetch_add(1, Ordering::SeqCst) + 1;
        if self.tx.send(task).is_err() {
            self.counters.pending.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!("request queue has been terminated; task dropped");
            return;
        }
        tracing::trace!(pending, "task enqueued");
    }

    /// Tasks waiting for a free slot.
    pub fn pending(&self) -> usize {
        self.counters.pending.load(Ordering::SeqCst)
    }

    /// Tasks currently holding a slot.
    pub fn active(&self) -> usize {
        self.counters.active.load(Ordering::SeqCst)
    }
}

struct RequestQueueProcess {
    max_concurrent: usize,
    completion_delay: Duration,
    rx: mpsc::UnboundedReceiver<Task>,
    pending: VecDeque<Task>,
    running: FuturesUnordered<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl RequestQueueProcess {
    async fn run(mut self) {
        let mut closed = false;

        loop {
            self.drain();
            if closed && self.running.is_empty() {
                break;
            }

            tokio::select! {
                task = self.rx.recv(), if !closed => match task {
                    Some(task) => self.pending.push_back(task),
                    None => closed = true,
                },
                Some(joined) = self.running.next(), if !self.running.is_empty() => {
                    self.counters.active.fetch_sub(1, Ordering::SeqCst);
                    if let Err(e) = joined {
                        tracing::warn!("queued task aborted: {}", e);
                    }
                }
            }
        }

        tracing::debug!("request queue process is terminated since every handle is dropped");
    }

    // Starts pending tasks while there are free slots.
    fn drain(&mut self) {
        while self.running.len() < self.max_concurrent {
            let task = match self.pending.pop_front() {
                Some(task) => task,
                None => break,
            };
            self.counters.pending.fetch_sub(1, Ordering::SeqCst);
            let active = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::trace!(active, pending = self.pending.len(), "task started");

            let delay = self.completion_delay;
            self.running.push(tokio::spawn(async move {
                if let Err(e) = task.await {
                    tracing::warn!("queued task failed: {}", e);
                }
                if !delay.is_zero() {
                    time::sleep(delay).await;
                }
            }));
        }
    }
}
