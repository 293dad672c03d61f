//! In-memory backend for exercising the client without a network.

use async_trait::async_trait;
use ballot_client::{error::BackendError, Backend};
use ballot_common::{candidate::Vote, mutation::ConfigMutation, snapshot::RawSnapshot};
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

struct Recorded {
    snapshot: Value,
    votes: Vec<Vote>,
    mutations: Vec<ConfigMutation>,
    reads: usize,
    fail_reads: bool,
    fail_writes: bool,
    probe_status: Option<u16>,
}

/// Records every write and serves a scripted snapshot.
///
/// Writes and reads can be held at a gate so tests can observe what is in
/// flight, and either direction can be made to fail.
pub struct MemoryBackend {
    recorded: Mutex<Recorded>,
    writes_open: watch::Sender<bool>,
    reads_open: watch::Sender<bool>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_snapshot(json!({ "s": {}, "c": [] }))
    }

    /// `snapshot` is served as the raw JSON body of the read endpoint.
    pub fn with_snapshot(snapshot: Value) -> Self {
        let (writes_open, _) = watch::channel(true);
        let (reads_open, _) = watch::channel(true);
        Self {
            recorded: Mutex::new(Recorded {
                snapshot,
                votes: Vec::new(),
                mutations: Vec::new(),
                reads: 0,
                fail_reads: false,
                fail_writes: false,
                probe_status: None,
            }),
            writes_open,
            reads_open,
        }
    }

    pub fn set_snapshot(&self, snapshot: Value) {
        self.recorded().snapshot = snapshot;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.recorded().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.recorded().fail_writes = fail;
    }

    /// Makes `probe` answer with a non-2xx status.
    pub fn set_probe_status(&self, status: Option<u16>) {
        self.recorded().probe_status = status;
    }

    pub fn hold_writes(&self) {
        self.writes_open.send_replace(false);
    }

    pub fn release_writes(&self) {
        self.writes_open.send_replace(true);
    }

    pub fn hold_reads(&self) {
        self.reads_open.send_replace(false);
    }

    pub fn release_reads(&self) {
        self.reads_open.send_replace(true);
    }

    /// Votes that reached the backend, in arrival order.
    pub fn votes(&self) -> Vec<Vote> {
        self.recorded().votes.clone()
    }

    pub fn mutations(&self) -> Vec<ConfigMutation> {
        self.recorded().mutations.clone()
    }

    /// Reads issued so far, including failed and held ones.
    pub fn reads(&self) -> usize {
        self.recorded().reads
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn pass(gate: &watch::Sender<bool>) {
    let mut rx = gate.subscribe();
    loop {
        let open = *rx.borrow_and_update();
        if open || rx.changed().await.is_err() {
            return;
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn submit_vote(&self, vote: &Vote) -> Result<(), BackendError> {
        pass(&self.writes_open).await;
        let mut recorded = self.recorded();
        if recorded.fail_writes {
            return Err(BackendError::Unavailable("writes are failing".to_string()));
        }
        recorded.votes.push(vote.clone());
        Ok(())
    }

    async fn send_config(&self, mutation: &ConfigMutation) -> Result<(), BackendError> {
        let mut recorded = self.recorded();
        if recorded.fail_writes {
            return Err(BackendError::Unavailable("writes are failing".to_string()));
        }
        recorded.mutations.push(mutation.clone());
        Ok(())
    }

    async fn fetch_snapshot(&self) -> Result<RawSnapshot, BackendError> {
        self.recorded().reads += 1;
        pass(&self.reads_open).await;
        let snapshot = {
            let recorded = self.recorded();
            if recorded.fail_reads {
                return Err(BackendError::Unavailable("reads are failing".to_string()));
            }
            recorded.snapshot.clone()
        };
        serde_json::from_value(snapshot).map_err(BackendError::Decode)
    }

    async fn probe(&self) -> Result<(), BackendError> {
        let recorded = self.recorded();
        if recorded.fail_reads {
            return Err(BackendError::Unavailable("reads are failing".to_string()));
        }
        match recorded.probe_status {
            Some(status) => Err(BackendError::Status(status)),
            None => Ok(()),
        }
    }

    fn form_view_url(&self) -> Option<String> {
        Some("memory://form/viewform".to_string())
    }
}
