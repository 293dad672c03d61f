//! Admin mutation channel.
//!
//! Every mutation is a single write whose response is not inspected,
//! followed by a delayed resync that pulls the authoritative state back in.
//! The flag setters also apply their value to the store right away; the next
//! merge overwrites it if the backend disagrees.

use crate::configuration::AdminConfiguration;
use crate::storage::{error::StorageError, Storage};
use crate::store::Store;
use crate::sync::SyncEngine;
use ballot_client::{error::BackendError, Backend};
use ballot_common::mutation::{ConfigMutation, ConfigRow};
use ballot_common::types::CandidateId;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::{self, Duration};

/// Input of [`Admin::add_candidate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewCandidate {
    /// Assigned as `c<unix-millis>` when absent.
    pub id: Option<CandidateId>,
    pub name: String,
    pub song: String,
    pub image: Option<String>,
    pub video_link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionReport {
    pub ok: bool,
    pub message: String,
}

pub struct Admin<B, S> {
    conf: AdminConfiguration,
    backend: Arc<B>,
    store: Arc<Store<S>>,
    storage: Arc<S>,
    sync: SyncEngine<B, S>,
}

impl<B, S> Admin<B, S>
where
    B: Backend + 'static,
    S: Storage + 'static,
{
    pub fn new(
        conf: AdminConfiguration,
        backend: Arc<B>,
        store: Arc<Store<S>>,
        storage: Arc<S>,
        sync: SyncEngine<B, S>,
    ) -> Self {
        Self {
            conf,
            backend,
            store,
            storage,
            sync,
        }
    }

    /// Returns the id the candidate was written under.
    pub async fn add_candidate(&self, candidate: NewCandidate) -> Result<CandidateId, BackendError> {
        let id = match candidate.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => generate_id(),
        };
        let row = ConfigRow {
            id: id.clone(),
            name: candidate.name.trim().to_string(),
            song: candidate.song,
            image: candidate.image,
            video_link: candidate.video_link,
        };
        self.mutate(ConfigMutation::Add(row)).await?;
        Ok(id)
    }

    pub async fn delete_candidate(&self, id: &str) -> Result<(), BackendError> {
        self.mutate(ConfigMutation::Delete { id: id.to_string() })
            .await
    }

    pub async fn reset_scores(&self) -> Result<(), BackendError> {
        self.mutate(ConfigMutation::ResetScores {}).await
    }

    pub async fn set_test_mode(&self, enabled: bool) -> Result<(), BackendError> {
        let row = ConfigRow::test_mode(enabled);
        let seen = self.store.read(|state| state.setting_row_seen);
        let res = self.mutate(upsert(seen, row)).await;
        self.store.update(|state| state.test_mode = enabled);
        self.store.notify();
        res
    }

    pub async fn set_voting_open(&self, open: bool) -> Result<(), BackendError> {
        let row = ConfigRow::voting_status(open);
        let seen = self.store.read(|state| state.status_row_seen);
        let res = self.mutate(upsert(seen, row)).await;
        self.store.update(|state| state.voting_open = open);
        self.store.notify();
        res
    }

    /// Forgets that this device voted.
    pub fn clear_history(&self) -> Result<(), StorageError> {
        let res = self.storage.clear_voted();
        self.store.notify();
        res
    }

    pub async fn check_connection(&self) -> ConnectionReport {
        match self.backend.probe().await {
            Ok(()) => ConnectionReport {
                ok: true,
                message: "connection OK; the read endpoint responded".to_string(),
            },
            Err(BackendError::Status(status)) => ConnectionReport {
                ok: false,
                message: format!("server returned status {}", status),
            },
            Err(e) => ConnectionReport {
                ok: false,
                message: format!("connection failed: {}", e),
            },
        }
    }

    pub fn form_view_url(&self) -> Option<String> {
        self.backend.form_view_url()
    }

    // The resync is scheduled whether or not the write went through.
    async fn mutate(&self, mutation: ConfigMutation) -> Result<(), BackendError> {
        let action = mutation.action();
        let res = self.backend.send_config(&mutation).await;
        match &res {
            Ok(()) => tracing::debug!(action, "config mutation sent"),
            Err(e) => tracing::warn!(action, "config mutation failed: {}", e),
        }
        self.schedule_resync();
        res
    }

    fn schedule_resync(&self) {
        let sync = self.sync.clone();
        let delay = Duration::from_millis(self.conf.resync_delay_millis);
        tokio::spawn(async move {
            time::sleep(delay).await;
            let changed = sync.refresh().await;
            tracing::debug!(changed, "resync after config mutation");
        });
    }
}

fn upsert(seen: bool, row: ConfigRow) -> ConfigMutation {
    if seen {
        ConfigMutation::Update(row)
    } else {
        ConfigMutation::Add(row)
    }
}

fn generate_id() -> CandidateId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("c{}", millis)
}
