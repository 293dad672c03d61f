pub mod error;

use self::error::ConfigurationError;
use ballot_client::configuration::BackendConfiguration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const QUEUE_MAX_CONCURRENT: usize = 1;
const QUEUE_COMPLETION_DELAY_MILLIS: u64 = 0;
const SYNC_INTERVAL_MILLIS: u64 = 3000;
const SYNC_ERROR_THRESHOLD: u32 = 3;
const SYNC_BACKOFF_EVERY: u32 = 2;
const ADMIN_RESYNC_DELAY_MILLIS: u64 = 1200;
const LOAD_PACE_EVERY: usize = 20;
const LOAD_PACE_MILLIS: u64 = 20;
const STORAGE_DIR: &str = ".ballot";
const STORAGE_KEY: &str = "spring_gala_has_voted_v2";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Configuration {
    #[serde(default)]
    pub queue: QueueConfiguration,
    #[serde(default)]
    pub sync: SyncConfiguration,
    #[serde(default)]
    pub admin: AdminConfiguration,
    #[serde(default)]
    pub load: LoadConfiguration,
    #[serde(default)]
    pub storage: StorageConfiguration,
}

/// Contents of a configuration file: the backend endpoints plus the
/// component settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Settings {
    pub backend: BackendConfiguration,
    #[serde(flatten)]
    pub ballot: Configuration,
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Read(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigurationError::Parse(path.to_path_buf(), e))
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfiguration {
    /// Number of writes allowed in flight at once. 1 delivers strictly in
    /// order; higher values trade ordering for throughput.
    pub max_concurrent: usize,
    /// Pause held by a slot after its task completes.
    pub completion_delay_millis: u64,
}

impl Default for QueueConfiguration {
    fn default() -> Self {
        Self {
            max_concurrent: QUEUE_MAX_CONCURRENT,
            completion_delay_millis: QUEUE_COMPLETION_DELAY_MILLIS,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfiguration {
    pub interval_millis: u64,
    /// Consecutive failed reads after which polls start being skipped.
    pub error_threshold: u32,
    /// While backing off, only every n-th tick issues a read.
    pub backoff_every: u32,
}

impl Default for SyncConfiguration {
    fn default() -> Self {
        Self {
            interval_millis: SYNC_INTERVAL_MILLIS,
            error_threshold: SYNC_ERROR_THRESHOLD,
            backoff_every: SYNC_BACKOFF_EVERY,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfiguration {
    pub resync_delay_millis: u64,
}

impl Default for AdminConfiguration {
    fn default() -> Self {
        Self {
            resync_delay_millis: ADMIN_RESYNC_DELAY_MILLIS,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadConfiguration {
    /// A `pace_millis` pause follows every `pace_every`-th dispatch, so the
    /// defaults pause after the 20th, 40th, ... synthetic user. 0 disables
    /// pacing.
    pub pace_every: usize,
    pub pace_millis: u64,
}

impl Default for LoadConfiguration {
    fn default() -> Self {
        Self {
            pace_every: LOAD_PACE_EVERY,
            pace_millis: LOAD_PACE_MILLIS,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfiguration {
    pub dir: PathBuf,
    pub key: String,
}

impl Default for StorageConfiguration {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(STORAGE_DIR),
            key: STORAGE_KEY.to_string(),
        }
    }
}
