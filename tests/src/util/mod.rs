use ballot::configuration::Configuration;
use ballot::storage::MemoryStorage;
use ballot::test_util::MemoryBackend;
use ballot::Ballot;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt::format::DefaultFields, EnvFilter};

pub fn init() {
    let formatter = DefaultFields::new().delimited(",");
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .fmt_fields(formatter)
        .try_init();
}

pub struct Booth {
    pub backend: Arc<MemoryBackend>,
    pub storage: Arc<MemoryStorage>,
    pub ballot: Ballot<MemoryBackend, MemoryStorage>,
}

pub fn booth(snapshot: Value) -> Booth {
    booth_with(Configuration::default(), snapshot)
}

pub fn booth_with(conf: Configuration, snapshot: Value) -> Booth {
    let backend = Arc::new(MemoryBackend::with_snapshot(snapshot));
    let storage = Arc::new(MemoryStorage::default());
    let ballot = Ballot::new(conf, backend.clone(), storage.clone());
    Booth {
        backend,
        storage,
        ballot,
    }
}

/// Three candidates without any votes.
pub fn three_candidates() -> Value {
    json!({
        "s": {},
        "c": [
            { "id": "c1", "name": "Ann", "song": "Song A" },
            { "id": "c2", "name": "Bo", "song": "Song B" },
            { "id": "c3", "name": "Cy", "song": "Song C" },
        ]
    })
}
