//! Wire shape of the read endpoint and its normalized form.
//!
//! The read endpoint answers with
//! `{ "s": { <id>: { s?, p?, c?, total?, t?, count? } }, "c": [ <row> ] }`.
//! Numbers may arrive as floats or strings and ids may arrive as numbers, so
//! the raw shape keeps loosely typed values and [`Snapshot::from`] turns it
//! into one canonical record before anything else looks at it.

use crate::types::{CandidateId, SETTING_ROW_ID, STATUS_ROW_ID};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone, Default, Debug, Deserialize)]
pub struct RawSnapshot {
    /// Entries are kept as raw values; one that is not an object reads as
    /// all-zero stats instead of failing the whole response.
    #[serde(default, rename = "s")]
    pub stats: Option<HashMap<String, Value>>,
    #[serde(default, rename = "c")]
    pub config: Option<Vec<RawConfigRow>>,
}

#[derive(Clone, Default, Debug, Deserialize)]
pub struct RawStats {
    #[serde(default)]
    pub singing: Option<Value>,
    #[serde(default)]
    pub s: Option<Value>,
    #[serde(default)]
    pub popularity: Option<Value>,
    #[serde(default)]
    pub p: Option<Value>,
    #[serde(default)]
    pub costume: Option<Value>,
    #[serde(default)]
    pub c: Option<Value>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub t: Option<Value>,
    #[serde(default)]
    pub count: Option<Value>,
}

#[derive(Clone, Default, Debug, Deserialize)]
pub struct RawConfigRow {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub song: Option<Value>,
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default, rename = "videoLink")]
    pub video_link: Option<Value>,
}

/// Canonical per-candidate statistics.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct Stats {
    pub singing: u64,
    pub popularity: u64,
    pub costume: u64,
    pub total: u64,
    pub count: u64,
}

impl RawStats {
    fn lenient(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => RawStats::default(),
        }
    }
}

impl From<&RawStats> for Stats {
    /// The long-form key wins over its short alias. Singing falls back to the
    /// generic total when neither is present; the other categories fall back
    /// to zero.
    fn from(raw: &RawStats) -> Self {
        let total = count(&raw.total).or_else(|| count(&raw.t)).unwrap_or(0);
        Stats {
            singing: count(&raw.singing)
                .or_else(|| count(&raw.s))
                .unwrap_or(total),
            popularity: count(&raw.popularity)
                .or_else(|| count(&raw.p))
                .unwrap_or(0),
            costume: count(&raw.costume).or_else(|| count(&raw.c)).unwrap_or(0),
            total,
            count: count(&raw.count).unwrap_or(0),
        }
    }
}

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct CandidateRow {
    pub id: CandidateId,
    pub name: String,
    pub song: String,
    pub image: String,
    pub video_link: String,
}

/// A read response with sentinel rows already separated from candidates.
///
/// `test_mode` and `voting_open` are `None` when the corresponding sentinel
/// row was absent.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Snapshot {
    pub test_mode: Option<bool>,
    pub voting_open: Option<bool>,
    pub candidates: Vec<CandidateRow>,
    pub stats: HashMap<CandidateId, Stats>,
}

impl Snapshot {
    pub fn stats(&self, id: &str) -> Stats {
        self.stats.get(id).copied().unwrap_or_default()
    }
}

impl From<RawSnapshot> for Snapshot {
    fn from(raw: RawSnapshot) -> Self {
        let mut snapshot = Snapshot::default();

        for row in raw.config.unwrap_or_default() {
            let id = text(&row.id).trim().to_string();
            if id.is_empty() {
                continue;
            }
            let name = text(&row.name).trim().to_string();

            match id.as_str() {
                SETTING_ROW_ID => snapshot.test_mode = Some(name == "TEST"),
                STATUS_ROW_ID => snapshot.voting_open = Some(name != "CLOSED"),
                _ => snapshot.candidates.push(CandidateRow {
                    id,
                    name: if name.is_empty() {
                        "Unknown".to_string()
                    } else {
                        name
                    },
                    song: text(&row.song),
                    image: text(&row.image),
                    video_link: text(&row.video_link),
                }),
            }
        }

        snapshot.stats = raw
            .stats
            .unwrap_or_default()
            .into_iter()
            .map(|(id, value)| (id, Stats::from(&RawStats::lenient(value))))
            .collect();

        snapshot
    }
}

fn text(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn count(value: &Option<Value>) -> Option<u64> {
    let clamp = |f: f64| {
        if f.is_finite() && f > 0.0 {
            f.round() as u64
        } else {
            0
        }
    };
    match value.as_ref()? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(clamp)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(clamp),
        _ => None,
    }
}
