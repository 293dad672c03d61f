use crate::types::{CandidateId, SETTING_ROW_ID, STATUS_ROW_ID};
use serde::Serialize;

/// A config row as written to the script endpoint.
#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRow {
    pub id: CandidateId,
    pub name: String,
    pub song: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_link: Option<String>,
}

impl ConfigRow {
    pub fn test_mode(enabled: bool) -> Self {
        Self {
            id: SETTING_ROW_ID.to_string(),
            name: if enabled { "TEST" } else { "OFFICIAL" }.to_string(),
            song: "SYSTEM_CONFIG".to_string(),
            ..Default::default()
        }
    }

    pub fn voting_status(open: bool) -> Self {
        Self {
            id: STATUS_ROW_ID.to_string(),
            name: if open { "OPEN" } else { "CLOSED" }.to_string(),
            song: "SYSTEM_STATUS".to_string(),
            ..Default::default()
        }
    }
}

/// Body of a POST against the script endpoint:
/// `{ "action": ..., "payload": ... }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigMutation {
    Add(ConfigRow),
    Update(ConfigRow),
    Delete { id: CandidateId },
    ResetScores {},
}

impl ConfigMutation {
    pub fn action(&self) -> &'static str {
        match self {
            ConfigMutation::Add(_) => "ADD",
            ConfigMutation::Update(_) => "UPDATE",
            ConfigMutation::Delete { .. } => "DELETE",
            ConfigMutation::ResetScores {} => "RESET_SCORES",
        }
    }
}
