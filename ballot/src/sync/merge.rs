use crate::store::StoreState;
use ballot_common::candidate::{Candidate, Scores};
use ballot_common::snapshot::Snapshot;
use ballot_common::types::{palette_color, CandidateId, Color};
use std::collections::HashMap;

/// Folds remote snapshots into the store state.
///
/// Remembers the color handed to every id it has seen, so a candidate keeps
/// its color for the lifetime of the engine.
#[derive(Default)]
pub(crate) struct Merger {
    colors: HashMap<CandidateId, Color>,
}

impl Merger {
    /// Applies `snapshot` to `state` and returns whether anything observable
    /// changed.
    pub fn merge(&mut self, state: &mut StoreState, snapshot: Snapshot) -> bool {
        let mut changed = false;

        state.setting_row_seen = snapshot.test_mode.is_some();
        state.status_row_seen = snapshot.voting_open.is_some();

        // An absent sentinel leaves the flag where it was.
        if let Some(test_mode) = snapshot.test_mode {
            changed |= replace(&mut state.test_mode, test_mode);
        }
        if let Some(voting_open) = snapshot.voting_open {
            changed |= replace(&mut state.voting_open, voting_open);
        }

        let candidates = snapshot
            .candidates
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let stats = snapshot.stats(&row.id);
                let color = *self
                    .colors
                    .entry(row.id.clone())
                    .or_insert_with(|| palette_color(index));
                Candidate {
                    id: row.id.clone(),
                    name: row.name.clone(),
                    song: row.song.clone(),
                    image: row.image.clone(),
                    video_link: row.video_link.clone(),
                    scores: Scores {
                        singing: stats.singing,
                        popularity: stats.popularity,
                        costume: stats.costume,
                    },
                    total_score: stats.total,
                    vote_count: stats.count,
                    color,
                }
            })
            .collect::<Vec<_>>();

        changed |= replace(&mut state.candidates, candidates);
        changed
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
