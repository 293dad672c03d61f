use crate::category::Category;
use crate::types::{CandidateId, Color};

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct Scores {
    pub singing: u64,
    pub popularity: u64,
    pub costume: u64,
}

impl Scores {
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Singing => self.singing,
            Category::Popularity => self.popularity,
            Category::Costume => self.costume,
        }
    }
}

/// A candidate as presented to consumers of the store.
///
/// Scores are only ever taken from remote aggregates; nothing on the client
/// increments them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub song: String,
    pub image: String,
    pub video_link: String,
    pub scores: Scores,
    pub total_score: u64,
    pub vote_count: u64,
    pub color: Color,
}

impl Candidate {
    pub fn score(&self, category: Category) -> u64 {
        self.scores.get(category)
    }
}

/// A single write against the vote form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vote {
    pub candidate_id: CandidateId,
    pub category: Category,
}

impl Vote {
    pub fn new<I: Into<CandidateId>>(candidate_id: I, category: Category) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            category,
        }
    }
}
