use crate::category::Category;
use crate::types::CandidateId;

/// One selected candidate (or none) per award category.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Selections {
    singing: Option<CandidateId>,
    popularity: Option<CandidateId>,
    costume: Option<CandidateId>,
}

impl Selections {
    /// Returns selections with every category filled.
    pub fn new<A, B, C>(singing: A, popularity: B, costume: C) -> Self
    where
        A: Into<CandidateId>,
        B: Into<CandidateId>,
        C: Into<CandidateId>,
    {
        Self {
            singing: Some(singing.into()),
            popularity: Some(popularity.into()),
            costume: Some(costume.into()),
        }
    }

    pub fn get(&self, category: Category) -> Option<&str> {
        self.slot(category).as_deref()
    }

    pub fn select<I: Into<CandidateId>>(&mut self, category: Category, id: I) {
        *self.slot_mut(category) = Some(id.into());
    }

    pub fn clear(&mut self, category: Category) {
        *self.slot_mut(category) = None;
    }

    /// Returns the first category without a selection.
    pub fn missing(&self) -> Option<Category> {
        Category::ALL
            .iter()
            .copied()
            .find(|&category| self.slot(category).is_none())
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_none()
    }

    fn slot(&self, category: Category) -> &Option<CandidateId> {
        match category {
            Category::Singing => &self.singing,
            Category::Popularity => &self.popularity,
            Category::Costume => &self.costume,
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<CandidateId> {
        match category {
            Category::Singing => &mut self.singing,
            Category::Popularity => &mut self.popularity,
            Category::Costume => &mut self.costume,
        }
    }
}
