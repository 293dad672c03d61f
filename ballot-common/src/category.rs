use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Ord, Hash, PartialOrd, Eq, PartialEq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Singing,
    Popularity,
    Costume,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Singing, Category::Popularity, Category::Costume];

    /// Tag written to the category field of a vote.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Singing => "SINGING",
            Category::Popularity => "POPULARITY",
            Category::Costume => "COSTUME",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
