use std::fmt;

pub type CandidateId = String;

/// Score value carried by every vote write.
pub const UNIT_SCORE: &str = "1";

/// Reserved id of the row carrying the test-mode flag.
pub const SETTING_ROW_ID: &str = "SETTING_MODE";

/// Reserved id of the row carrying the voting-open flag.
pub const STATUS_ROW_ID: &str = "VOTING_STATUS";

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct Color(&'static str);

impl Color {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub const PALETTE: [Color; 8] = [
    Color("#ef4444"),
    Color("#f97316"),
    Color("#eab308"),
    Color("#22c55e"),
    Color("#06b6d4"),
    Color("#3b82f6"),
    Color("#a855f7"),
    Color("#ec4899"),
];

/// Returns the palette entry for the candidate at `index` in a snapshot.
pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}
