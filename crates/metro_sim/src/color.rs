use serde::{Deserialize, Serialize};

/// The color shared by a passenger group and the wagons it may board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl MatchColor {
    pub const ALL: [MatchColor; 6] = [
        MatchColor::Red,
        MatchColor::Blue,
        MatchColor::Green,
        MatchColor::Yellow,
        MatchColor::Purple,
        MatchColor::Orange,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MatchColor::Red => "Red",
            MatchColor::Blue => "Blue",
            MatchColor::Green => "Green",
            MatchColor::Yellow => "Yellow",
            MatchColor::Purple => "Purple",
            MatchColor::Orange => "Orange",
        }
    }
}
