use serde::{Deserialize, Serialize};

/// Runtime options for a game. Rules themselves are not configurable; these
/// only decide how results are declared and how transcripts are written.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    /// End the game as a draw on insufficient material. Off by default: the
    /// status flag is then only advisory and play may continue.
    pub auto_draw_insufficient_material: bool,
    /// Append ` e.p.` to en-passant captures in exported move lists.
    pub annotate_en_passant: bool,
    /// Prefix exported move lists with a title, date and move count.
    pub export_header: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub fn new() -> Self {
        GameConfig {
            auto_draw_insufficient_material: false,
            annotate_en_passant: true,
            export_header: false,
        }
    }
}
