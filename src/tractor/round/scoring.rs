//! End of round scoring.

use serde::{Deserialize, Serialize};

/// The outcome of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    /// Points left in the bottom pile, before any multiplier.
    pub points_in_bottom_pile: u32,
    /// Points won by the defenders, including the bottom pile bonus.
    pub total_points_won: u32,
    /// Whether the throne passes to the defenders.
    pub throne_cedes: bool,
    /// Ranks climbed by the throne's team.
    pub throne_rank_delta: u8,
    /// Ranks climbed by the defenders.
    pub opposing_rank_delta: u8,
}

impl RoundSummary {
    /// Scores a round from the points won by the defenders.
    pub fn new(points_in_bottom_pile: u32, total_points_won: u32) -> Self {
        let (throne_cedes, throne_rank_delta, opposing_rank_delta) = match total_points_won {
            0 => (false, 3, 0),
            1..=39 => (false, 2, 0),
            40..=79 => (false, 1, 0),
            80..=119 => (true, 0, 0),
            120..=159 => (true, 0, 1),
            160..=199 => (true, 0, 2),
            _ => (true, 0, 3),
        };
        Self {
            points_in_bottom_pile,
            total_points_won,
            throne_cedes,
            throne_rank_delta,
            opposing_rank_delta,
        }
    }
}
