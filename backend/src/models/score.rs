//! Score model
//!
//! Per-hole, per-player scores relative to par for a single round.
//!
//! # Critical Invariants
//!
//! 1. Scores are integers relative to par (can be negative)
//! 2. Unset holes/players are absent keys, never zero-filled
//! 3. No recorded hole number exceeds the course hole count

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Player identifier (opaque string, e.g. "p1")
pub type PlayerId = String;

/// Hole number, 1-based (1..=18 on a full course)
pub type HoleNumber = u8;

/// Hole-ordered score grid: hole number -> player -> score relative to par
///
/// A `BTreeMap` keeps hole iteration order deterministic. A hole with no
/// entry has not been played yet; a player absent from a hole's map has not
/// recorded a score for that hole.
pub type ScoreGrid = BTreeMap<HoleNumber, HashMap<PlayerId, i32>>;

/// Number of holes in each Nassau half
pub const HOLES_PER_NINE: HoleNumber = 9;

/// Standard full-course hole count
pub const FULL_COURSE_HOLES: HoleNumber = 18;

/// Errors that can occur when recording scores
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("Hole {hole} is out of range for a {hole_count}-hole course")]
    HoleOutOfRange { hole: HoleNumber, hole_count: HoleNumber },

    #[error("Player {0} is not part of this round")]
    UnknownPlayer(PlayerId),
}

/// One round of play: the players, the course size, and the score grid
///
/// The round is the ephemeral owner of scores and bet configuration; the
/// ledger and balance records are the durable system of record and outlive
/// any single round.
///
/// # Example
/// ```
/// use mrtz_betting_core_rs::Round;
///
/// let mut round = Round::new(
///     "round-1".to_string(),
///     vec!["p1".to_string(), "p2".to_string()],
///     18,
/// );
/// round.record_score(1, "p1", -1).unwrap();
/// round.record_score(1, "p2", 0).unwrap();
/// assert_eq!(round.scores()[&1]["p1"], -1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// Unique round identifier
    id: String,

    /// Players in the round, in seating order
    player_ids: Vec<PlayerId>,

    /// Number of holes on the course (typically 18)
    hole_count: HoleNumber,

    /// Recorded scores, relative to par
    scores: ScoreGrid,
}

impl Round {
    /// Create a new round with no scores recorded
    pub fn new(id: String, player_ids: Vec<PlayerId>, hole_count: HoleNumber) -> Self {
        assert!(hole_count > 0, "hole_count must be positive");
        Self {
            id,
            player_ids,
            hole_count,
            scores: ScoreGrid::new(),
        }
    }

    /// Record a score for a player on a hole (relative to par)
    ///
    /// Overwrites any previous score for that player on that hole, which is
    /// how voice-driven corrections ("change hole 3 to bogey") land here.
    pub fn record_score(
        &mut self,
        hole: HoleNumber,
        player: &str,
        score: i32,
    ) -> Result<(), ScoreError> {
        if hole == 0 || hole > self.hole_count {
            return Err(ScoreError::HoleOutOfRange {
                hole,
                hole_count: self.hole_count,
            });
        }
        if !self.player_ids.iter().any(|p| p == player) {
            return Err(ScoreError::UnknownPlayer(player.to_string()));
        }

        self.scores
            .entry(hole)
            .or_default()
            .insert(player.to_string(), score);
        Ok(())
    }

    /// Get round ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the players in the round
    pub fn players(&self) -> &[PlayerId] {
        &self.player_ids
    }

    /// Get the course hole count
    pub fn hole_count(&self) -> HoleNumber {
        self.hole_count
    }

    /// Get the score grid
    pub fn scores(&self) -> &ScoreGrid {
        &self.scores
    }

    /// All hole numbers on the course, in play order
    pub fn holes(&self) -> Vec<HoleNumber> {
        (1..=self.hole_count).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_score_rejects_out_of_range_hole() {
        let mut round = Round::new("r".to_string(), vec!["p1".to_string()], 9);
        let result = round.record_score(10, "p1", 0);
        assert_eq!(
            result,
            Err(ScoreError::HoleOutOfRange {
                hole: 10,
                hole_count: 9
            })
        );
    }

    #[test]
    fn test_record_score_rejects_unknown_player() {
        let mut round = Round::new("r".to_string(), vec!["p1".to_string()], 18);
        let result = round.record_score(1, "p2", 0);
        assert_eq!(result, Err(ScoreError::UnknownPlayer("p2".to_string())));
    }

    #[test]
    fn test_record_score_overwrites() {
        let mut round = Round::new("r".to_string(), vec!["p1".to_string()], 18);
        round.record_score(3, "p1", 1).unwrap();
        round.record_score(3, "p1", 0).unwrap();
        assert_eq!(round.scores()[&3]["p1"], 0);
    }
}
