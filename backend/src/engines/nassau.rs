//! Nassau engine
//!
//! Three independent low-score comparisons over the same round: front 9
//! (holes 1-9), back 9 (holes 10-18), and overall (1-18). Each segment
//! carries one stake; the strict minimum summed score wins the segment, any
//! tie means no winner for that segment.
//!
//! Missing holes contribute 0 to a participant's segment sum. This is the
//! deliberate default for rounds in progress, not an error.

use crate::models::bets::{NassauResult, Participants};
use crate::models::score::{HoleNumber, PlayerId, ScoreGrid, HOLES_PER_NINE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// One of the three Nassau comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Front9,
    Back9,
    Overall,
}

impl Segment {
    /// Hole range covered by the segment
    pub fn holes(&self) -> RangeInclusive<HoleNumber> {
        match self {
            Segment::Front9 => 1..=HOLES_PER_NINE,
            Segment::Back9 => (HOLES_PER_NINE + 1)..=(2 * HOLES_PER_NINE),
            Segment::Overall => 1..=(2 * HOLES_PER_NINE),
        }
    }

    /// All three segments, in payout order
    pub fn all() -> [Segment; 3] {
        [Segment::Front9, Segment::Back9, Segment::Overall]
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Front9 => write!(f, "front 9"),
            Segment::Back9 => write!(f, "back 9"),
            Segment::Overall => write!(f, "overall"),
        }
    }
}

/// Compute the Nassau outcome for a round
///
/// Non-participants are excluded from the comparison entirely; their
/// recorded scores never affect a segment.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use mrtz_betting_core_rs::engines::nassau::calculate_nassau;
/// use mrtz_betting_core_rs::{Participants, ScoreGrid};
///
/// let mut scores = ScoreGrid::new();
/// scores.insert(1, HashMap::from([("p1".to_string(), -1), ("p2".to_string(), 2)]));
/// scores.insert(10, HashMap::from([("p1".to_string(), 3), ("p2".to_string(), 0)]));
///
/// let players = vec!["p1".to_string(), "p2".to_string()];
/// let result = calculate_nassau(&scores, &players, &Participants::All);
///
/// assert_eq!(result.front9_winner_id.as_deref(), Some("p1"));
/// assert_eq!(result.back9_winner_id.as_deref(), Some("p2"));
/// assert_eq!(result.overall_winner_id, None); // both at +2 overall
/// ```
pub fn calculate_nassau(
    scores: &ScoreGrid,
    round_players: &[PlayerId],
    participants: &Participants,
) -> NassauResult {
    let field = participants.resolve(round_players);

    let front9_scores = segment_totals(scores, &field, Segment::Front9);
    let back9_scores = segment_totals(scores, &field, Segment::Back9);
    let overall_scores = segment_totals(scores, &field, Segment::Overall);

    NassauResult {
        front9_winner_id: segment_winner(&front9_scores),
        back9_winner_id: segment_winner(&back9_scores),
        overall_winner_id: segment_winner(&overall_scores),
        front9_scores,
        back9_scores,
        overall_scores,
    }
}

/// Sum each field player's relative score over a segment's holes
///
/// Every field player gets an entry; missing holes contribute 0.
pub fn segment_totals(
    scores: &ScoreGrid,
    field: &[PlayerId],
    segment: Segment,
) -> HashMap<PlayerId, i32> {
    let mut totals: HashMap<PlayerId, i32> =
        field.iter().map(|p| (p.clone(), 0)).collect();

    for (_, hole_scores) in scores.range(segment.holes()) {
        for player in field {
            if let Some(score) = hole_scores.get(player) {
                *totals.entry(player.clone()).or_insert(0) += score;
            }
        }
    }

    totals
}

/// The strict-minimum winner of a segment, if any
///
/// Returns `None` when two or more players share the minimum (or the totals
/// map is empty).
pub fn segment_winner(totals: &HashMap<PlayerId, i32>) -> Option<PlayerId> {
    let min = totals.values().min().copied()?;
    let mut at_min = totals.iter().filter(|(_, s)| **s == min);
    let first = at_min.next().map(|(p, _)| p.clone());
    if at_min.next().is_some() {
        None
    } else {
        first
    }
}

/// All players tied at a segment's minimum, sorted
///
/// Used by push resolution: when a segment has no winner, the stake is
/// divided equally among these players. Computed lazily at round end, never
/// during live play.
pub fn segment_tied_players(totals: &HashMap<PlayerId, i32>) -> Vec<PlayerId> {
    let Some(min) = totals.values().min().copied() else {
        return Vec::new();
    };

    let mut tied: Vec<PlayerId> = totals
        .iter()
        .filter(|(_, s)| **s == min)
        .map(|(p, _)| p.clone())
        .collect();
    tied.sort();
    tied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_hole_ranges() {
        assert_eq!(Segment::Front9.holes(), 1..=9);
        assert_eq!(Segment::Back9.holes(), 10..=18);
        assert_eq!(Segment::Overall.holes(), 1..=18);
    }

    #[test]
    fn test_segment_winner_requires_strict_minimum() {
        let totals = HashMap::from([
            ("p1".to_string(), 2),
            ("p2".to_string(), 2),
            ("p3".to_string(), 5),
        ]);
        assert_eq!(segment_winner(&totals), None);
        assert_eq!(
            segment_tied_players(&totals),
            vec!["p1".to_string(), "p2".to_string()]
        );
    }

    #[test]
    fn test_empty_field_has_no_winner() {
        let totals: HashMap<PlayerId, i32> = HashMap::new();
        assert_eq!(segment_winner(&totals), None);
        assert!(segment_tied_players(&totals).is_empty());
    }
}
