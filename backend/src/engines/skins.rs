//! Skins engine
//!
//! Per-hole winner-take-all with carry-over on ties. A running pot starts at
//! the base stake; a hole with a unique lowest score pays the accumulated pot
//! and resets it, a tied hole rolls the pot forward and adds one more stake.
//!
//! # Critical Invariants
//!
//! 1. Carry-over values compound linearly: after k consecutive ties the next
//!    decisive hole pays `skin_value * (k + 1)`
//! 2. A hole with zero recorded participant scores is skipped entirely (not
//!    emitted, pot unchanged)
//! 3. A tie requires at least two scored entries at the minimum; a lone
//!    scored player wins outright

use crate::models::bets::{Participants, SkinResult};
use crate::models::score::{HoleNumber, PlayerId, ScoreGrid};

/// Compute per-hole skins outcomes in hole order
///
/// Holes with no recorded participant scores are absent from the output, so
/// the result may be shorter than `holes`.
///
/// # Arguments
/// * `scores` - the round's score grid
/// * `holes` - hole numbers to evaluate, in play order
/// * `skin_value` - base stake per hole (precondition: positive; validated
///   at the configuration boundary, not here)
/// * `participants` - who is in on the bet
/// * `round_players` - all players in the round (participant resolution)
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use mrtz_betting_core_rs::engines::skins::calculate_skins;
/// use mrtz_betting_core_rs::{Participants, ScoreGrid};
///
/// let mut scores = ScoreGrid::new();
/// scores.insert(1, HashMap::from([("p1".to_string(), 3), ("p2".to_string(), 4)]));
///
/// let players = vec!["p1".to_string(), "p2".to_string()];
/// let results = calculate_skins(&scores, &[1], 1.0, &Participants::All, &players);
///
/// assert_eq!(results[0].winner_id.as_deref(), Some("p1"));
/// assert_eq!(results[0].value, 1.0);
/// assert!(!results[0].is_carry_over);
/// ```
pub fn calculate_skins(
    scores: &ScoreGrid,
    holes: &[HoleNumber],
    skin_value: f64,
    participants: &Participants,
    round_players: &[PlayerId],
) -> Vec<SkinResult> {
    let field = participants.resolve(round_players);
    let mut results = Vec::new();
    let mut current_pot = skin_value;

    for &hole in holes {
        let scored = hole_entries(scores, hole, &field);
        if scored.is_empty() {
            // Hole not played yet: not a tie, not a win
            continue;
        }

        let min_score = scored.iter().map(|(_, s)| *s).min().unwrap_or(0);
        let mut at_min = scored.iter().filter(|(_, s)| *s == min_score);
        let first = at_min.next().map(|(p, _)| p.clone());
        let tied = at_min.next().is_some();

        if tied {
            results.push(SkinResult {
                hole_number: hole,
                winner_id: None,
                value: current_pot,
                is_carry_over: true,
            });
            current_pot += skin_value;
        } else {
            results.push(SkinResult {
                hole_number: hole,
                winner_id: first,
                value: current_pot,
                is_carry_over: false,
            });
            current_pot = skin_value;
        }
    }

    results
}

/// Players tied for the lowest score on a hole, among the given field
///
/// Used by push resolution to split an unresolved pot. Returns an empty list
/// for an unscored hole. The list is sorted for deterministic payouts.
pub fn tied_at_minimum(scores: &ScoreGrid, hole: HoleNumber, field: &[PlayerId]) -> Vec<PlayerId> {
    let scored = hole_entries(scores, hole, field);
    let Some(min_score) = scored.iter().map(|(_, s)| *s).min() else {
        return Vec::new();
    };

    let mut tied: Vec<PlayerId> = scored
        .into_iter()
        .filter(|(_, s)| *s == min_score)
        .map(|(p, _)| p)
        .collect();
    tied.sort();
    tied
}

/// Recorded (player, score) pairs for one hole, restricted to the field
fn hole_entries(scores: &ScoreGrid, hole: HoleNumber, field: &[PlayerId]) -> Vec<(PlayerId, i32)> {
    let Some(hole_scores) = scores.get(&hole) else {
        return Vec::new();
    };

    field
        .iter()
        .filter_map(|p| hole_scores.get(p).map(|s| (p.clone(), *s)))
        .collect()
}
