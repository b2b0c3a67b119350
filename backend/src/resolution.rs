//! End-of-round tie resolution
//!
//! When a round ends with an unresolved skins carry-over pot or tied nassau
//! segments, exactly one policy, chosen by the caller, applies uniformly to
//! all unresolved items of that bet type:
//!
//! - **Exclude**: void them; no money moves, nothing is carried forward
//! - **Push**: split the outstanding stake equally among the tied players
//! - **Playoff**: the caller names a winner who takes the pot outright
//!   (skins only; nassau playoff is deliberately unsupported)
//! - **Payout**: pay decided items as-is; unresolved items are deferred to
//!   the carry-over tracker unless `settle_today` is set, in which case they
//!   are voided
//! - **Default**: nothing is decided; unresolved items are reported as
//!   deferred, mirroring the raw engine output
//!
//! Resolution only touches *unresolved* items. Decided holes and segments
//! are paid by the aggregator; crediting them here would double-count.

use crate::engines::nassau::{segment_tied_players, Segment};
use crate::engines::skins::tied_at_minimum;
use crate::models::bets::{NassauResult, SkinResult};
use crate::models::score::{HoleNumber, PlayerId, ScoreGrid};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Tie-resolution policy for a round's ending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundResolution {
    /// Nothing decided: unresolved items pass through as deferred
    Default,

    /// Void unresolved items entirely
    Exclude,

    /// Split the outstanding stake equally among tied players
    Push,

    /// Pay the outstanding pot to a caller-assigned winner per hole
    Playoff { winners: HashMap<HoleNumber, PlayerId> },

    /// Settle as-is; defer the unresolved remainder unless `settle_today`
    Payout { settle_today: bool },
}

/// Errors that can occur while resolving end-of-round ties
#[derive(Debug, Error, PartialEq)]
pub enum ResolutionError {
    #[error("Playoff resolution is missing a winner for hole {hole_number}")]
    MissingPlayoffWinner { hole_number: HoleNumber },

    #[error("Playoff winner {player} for hole {hole_number} is not a bet participant")]
    PlayoffWinnerNotParticipant {
        hole_number: HoleNumber,
        player: PlayerId,
    },

    #[error("Nassau ties cannot be playoff-resolved; use exclude or push")]
    NassauPlayoffUnsupported,
}

/// An unresolved skins pot left at round end
///
/// `holes` lists the trailing tied holes; `accumulated_value` is the full
/// outstanding pot (the last tied hole's value, which already folds in every
/// earlier tie since the last decisive hole).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinsCarryOver {
    pub holes: Vec<HoleNumber>,
    pub accumulated_value: f64,
}

/// Outcome of applying a policy to the skins results
#[derive(Debug, Clone, PartialEq)]
pub struct SkinsResolution {
    /// Extra credits awarded by the policy (push splits, playoff pots)
    pub credits: HashMap<PlayerId, f64>,

    /// Outstanding pot to hand to the carry-over tracker, if any
    pub deferred: Option<SkinsCarryOver>,
}

/// A nassau segment left tied at round end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NassauSegmentTie {
    pub segment: Segment,
    pub tied_players: Vec<PlayerId>,
}

/// Outcome of applying a policy to the nassau result
#[derive(Debug, Clone, PartialEq)]
pub struct NassauResolution {
    /// Extra credits awarded by the policy (push splits)
    pub credits: HashMap<PlayerId, f64>,

    /// Tied segments to hand to the carry-over tracker
    pub deferred: Vec<NassauSegmentTie>,
}

/// Apply an end-of-round policy to raw skins results
///
/// The unresolved pot, if any, is the trailing run of carry-over holes: a
/// tie followed by a later decisive hole was absorbed into that hole's
/// payout and is already settled. Each carry-over entry's value accumulates
/// its predecessors, so the run's last entry carries the whole outstanding
/// pot and is the single item the policy acts on.
pub fn resolve_skins(
    results: &[SkinResult],
    policy: &RoundResolution,
    scores: &ScoreGrid,
    field: &[PlayerId],
) -> Result<SkinsResolution, ResolutionError> {
    let mut credits: HashMap<PlayerId, f64> = HashMap::new();

    let Some(run) = trailing_carry_over_run(results) else {
        // Every hole was decided; nothing for any policy to do
        return Ok(SkinsResolution {
            credits,
            deferred: None,
        });
    };

    let last_hole = *run.holes.last().unwrap_or(&0);

    let deferred = match policy {
        RoundResolution::Exclude | RoundResolution::Payout { settle_today: true } => None,

        RoundResolution::Push => {
            let tied = tied_at_minimum(scores, last_hole, field);
            if !tied.is_empty() {
                let divided = run.accumulated_value / tied.len() as f64;
                for player in tied {
                    *credits.entry(player).or_insert(0.0) += divided;
                }
            }
            None
        }

        RoundResolution::Playoff { winners } => {
            let winner = winners
                .get(&last_hole)
                .ok_or(ResolutionError::MissingPlayoffWinner {
                    hole_number: last_hole,
                })?;
            if !field.iter().any(|p| p == winner) {
                return Err(ResolutionError::PlayoffWinnerNotParticipant {
                    hole_number: last_hole,
                    player: winner.clone(),
                });
            }
            *credits.entry(winner.clone()).or_insert(0.0) += run.accumulated_value;
            None
        }

        RoundResolution::Default | RoundResolution::Payout { settle_today: false } => Some(run),
    };

    Ok(SkinsResolution { credits, deferred })
}

/// Apply an end-of-round policy to a nassau result
///
/// Ties are identified lazily from the result's segment score maps. Playoff
/// is not a supported nassau resolution; callers get
/// [`ResolutionError::NassauPlayoffUnsupported`] rather than invented
/// semantics.
pub fn resolve_nassau(
    result: &NassauResult,
    policy: &RoundResolution,
    nassau_value: f64,
) -> Result<NassauResolution, ResolutionError> {
    let mut credits: HashMap<PlayerId, f64> = HashMap::new();
    let mut deferred = Vec::new();

    let segments = [
        (Segment::Front9, &result.front9_winner_id, &result.front9_scores),
        (Segment::Back9, &result.back9_winner_id, &result.back9_scores),
        (Segment::Overall, &result.overall_winner_id, &result.overall_scores),
    ];

    for (segment, winner, totals) in segments {
        if winner.is_some() {
            continue; // Decided segments are paid by the aggregator
        }
        let tied = segment_tied_players(totals);
        if tied.is_empty() {
            continue; // Empty field: nothing at stake
        }

        match policy {
            RoundResolution::Exclude | RoundResolution::Payout { settle_today: true } => {}

            RoundResolution::Push => {
                let divided = nassau_value / tied.len() as f64;
                for player in tied {
                    *credits.entry(player).or_insert(0.0) += divided;
                }
            }

            RoundResolution::Playoff { .. } => {
                return Err(ResolutionError::NassauPlayoffUnsupported);
            }

            RoundResolution::Default | RoundResolution::Payout { settle_today: false } => {
                deferred.push(NassauSegmentTie {
                    segment,
                    tied_players: tied,
                });
            }
        }
    }

    Ok(NassauResolution { credits, deferred })
}

/// The trailing run of carry-over holes, if the round ended on a tie
fn trailing_carry_over_run(results: &[SkinResult]) -> Option<SkinsCarryOver> {
    let last = results.last()?;
    if !last.is_carry_over {
        return None;
    }

    let holes: Vec<HoleNumber> = results
        .iter()
        .rev()
        .take_while(|r| r.is_carry_over)
        .map(|r| r.hole_number)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    Some(SkinsCarryOver {
        holes,
        accumulated_value: last.value,
    })
}
