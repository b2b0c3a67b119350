//! MRTZ aggregator
//!
//! Combines skins, nassau, and fundatory outcomes into one signed
//! amount-per-player map for a round, ready for the ledger.
//!
//! # Payout model
//!
//! - Skins winners are **credited only**: the pot is funded outside the
//!   ledger (each player stakes before play), so no loser debit is booked.
//!   As a consequence the output need not sum to zero when skins is active.
//! - Nassau is symmetric: each decided segment credits the winner the stake
//!   and debits every other participant the stake, independently for the
//!   front 9, back 9, and overall.
//! - Fundatory nets are added directly (already zero-sum per bet).
//!
//! No zero-sum normalization is performed here; the settlement engine
//! surfaces any residual imbalance instead of masking it.

use crate::engines::fundatory::calculate_fundatory;
use crate::engines::nassau::calculate_nassau;
use crate::engines::skins::calculate_skins;
use crate::models::bets::{ActiveBets, FundatoryBet};
use crate::models::score::{PlayerId, Round};
use std::collections::HashMap;

/// Compute the round's signed MRTZ net per player
///
/// Every round player is present in the output, with 0 if nothing touched
/// them. Unresolved skins holes (carry-overs) contribute nothing here; the
/// resolution layer decides their fate at round end.
///
/// # Example
/// ```
/// use mrtz_betting_core_rs::aggregator::calculate_round_mrtz;
/// use mrtz_betting_core_rs::{ActiveBets, Participants, Round, SkinsConfig};
///
/// let mut round = Round::new(
///     "r1".to_string(),
///     vec!["p1".to_string(), "p2".to_string()],
///     18,
/// );
/// round.record_score(1, "p1", 2).unwrap();
/// round.record_score(1, "p2", 3).unwrap();
///
/// let mut skins = SkinsConfig::new(1.0, Participants::All).unwrap();
/// skins.start();
/// let bets = ActiveBets { skins: Some(skins), nassau: None };
///
/// let net = calculate_round_mrtz(&round, &bets, &[]);
/// assert_eq!(net["p1"], 1.0);
/// assert_eq!(net["p2"], 0.0); // credit-only skins model
/// ```
pub fn calculate_round_mrtz(
    round: &Round,
    active_bets: &ActiveBets,
    fundatory_bets: &[FundatoryBet],
) -> HashMap<PlayerId, f64> {
    let mut net: HashMap<PlayerId, f64> = round
        .players()
        .iter()
        .map(|p| (p.clone(), 0.0))
        .collect();

    if let Some(skins) = active_bets.skins.as_ref().filter(|s| s.started()) {
        let holes = round.holes();
        let results = calculate_skins(
            round.scores(),
            &holes,
            skins.value(),
            skins.participants(),
            round.players(),
        );
        for result in results {
            if let Some(winner) = result.winner_id {
                *net.entry(winner).or_insert(0.0) += result.value;
            }
        }
    }

    if let Some(nassau) = active_bets.nassau.as_ref().filter(|n| n.started()) {
        let result = calculate_nassau(round.scores(), round.players(), nassau.participants());
        let field = nassau.participants().resolve(round.players());

        let segment_winners = [
            &result.front9_winner_id,
            &result.back9_winner_id,
            &result.overall_winner_id,
        ];
        for winner in segment_winners.into_iter().flatten() {
            *net.entry(winner.clone()).or_insert(0.0) += nassau.value();
            for player in &field {
                if player != winner {
                    *net.entry(player.clone()).or_insert(0.0) -= nassau.value();
                }
            }
        }
    }

    for (player, amount) in calculate_fundatory(fundatory_bets) {
        *net.entry(player).or_insert(0.0) += amount;
    }

    net
}
