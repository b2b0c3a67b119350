//! Round-ending orchestration
//!
//! Composes the engines, resolution layer, aggregator, ledger, settlement
//! engine, and carry-over tracker into the one flow a round session calls
//! when play stops. The resolution and settlement choices are threaded in
//! explicitly through [`RoundEndOptions`]; there is no ambient pending
//! state.
//!
//! Flow: engines -> resolution -> aggregate to a signed per-player map ->
//! append confirmed ledger entries -> create carry-overs for deferred pots
//! -> optionally compute a transfer plan.

use crate::aggregator::calculate_round_mrtz;
use crate::carryover::{CarryOverBetType, CarryOverDetails, CarryOverTracker};
use crate::engines::nassau::calculate_nassau;
use crate::engines::skins::calculate_skins;
use crate::ledger::{EntryDraft, EntryStatus, EntryType, Ledger, LedgerError};
use crate::models::bets::{ActiveBets, FundatoryBet};
use crate::models::score::{PlayerId, Round};
use crate::resolution::{resolve_nassau, resolve_skins, ResolutionError, RoundResolution};
use crate::settlement::{compute_transfers, SettlementPlan, EPSILON};
use std::collections::HashMap;
use thiserror::Error;

/// Whether to propose transfers at round end or leave balances standing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementChoice {
    /// Book the results; settle up another day
    Defer,

    /// Also compute a who-pays-whom transfer plan for the round
    ProposeTransfers,
}

/// The choices a round-ending call must make explicit
#[derive(Debug, Clone)]
pub struct RoundEndOptions {
    /// Policy for an unresolved skins pot
    pub skins_resolution: RoundResolution,

    /// Policy for tied nassau segments
    pub nassau_resolution: RoundResolution,

    /// Settlement behavior
    pub settlement: SettlementChoice,
}

impl Default for RoundEndOptions {
    fn default() -> Self {
        Self {
            skins_resolution: RoundResolution::Default,
            nassau_resolution: RoundResolution::Default,
            settlement: SettlementChoice::Defer,
        }
    }
}

/// What ending a round produced
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// Final signed MRTZ net per player (resolution credits included)
    pub net: HashMap<PlayerId, f64>,

    /// Ledger entries appended for this round
    pub transaction_ids: Vec<String>,

    /// Carry-overs created for deferred pots
    pub carry_over_ids: Vec<String>,

    /// Proposed transfers, when requested
    pub transfer_plan: Option<SettlementPlan>,
}

/// Errors that can occur while ending a round
#[derive(Debug, Error, PartialEq)]
pub enum RoundError {
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// End a round: resolve ties, book results to the ledger, defer what stays
/// unresolved, and optionally propose transfers
///
/// Per player, the round's net lands as a single confirmed `bet_win` or
/// `bet_loss` entry (the magnitude of the net; direction via to/from), so
/// the ledger replay reproduces exactly the round's effect on balances.
/// Nets within [`EPSILON`] of zero book nothing.
#[allow(clippy::too_many_arguments)]
pub fn end_round(
    round: &Round,
    active_bets: &ActiveBets,
    fundatory_bets: &[FundatoryBet],
    options: &RoundEndOptions,
    ledger: &mut Ledger,
    tracker: &mut CarryOverTracker,
    recorded_by: &str,
    now_ms: i64,
) -> Result<RoundOutcome, RoundError> {
    let mut net = calculate_round_mrtz(round, active_bets, fundatory_bets);
    let mut carry_over_ids = Vec::new();

    if let Some(skins) = active_bets.skins.as_ref().filter(|s| s.started()) {
        let holes = round.holes();
        let raw = calculate_skins(
            round.scores(),
            &holes,
            skins.value(),
            skins.participants(),
            round.players(),
        );
        let field = skins.participants().resolve(round.players());
        let resolved = resolve_skins(&raw, &options.skins_resolution, round.scores(), &field)?;

        for (player, credit) in resolved.credits {
            *net.entry(player).or_insert(0.0) += credit;
        }
        if let Some(deferred) = resolved.deferred {
            carry_over_ids.push(tracker.create_carry_over(
                round.id(),
                CarryOverBetType::Skins,
                skins.value(),
                CarryOverDetails::Skins(deferred),
                field,
                recorded_by,
                now_ms,
            ));
        }
    }

    if let Some(nassau) = active_bets.nassau.as_ref().filter(|n| n.started()) {
        let result = calculate_nassau(round.scores(), round.players(), nassau.participants());
        let resolved = resolve_nassau(&result, &options.nassau_resolution, nassau.value())?;

        for (player, credit) in resolved.credits {
            *net.entry(player).or_insert(0.0) += credit;
        }
        if !resolved.deferred.is_empty() {
            carry_over_ids.push(tracker.create_carry_over(
                round.id(),
                CarryOverBetType::Nassau,
                nassau.value(),
                CarryOverDetails::Nassau {
                    ties: resolved.deferred,
                },
                nassau.participants().resolve(round.players()),
                recorded_by,
                now_ms,
            ));
        }
    }

    // Book the nets, one entry per player, deterministic order
    let mut players: Vec<PlayerId> = net.keys().cloned().collect();
    players.sort();

    let mut transaction_ids = Vec::new();
    for player in players {
        let amount = net[&player];
        let draft = if amount > EPSILON {
            EntryDraft {
                entry_type: EntryType::BetWin,
                round_id: Some(round.id().to_string()),
                from_player_id: None,
                to_player_id: Some(player.clone()),
                participants: round.players().to_vec(),
                amount,
                status: EntryStatus::Confirmed,
                description: format!("Round {} winnings", round.id()),
            }
        } else if amount < -EPSILON {
            EntryDraft {
                entry_type: EntryType::BetLoss,
                round_id: Some(round.id().to_string()),
                from_player_id: Some(player.clone()),
                to_player_id: None,
                participants: round.players().to_vec(),
                amount: -amount,
                status: EntryStatus::Confirmed,
                description: format!("Round {} losses", round.id()),
            }
        } else {
            continue;
        };
        transaction_ids.push(ledger.create_entry(draft, now_ms)?);
    }

    let transfer_plan = match options.settlement {
        SettlementChoice::ProposeTransfers => Some(compute_transfers(&net)),
        SettlementChoice::Defer => None,
    };

    Ok(RoundOutcome {
        net,
        transaction_ids,
        carry_over_ids,
        transfer_plan,
    })
}
