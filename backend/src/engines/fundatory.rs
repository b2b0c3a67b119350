//! Fundatory (side-bet) engine
//!
//! Nets ad-hoc challenger/target proposition bets into one signed amount per
//! player. Polarity: `Success` pays the target from the challenger, `Fail`
//! pays the challenger from the target, `Pending` moves nothing.

use crate::models::bets::{FundatoryBet, FundatoryStatus};
use crate::models::score::PlayerId;
use std::collections::HashMap;

/// Net signed win/loss per player across all fundatory bets
///
/// Both parties of every bet appear in the output (with a 0 contribution for
/// pending bets), so callers can distinguish "involved, nothing decided yet"
/// from "not involved". Nets accumulate additively: a player can be
/// challenger in one bet and target in another within the same round.
///
/// # Example
/// ```
/// use mrtz_betting_core_rs::engines::fundatory::calculate_fundatory;
/// use mrtz_betting_core_rs::{FundatoryBet, FundatoryStatus};
///
/// let mut bet = FundatoryBet::new(
///     "challenger".to_string(),
///     "target".to_string(),
///     5.0,
///     "throw over the lake".to_string(),
///     12,
/// ).unwrap();
/// bet.decide(FundatoryStatus::Success);
///
/// let net = calculate_fundatory(&[bet]);
/// assert_eq!(net["target"], 5.0);
/// assert_eq!(net["challenger"], -5.0);
/// ```
pub fn calculate_fundatory(bets: &[FundatoryBet]) -> HashMap<PlayerId, f64> {
    let mut net: HashMap<PlayerId, f64> = HashMap::new();

    for bet in bets {
        let challenger = net.entry(bet.challenger_id().to_string()).or_insert(0.0);
        *challenger += match bet.status() {
            FundatoryStatus::Success => -bet.amount(),
            FundatoryStatus::Fail => bet.amount(),
            FundatoryStatus::Pending => 0.0,
        };

        let target = net.entry(bet.target_id().to_string()).or_insert(0.0);
        *target += match bet.status() {
            FundatoryStatus::Success => bet.amount(),
            FundatoryStatus::Fail => -bet.amount(),
            FundatoryStatus::Pending => 0.0,
        };
    }

    net
}
