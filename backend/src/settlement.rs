//! Settlement engine
//!
//! Turns a group's signed MRTZ balances into the fewest pairwise transfers
//! that pay everyone down, and models the propose/agree/complete lifecycle
//! of a group settlement.
//!
//! # Numeric policy
//!
//! MRTZ amounts are floating-point currency values. Repeated subtraction in
//! the matching loop accumulates error, so the "fully settled" check uses
//! [`EPSILON`] (0.01) rather than exact equality; display rounding is two
//! decimals via [`round_mrtz`].

use crate::ledger::{Ledger, LedgerError};
use crate::models::score::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Tolerance below which a residual balance counts as settled
pub const EPSILON: f64 = 0.01;

/// Round an MRTZ amount to two decimals for display
pub fn round_mrtz(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// One proposed transfer between two players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub from: PlayerId,
    pub to: PlayerId,
    pub amount: f64,
}

/// The computed transfer list plus any residual imbalance
///
/// `residual` is the signed sum of the input balances. A non-zero residual
/// means the input was not a pure transfer economy (e.g. credit-only skins
/// pots); it is surfaced here for the caller to flag, never silently fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementPlan {
    pub transfers: Vec<Transfer>,
    pub residual: f64,
}

/// Compute minimal pairwise transfers for a signed balance map
///
/// Greedy largest-debtor/largest-creditor matching: debtors sorted most
/// negative first, creditors most positive first, repeatedly matched for
/// `min(|debt|, credit)` until both sides are exhausted. Players within
/// [`EPSILON`] of zero are untouched. For a zero-sum input the transfer
/// count is at most one less than the number of non-zero players.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use mrtz_betting_core_rs::settlement::compute_transfers;
///
/// let balances = HashMap::from([
///     ("p1".to_string(), 5.0),
///     ("p2".to_string(), -3.0),
///     ("p3".to_string(), -2.0),
/// ]);
///
/// let plan = compute_transfers(&balances);
/// assert_eq!(plan.transfers.len(), 2);
/// assert!(plan.residual.abs() < 0.01);
/// assert!(plan.transfers.iter().all(|t| t.to == "p1"));
/// ```
pub fn compute_transfers(balances: &HashMap<PlayerId, f64>) -> SettlementPlan {
    let mut debtors: Vec<(PlayerId, f64)> = balances
        .iter()
        .filter(|(_, v)| **v < -EPSILON)
        .map(|(p, v)| (p.clone(), *v))
        .collect();
    let mut creditors: Vec<(PlayerId, f64)> = balances
        .iter()
        .filter(|(_, v)| **v > EPSILON)
        .map(|(p, v)| (p.clone(), *v))
        .collect();

    // Deterministic order: amount first, player ID as tie-break
    debtors.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    creditors.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut transfers = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < debtors.len() && j < creditors.len() {
        let amount = (-debtors[i].1).min(creditors[j].1);
        transfers.push(Transfer {
            from: debtors[i].0.clone(),
            to: creditors[j].0.clone(),
            amount,
        });

        debtors[i].1 += amount;
        creditors[j].1 -= amount;

        if debtors[i].1 >= -EPSILON {
            i += 1;
        }
        if creditors[j].1 <= EPSILON {
            j += 1;
        }
    }

    SettlementPlan {
        transfers,
        residual: balances.values().sum(),
    }
}

/// Which side of a settlement a party is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Payer,
    Receiver,
}

/// One party of a proposed settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementParty {
    pub player_id: PlayerId,
    pub role: PartyRole,
    pub amount: f64,
    pub agreed: bool,
}

/// Lifecycle state of a settlement proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Agreed,
    Completed,
    Rejected,
}

/// Errors that can occur in the settlement lifecycle
#[derive(Debug, Error, PartialEq)]
pub enum SettlementError {
    #[error("Player {0} is not a party to this settlement")]
    UnknownParty(PlayerId),

    #[error("Settlement is {0:?}; this operation needs a different state")]
    WrongState(SettlementStatus),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// A proposed group transfer plan
///
/// Completing a settlement marks every referenced ledger entry settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    /// Unique settlement identifier (UUID)
    settlement_id: String,

    /// Payers and receivers with their agreement flags
    parties: Vec<SettlementParty>,

    /// Total MRTZ changing hands (receiver-side sum)
    total_mrtz: f64,

    /// Ledger entries this settlement pays down
    transaction_ids: Vec<String>,

    /// Lifecycle state
    status: SettlementStatus,

    /// Creation timestamp (Unix millis)
    created_at: i64,

    /// Last lifecycle-change timestamp (Unix millis)
    updated_at: i64,
}

impl Settlement {
    /// Propose a settlement from a computed transfer plan
    ///
    /// Parties are aggregated per player across the plan's transfers; with
    /// greedy matching a player is only ever on one side.
    pub fn from_plan(plan: &SettlementPlan, transaction_ids: Vec<String>, now_ms: i64) -> Self {
        let mut paying: HashMap<PlayerId, f64> = HashMap::new();
        let mut receiving: HashMap<PlayerId, f64> = HashMap::new();
        for transfer in &plan.transfers {
            *paying.entry(transfer.from.clone()).or_insert(0.0) += transfer.amount;
            *receiving.entry(transfer.to.clone()).or_insert(0.0) += transfer.amount;
        }

        let mut parties: Vec<SettlementParty> = paying
            .into_iter()
            .map(|(player_id, amount)| SettlementParty {
                player_id,
                role: PartyRole::Payer,
                amount,
                agreed: false,
            })
            .chain(receiving.into_iter().map(|(player_id, amount)| {
                SettlementParty {
                    player_id,
                    role: PartyRole::Receiver,
                    amount,
                    agreed: false,
                }
            }))
            .collect();
        parties.sort_by(|a, b| a.player_id.cmp(&b.player_id));

        let total_mrtz = parties
            .iter()
            .filter(|p| p.role == PartyRole::Receiver)
            .map(|p| p.amount)
            .sum();

        Self {
            settlement_id: uuid::Uuid::new_v4().to_string(),
            parties,
            total_mrtz,
            transaction_ids,
            status: SettlementStatus::Pending,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Get settlement ID
    pub fn settlement_id(&self) -> &str {
        &self.settlement_id
    }

    /// Get the parties
    pub fn parties(&self) -> &[SettlementParty] {
        &self.parties
    }

    /// Get total MRTZ changing hands
    pub fn total_mrtz(&self) -> f64 {
        self.total_mrtz
    }

    /// Get the referenced ledger entries
    pub fn transaction_ids(&self) -> &[String] {
        &self.transaction_ids
    }

    /// Get lifecycle state
    pub fn status(&self) -> SettlementStatus {
        self.status
    }

    /// Record one party's agreement
    ///
    /// The settlement becomes `Agreed` once every party has agreed.
    pub fn record_agreement(&mut self, player: &str, now_ms: i64) -> Result<(), SettlementError> {
        if self.status != SettlementStatus::Pending {
            return Err(SettlementError::WrongState(self.status));
        }
        let party = self
            .parties
            .iter_mut()
            .find(|p| p.player_id == player)
            .ok_or_else(|| SettlementError::UnknownParty(player.to_string()))?;
        party.agreed = true;

        if self.parties.iter().all(|p| p.agreed) {
            self.status = SettlementStatus::Agreed;
        }
        self.updated_at = now_ms;
        Ok(())
    }

    /// Reject the proposal
    pub fn reject(&mut self, now_ms: i64) -> Result<(), SettlementError> {
        match self.status {
            SettlementStatus::Pending | SettlementStatus::Agreed => {
                self.status = SettlementStatus::Rejected;
                self.updated_at = now_ms;
                Ok(())
            }
            status => Err(SettlementError::WrongState(status)),
        }
    }

    /// Complete an agreed settlement, marking every referenced ledger entry
    /// settled
    ///
    /// All referenced entries are validated before any is touched, so a bad
    /// reference cannot leave the ledger half-settled.
    pub fn complete(
        &mut self,
        ledger: &mut Ledger,
        completed_by: &str,
        now_ms: i64,
    ) -> Result<(), SettlementError> {
        if self.status != SettlementStatus::Agreed {
            return Err(SettlementError::WrongState(self.status));
        }

        // Validate every reference up front
        for id in &self.transaction_ids {
            let entry = ledger
                .get_entry(id)
                .ok_or_else(|| LedgerError::UnknownTransaction(id.clone()))?;
            if entry.status() == crate::ledger::EntryStatus::Settled {
                return Err(SettlementError::Ledger(LedgerError::AlreadySettled(id.clone())));
            }
        }

        for id in &self.transaction_ids {
            ledger.mark_transaction_settled(id, &self.settlement_id, completed_by, now_ms)?;
        }

        self.status = SettlementStatus::Completed;
        self.updated_at = now_ms;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_mrtz_two_decimals() {
        assert_eq!(round_mrtz(1.0 / 3.0), 0.33);
        assert_eq!(round_mrtz(0.125), 0.13);
        assert_eq!(round_mrtz(-1.5), -1.5);
    }

    #[test]
    fn test_empty_balances_produce_no_transfers() {
        let plan = compute_transfers(&HashMap::new());
        assert!(plan.transfers.is_empty());
        assert_eq!(plan.residual, 0.0);
    }

    #[test]
    fn test_zero_balance_players_untouched() {
        let balances = HashMap::from([
            ("p1".to_string(), 2.0),
            ("p2".to_string(), -2.0),
            ("p3".to_string(), 0.0),
        ]);
        let plan = compute_transfers(&balances);
        assert_eq!(plan.transfers.len(), 1);
        assert!(plan.transfers.iter().all(|t| t.from != "p3" && t.to != "p3"));
    }
}
