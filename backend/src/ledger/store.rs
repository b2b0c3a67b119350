//! Append-only transaction ledger
//!
//! In-memory system of record for MRTZ movements. Entries are appended,
//! never deleted; balances are maintained incrementally and must always
//! match a full replay of the entry list (the auditability invariant).
//!
//! # Critical Invariants
//!
//! 1. **Atomicity**: a failed `create_entry` leaves entries and balances
//!    untouched; validation happens entirely before any mutation
//! 2. **Replay equivalence**: for every player,
//!    `get_player_balance(p) == replay_balance(p)` after any sequence of
//!    creates, confirms, and settles
//! 3. **Single-use settlement**: an already-settled entry cannot be settled
//!    again

use crate::ledger::balance::Balance;
use crate::ledger::entry::{EntryDraft, EntryStatus, EntryType, LedgerEntry, LedgerError};
use crate::models::score::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Query filter for a player's ledger view
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    /// Only entries of this type
    pub entry_type: Option<EntryType>,

    /// Only entries in this status
    pub status: Option<EntryStatus>,

    /// Skip this many matching entries (newest first)
    pub offset: usize,

    /// Return at most this many entries
    pub limit: Option<usize>,
}

/// Append-only MRTZ transaction ledger with derived balances
///
/// # Example
/// ```
/// use mrtz_betting_core_rs::{EntryDraft, EntryStatus, EntryType, Ledger};
///
/// let mut ledger = Ledger::new();
/// let id = ledger.create_entry(EntryDraft {
///     entry_type: EntryType::BetWin,
///     round_id: Some("r1".to_string()),
///     from_player_id: None,
///     to_player_id: Some("p1".to_string()),
///     participants: vec![],
///     amount: 3.0,
///     status: EntryStatus::Confirmed,
///     description: "skins, hole 3".to_string(),
/// }, 1_000).unwrap();
///
/// assert_eq!(ledger.get_player_balance("p1").balance(), 3.0);
/// assert!(ledger.get_entry(&id).is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    /// All entries, indexed by transaction ID
    entries: HashMap<String, LedgerEntry>,

    /// Transaction IDs in append order, oldest first
    order: Vec<String>,

    /// Derived balances, one per player ever debited or credited
    balances: HashMap<PlayerId, Balance>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry and update every affected balance
    ///
    /// Assigns the unique transaction ID and timestamps. The whole operation
    /// succeeds or fails as one unit: a validation failure applies no
    /// balance update.
    ///
    /// # Errors
    /// - [`LedgerError::InvalidAmount`] if the amount is negative or not finite
    /// - [`LedgerError::MissingCounterparty`] if a confirmed/settled draft
    ///   names neither a from nor a to player
    pub fn create_entry(&mut self, draft: EntryDraft, now_ms: i64) -> Result<String, LedgerError> {
        if !(draft.amount >= 0.0) || !draft.amount.is_finite() {
            return Err(LedgerError::InvalidAmount { amount: draft.amount });
        }
        if draft.status != EntryStatus::Pending
            && draft.from_player_id.is_none()
            && draft.to_player_id.is_none()
        {
            return Err(LedgerError::MissingCounterparty { status: draft.status });
        }

        let entry = LedgerEntry::from_draft(draft, now_ms);
        let id = entry.transaction_id().to_string();

        for player in counterparties(&entry) {
            self.balances
                .entry(player.clone())
                .or_default()
                .apply_entry(&entry, &player);
        }

        self.order.push(id.clone());
        self.entries.insert(id.clone(), entry);
        Ok(id)
    }

    /// Get one entry by transaction ID
    pub fn get_entry(&self, transaction_id: &str) -> Option<&LedgerEntry> {
        self.entries.get(transaction_id)
    }

    /// A player's ledger view, newest first
    ///
    /// Includes every entry the player is a counterparty or audit
    /// participant of, filtered and paginated per `filter`.
    pub fn get_player_ledger(&self, player: &str, filter: &LedgerFilter) -> Vec<&LedgerEntry> {
        let matches = self
            .order
            .iter()
            .rev()
            .filter_map(|id| self.entries.get(id))
            .filter(|e| e.visible_to(player))
            .filter(|e| filter.entry_type.map_or(true, |t| e.entry_type() == t))
            .filter(|e| filter.status.map_or(true, |s| e.status() == s))
            .skip(filter.offset);

        match filter.limit {
            Some(limit) => matches.take(limit).collect(),
            None => matches.collect(),
        }
    }

    /// A player's derived balance (zero-valued default, never an error)
    pub fn get_player_balance(&self, player: &str) -> Balance {
        self.balances.get(player).cloned().unwrap_or_default()
    }

    /// Transition a pending entry to confirmed, promoting its pending legs
    /// into the confirmed balances
    pub fn confirm_transaction(&mut self, transaction_id: &str, now_ms: i64) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get_mut(transaction_id)
            .ok_or_else(|| LedgerError::UnknownTransaction(transaction_id.to_string()))?;

        entry.confirm(now_ms)?;
        let entry = entry.clone();
        for player in counterparties(&entry) {
            if let Some(balance) = self.balances.get_mut(&player) {
                balance.promote_pending(&entry, &player, now_ms);
            }
        }
        Ok(())
    }

    /// Mark an entry settled under the given settlement
    ///
    /// A pending entry being settled also has its pending legs promoted; a
    /// confirmed entry's monetary effect is unchanged. Settling twice fails
    /// with [`LedgerError::AlreadySettled`].
    pub fn mark_transaction_settled(
        &mut self,
        transaction_id: &str,
        settlement_id: &str,
        settled_by: &str,
        now_ms: i64,
    ) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get_mut(transaction_id)
            .ok_or_else(|| LedgerError::UnknownTransaction(transaction_id.to_string()))?;

        let was_pending = entry.status() == EntryStatus::Pending;
        entry.settle(settlement_id, settled_by, now_ms)?;
        let entry = entry.clone();

        for player in counterparties(&entry) {
            if let Some(balance) = self.balances.get_mut(&player) {
                if was_pending {
                    balance.promote_pending(&entry, &player, now_ms);
                } else {
                    balance.touch(now_ms);
                }
            }
        }
        Ok(())
    }

    /// Recompute a player's balance by replaying the full entry list
    ///
    /// The audit path. The incrementally maintained balance must always
    /// equal this (within floating-point tolerance); tests assert it after
    /// every mutation sequence.
    pub fn replay_balance(&self, player: &str) -> Balance {
        let mut balance = Balance::default();
        for id in &self.order {
            if let Some(entry) = self.entries.get(id) {
                balance.apply_entry(entry, player);
            }
        }
        balance
    }

    /// Entries in append order, oldest first (persistence handoff)
    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Number of entries in the ledger
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the ledger has no entries
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// The players whose balances an entry moves
fn counterparties(entry: &LedgerEntry) -> Vec<PlayerId> {
    let mut players = Vec::with_capacity(2);
    if let Some(from) = entry.from_player_id() {
        players.push(from.to_string());
    }
    if let Some(to) = entry.to_player_id() {
        if Some(to) != entry.from_player_id() {
            players.push(to.to_string());
        }
    }
    players
}
