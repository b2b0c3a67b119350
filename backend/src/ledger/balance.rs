//! Derived player balance
//!
//! One record per player, maintained incrementally on every ledger write and
//! reconstructible by replaying the full entry list for that player. The
//! replay is the single source of truth: `balance` always equals the sum of
//! confirmed/settled credits (player is `to`) minus confirmed/settled debits
//! (player is `from`).

use crate::ledger::entry::{EntryStatus, LedgerEntry};
use serde::{Deserialize, Serialize};

/// Derived balance snapshot for one player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    /// Confirmed/settled credits minus confirmed/settled debits (MRTZ)
    balance: f64,

    /// Not-yet-confirmed amounts owed to this player
    pending_in: f64,

    /// Not-yet-confirmed amounts this player owes
    pending_out: f64,

    /// Number of entries that move money on this balance
    transaction_count: u64,

    /// Last time any touching entry changed (Unix millis)
    last_updated: i64,

    /// Most recently created entry touching this player
    last_transaction_id: Option<String>,
}

impl Balance {
    /// Get confirmed balance
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Get pending incoming total
    pub fn pending_in(&self) -> f64 {
        self.pending_in
    }

    /// Get pending outgoing total
    pub fn pending_out(&self) -> f64 {
        self.pending_out
    }

    /// Get the number of entries touching this balance
    pub fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    /// Get last update timestamp
    pub fn last_updated(&self) -> i64 {
        self.last_updated
    }

    /// Get the most recently created touching transaction
    pub fn last_transaction_id(&self) -> Option<&str> {
        self.last_transaction_id.as_deref()
    }

    /// Apply a newly created entry in its current status (ledger-internal)
    ///
    /// Also the replay primitive: folding every entry for a player through
    /// this function reproduces the incremental balance.
    pub(crate) fn apply_entry(&mut self, entry: &LedgerEntry, player: &str) {
        if !entry.touches(player) {
            return;
        }

        let amount = entry.amount();
        let is_to = entry.to_player_id() == Some(player);
        let is_from = entry.from_player_id() == Some(player);

        match entry.status() {
            EntryStatus::Pending => {
                if is_to {
                    self.pending_in += amount;
                }
                if is_from {
                    self.pending_out += amount;
                }
            }
            EntryStatus::Confirmed | EntryStatus::Settled => {
                if is_to {
                    self.balance += amount;
                }
                if is_from {
                    self.balance -= amount;
                }
            }
        }

        self.transaction_count += 1;
        self.last_transaction_id = Some(entry.transaction_id().to_string());
        self.last_updated = self.last_updated.max(entry.updated_at());
    }

    /// Move a pending entry's legs into the confirmed balance
    /// (ledger-internal; called when a pending entry confirms or settles)
    pub(crate) fn promote_pending(&mut self, entry: &LedgerEntry, player: &str, now_ms: i64) {
        let amount = entry.amount();
        if entry.to_player_id() == Some(player) {
            self.pending_in -= amount;
            self.balance += amount;
        }
        if entry.from_player_id() == Some(player) {
            self.pending_out -= amount;
            self.balance -= amount;
        }
        self.last_updated = self.last_updated.max(now_ms);
    }

    /// Record a non-monetary touch (settlement stamp on a confirmed entry)
    pub(crate) fn touch(&mut self, now_ms: i64) {
        self.last_updated = self.last_updated.max(now_ms);
    }
}
