//! Ledger entry model
//!
//! One entry records one currency movement leg. Entries are immutable once
//! created except for the `status` transition (pending -> confirmed ->
//! settled) and the settlement stamp applied by that transition.
//!
//! # Critical Invariants
//!
//! 1. `amount` is always a non-negative magnitude; direction is encoded by
//!    `from_player_id` / `to_player_id`, never by sign
//! 2. Every confirmed or settled entry has at least one of from/to set
//! 3. `transaction_id` is generated exactly once at creation and never
//!    regenerated on retry (at-most-once semantics; storage dedupes on it)

use crate::models::score::PlayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of currency movement an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Round winnings credited to a player
    BetWin,

    /// Round losses debited from a player
    BetLoss,

    /// A settlement transfer between two players
    BetSettlement,

    /// Payout of a previously deferred (tied) pot
    CarryOverResolved,

    /// Out-of-band credit the group agreed on (bought the beers, etc.)
    GoodDeed,
}

/// Lifecycle state of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Proposed but not yet acknowledged; tracked as pending in/out only
    Pending,

    /// Acknowledged; counts toward balances
    Confirmed,

    /// Paid down through a completed settlement
    Settled,
}

/// Errors that can occur during ledger operations
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Entry amount must be a non-negative finite number, got {amount}")]
    InvalidAmount { amount: f64 },

    #[error("A {status:?} entry must name a from or to player")]
    MissingCounterparty { status: EntryStatus },

    #[error("Unknown transaction {0}")]
    UnknownTransaction(String),

    #[error("Transaction {0} is already settled")]
    AlreadySettled(String),

    #[error("Transaction {id} cannot move from {from:?} to {to:?}")]
    InvalidStatusTransition {
        id: String,
        from: EntryStatus,
        to: EntryStatus,
    },
}

/// Caller-supplied fields for a new ledger entry
///
/// The ledger assigns the transaction ID and timestamps; everything else
/// comes in through this draft.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub entry_type: EntryType,
    pub round_id: Option<String>,
    pub from_player_id: Option<PlayerId>,
    pub to_player_id: Option<PlayerId>,
    pub participants: Vec<PlayerId>,
    pub amount: f64,
    pub status: EntryStatus,
    pub description: String,
}

/// An immutable (once confirmed) record of one currency movement leg
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Globally unique transaction identifier (UUID)
    transaction_id: String,

    /// Kind of movement
    entry_type: EntryType,

    /// Round this entry came out of, if any
    round_id: Option<String>,

    /// When the underlying event happened (Unix millis)
    date: i64,

    /// Player debited, if any
    from_player_id: Option<PlayerId>,

    /// Player credited, if any
    to_player_id: Option<PlayerId>,

    /// Everyone who can see and audit this entry
    participants: Vec<PlayerId>,

    /// Magnitude of the movement (never signed)
    amount: f64,

    /// Lifecycle state
    status: EntryStatus,

    /// Human-readable description
    description: String,

    /// Settlement that paid this entry down, once settled
    settlement_id: Option<String>,

    /// Who completed the settlement, once settled
    settled_by: Option<PlayerId>,

    /// Creation timestamp (Unix millis)
    created_at: i64,

    /// Last status-transition timestamp (Unix millis)
    updated_at: i64,
}

impl LedgerEntry {
    /// Build an entry from a validated draft (ledger-internal)
    ///
    /// The participant list is extended with from/to so every touched player
    /// can discover the entry.
    pub(crate) fn from_draft(draft: EntryDraft, now_ms: i64) -> Self {
        let mut participants = draft.participants;
        for player in [&draft.from_player_id, &draft.to_player_id].into_iter().flatten() {
            if !participants.contains(player) {
                participants.push(player.clone());
            }
        }

        Self {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            entry_type: draft.entry_type,
            round_id: draft.round_id,
            date: now_ms,
            from_player_id: draft.from_player_id,
            to_player_id: draft.to_player_id,
            participants,
            amount: draft.amount,
            status: draft.status,
            description: draft.description,
            settlement_id: None,
            settled_by: None,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Get transaction ID
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Get entry type
    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Get round ID, if the entry came out of a round
    pub fn round_id(&self) -> Option<&str> {
        self.round_id.as_deref()
    }

    /// Get the event date (Unix millis)
    pub fn date(&self) -> i64 {
        self.date
    }

    /// Get debited player
    pub fn from_player_id(&self) -> Option<&str> {
        self.from_player_id.as_deref()
    }

    /// Get credited player
    pub fn to_player_id(&self) -> Option<&str> {
        self.to_player_id.as_deref()
    }

    /// Get audit participants
    pub fn participants(&self) -> &[PlayerId] {
        &self.participants
    }

    /// Get the movement magnitude
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Get lifecycle state
    pub fn status(&self) -> EntryStatus {
        self.status
    }

    /// Get description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the settlement that paid this entry down
    pub fn settlement_id(&self) -> Option<&str> {
        self.settlement_id.as_deref()
    }

    /// Get who completed the settlement
    pub fn settled_by(&self) -> Option<&str> {
        self.settled_by.as_deref()
    }

    /// Get creation timestamp
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Get last update timestamp
    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    /// Whether the entry moves money on this player's balance
    pub fn touches(&self, player: &str) -> bool {
        self.from_player_id.as_deref() == Some(player)
            || self.to_player_id.as_deref() == Some(player)
    }

    /// Whether the entry is visible in this player's ledger view
    pub fn visible_to(&self, player: &str) -> bool {
        self.touches(player) || self.participants.iter().any(|p| p == player)
    }

    /// Transition pending -> confirmed (ledger-internal)
    pub(crate) fn confirm(&mut self, now_ms: i64) -> Result<(), LedgerError> {
        match self.status {
            EntryStatus::Pending => {
                self.status = EntryStatus::Confirmed;
                self.updated_at = now_ms;
                Ok(())
            }
            EntryStatus::Settled => Err(LedgerError::AlreadySettled(self.transaction_id.clone())),
            from => Err(LedgerError::InvalidStatusTransition {
                id: self.transaction_id.clone(),
                from,
                to: EntryStatus::Confirmed,
            }),
        }
    }

    /// Transition to settled with the settlement stamp (ledger-internal)
    pub(crate) fn settle(
        &mut self,
        settlement_id: &str,
        settled_by: &str,
        now_ms: i64,
    ) -> Result<(), LedgerError> {
        if self.status == EntryStatus::Settled {
            return Err(LedgerError::AlreadySettled(self.transaction_id.clone()));
        }
        self.status = EntryStatus::Settled;
        self.settlement_id = Some(settlement_id.to_string());
        self.settled_by = Some(settled_by.to_string());
        self.updated_at = now_ms;
        Ok(())
    }
}
