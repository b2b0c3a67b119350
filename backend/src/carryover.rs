//! Carry-over tracker
//!
//! Records unresolved tied pots so a later round (or an explicit resolution
//! action) can pay them out. Resolving writes `carry_over_resolved` ledger
//! entries for the awarded players and flips the record to resolved exactly
//! once; a second resolution attempt is rejected rather than double-paying.

use crate::ledger::{EntryDraft, EntryStatus, EntryType, Ledger, LedgerError};
use crate::models::score::PlayerId;
use crate::resolution::{NassauSegmentTie, SkinsCarryOver};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Which bet family a carry-over came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryOverBetType {
    Skins,
    Nassau,
}

/// Lifecycle state of a carry-over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryOverStatus {
    Active,
    Resolved,
}

/// How a carry-over was eventually resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryOverResolutionType {
    Playoff,
    Split,
    Void,
    Push,
}

/// What exactly was left unresolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "betType", rename_all = "snake_case")]
pub enum CarryOverDetails {
    /// Trailing tied skins holes and the outstanding pot
    Skins(SkinsCarryOver),

    /// Tied nassau segments with their tied players
    Nassau { ties: Vec<NassauSegmentTie> },
}

/// Errors that can occur while tracking carry-overs
#[derive(Debug, Error, PartialEq)]
pub enum CarryOverError {
    #[error("Unknown carry-over {0}")]
    UnknownCarryOver(String),

    #[error("Carry-over {0} is already resolved")]
    AlreadyResolved(String),

    #[error("Award for player {player} must be a non-negative finite amount, got {amount}")]
    InvalidAward { player: PlayerId, amount: f64 },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// An unresolved tied pot deferred past its round
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarryOver {
    /// Unique carry-over identifier (UUID)
    carry_over_id: String,

    /// Round that left the pot unresolved
    original_round_id: String,

    /// Bet family
    bet_type: CarryOverBetType,

    /// Base stake of the originating bet (MRTZ)
    bet_value: f64,

    /// What was left tied
    details: CarryOverDetails,

    /// Players who can discover and resolve this carry-over
    participants: Vec<PlayerId>,

    /// Lifecycle state
    status: CarryOverStatus,

    /// Creation timestamp (Unix millis)
    created_at: i64,

    /// Who recorded it
    created_by: PlayerId,

    /// Round the pot was finally paid out in, once resolved
    resolved_in_round_id: Option<String>,

    /// How it was resolved
    resolution_type: Option<CarryOverResolutionType>,

    /// Resolution timestamp (Unix millis)
    resolved_at: Option<i64>,

    /// Who resolved it
    resolved_by: Option<PlayerId>,
}

impl CarryOver {
    /// Get carry-over ID
    pub fn carry_over_id(&self) -> &str {
        &self.carry_over_id
    }

    /// Get the originating round
    pub fn original_round_id(&self) -> &str {
        &self.original_round_id
    }

    /// Get the bet family
    pub fn bet_type(&self) -> CarryOverBetType {
        self.bet_type
    }

    /// Get the base stake
    pub fn bet_value(&self) -> f64 {
        self.bet_value
    }

    /// Get the unresolved details
    pub fn details(&self) -> &CarryOverDetails {
        &self.details
    }

    /// Get the participants
    pub fn participants(&self) -> &[PlayerId] {
        &self.participants
    }

    /// Get lifecycle state
    pub fn status(&self) -> CarryOverStatus {
        self.status
    }

    /// Get creation timestamp
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Get who recorded it
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    /// Get the resolving round, once resolved
    pub fn resolved_in_round_id(&self) -> Option<&str> {
        self.resolved_in_round_id.as_deref()
    }

    /// Get the resolution type, once resolved
    pub fn resolution_type(&self) -> Option<CarryOverResolutionType> {
        self.resolution_type
    }
}

/// In-memory store of carry-overs, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarryOverTracker {
    carry_overs: HashMap<String, CarryOver>,

    /// IDs in creation order (oldest unresolved debt surfaces first)
    order: Vec<String>,
}

impl CarryOverTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unresolved pot
    #[allow(clippy::too_many_arguments)]
    pub fn create_carry_over(
        &mut self,
        original_round_id: &str,
        bet_type: CarryOverBetType,
        bet_value: f64,
        details: CarryOverDetails,
        participants: Vec<PlayerId>,
        created_by: &str,
        now_ms: i64,
    ) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let carry_over = CarryOver {
            carry_over_id: id.clone(),
            original_round_id: original_round_id.to_string(),
            bet_type,
            bet_value,
            details,
            participants,
            status: CarryOverStatus::Active,
            created_at: now_ms,
            created_by: created_by.to_string(),
            resolved_in_round_id: None,
            resolution_type: None,
            resolved_at: None,
            resolved_by: None,
        };

        self.order.push(id.clone());
        self.carry_overs.insert(id.clone(), carry_over);
        id
    }

    /// Get one carry-over by ID
    pub fn get(&self, carry_over_id: &str) -> Option<&CarryOver> {
        self.carry_overs.get(carry_over_id)
    }

    /// Active carry-overs visible to a player, oldest first
    pub fn get_active_carry_overs(&self, player: &str) -> Vec<&CarryOver> {
        self.order
            .iter()
            .filter_map(|id| self.carry_overs.get(id))
            .filter(|c| c.status == CarryOverStatus::Active)
            .filter(|c| c.participants.iter().any(|p| p == player))
            .collect()
    }

    /// Pay out a carry-over and mark it resolved
    ///
    /// Writes one confirmed `carry_over_resolved` ledger entry per awarded
    /// player (zero awards are skipped), then flips the status. Awards are
    /// validated before anything is written, and the status only flips after
    /// every ledger write succeeded, so a failure cannot mark the pot
    /// resolved without paying it.
    ///
    /// # Errors
    /// - [`CarryOverError::AlreadyResolved`] if the carry-over is not active
    /// - [`CarryOverError::InvalidAward`] for a negative or non-finite award
    #[allow(clippy::too_many_arguments)]
    pub fn resolve_carry_over(
        &mut self,
        carry_over_id: &str,
        resolved_in_round_id: &str,
        resolution_type: CarryOverResolutionType,
        resolved_by: &str,
        awards: &[(PlayerId, f64)],
        ledger: &mut Ledger,
        now_ms: i64,
    ) -> Result<Vec<String>, CarryOverError> {
        let carry_over = self
            .carry_overs
            .get(carry_over_id)
            .ok_or_else(|| CarryOverError::UnknownCarryOver(carry_over_id.to_string()))?;
        if carry_over.status != CarryOverStatus::Active {
            return Err(CarryOverError::AlreadyResolved(carry_over_id.to_string()));
        }
        for (player, amount) in awards {
            if !(*amount >= 0.0) || !amount.is_finite() {
                return Err(CarryOverError::InvalidAward {
                    player: player.clone(),
                    amount: *amount,
                });
            }
        }

        let participants = carry_over.participants.clone();
        let original_round = carry_over.original_round_id.clone();
        let mut transaction_ids = Vec::new();
        for (player, amount) in awards {
            if *amount == 0.0 {
                continue;
            }
            let id = ledger.create_entry(
                EntryDraft {
                    entry_type: EntryType::CarryOverResolved,
                    round_id: Some(resolved_in_round_id.to_string()),
                    from_player_id: None,
                    to_player_id: Some(player.clone()),
                    participants: participants.clone(),
                    amount: *amount,
                    status: EntryStatus::Confirmed,
                    description: format!(
                        "Carry-over from round {} resolved ({:?})",
                        original_round, resolution_type
                    ),
                },
                now_ms,
            )?;
            transaction_ids.push(id);
        }

        // Payouts landed; only now does the carry-over flip
        let carry_over = self
            .carry_overs
            .get_mut(carry_over_id)
            .ok_or_else(|| CarryOverError::UnknownCarryOver(carry_over_id.to_string()))?;
        carry_over.status = CarryOverStatus::Resolved;
        carry_over.resolved_in_round_id = Some(resolved_in_round_id.to_string());
        carry_over.resolution_type = Some(resolution_type);
        carry_over.resolved_at = Some(now_ms);
        carry_over.resolved_by = Some(resolved_by.to_string());

        Ok(transaction_ids)
    }

    /// Number of tracked carry-overs (active and resolved)
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the tracker is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
