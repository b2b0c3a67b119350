//! Bet configuration and engine result types
//!
//! Covers the three wager families layered on top of a round:
//! - **Skins**: per-hole winner-take-all, ties carry the pot forward
//! - **Nassau**: front 9 / back 9 / overall, one stake per segment
//! - **Fundatory**: ad-hoc challenger/target proposition bets
//!
//! Bet values are validated at this configuration boundary; the engines
//! assume `value > 0` as a precondition and never re-validate.

use crate::models::score::{HoleNumber, PlayerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when configuring a bet
#[derive(Debug, Error, PartialEq)]
pub enum BetConfigError {
    #[error("Bet value must be positive, got {value}")]
    NonPositiveValue { value: f64 },
}

/// Who takes part in a bet
///
/// Replaces the "optional array defaulting to everyone" shape with an
/// explicit sum type, resolved to a concrete player list exactly once at the
/// start of each calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Participants {
    /// Every player in the round participates
    All,

    /// Only the listed players participate (order preserved)
    Subset { players: Vec<PlayerId> },
}

impl Participants {
    /// Resolve to a concrete participant list for the given round players
    ///
    /// An empty subset behaves like [`Participants::All`].
    pub fn resolve(&self, round_players: &[PlayerId]) -> Vec<PlayerId> {
        match self {
            Participants::All => round_players.to_vec(),
            Participants::Subset { players } if players.is_empty() => round_players.to_vec(),
            Participants::Subset { players } => players.clone(),
        }
    }
}

impl Default for Participants {
    fn default() -> Self {
        Participants::All
    }
}

/// Skins bet configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinsConfig {
    /// Stake added to the pot per hole (MRTZ, always positive)
    value: f64,

    /// Whether the bet has been started (accepted by the group)
    started: bool,

    /// Who is in on the bet
    participants: Participants,
}

impl SkinsConfig {
    /// Create a skins configuration
    ///
    /// # Errors
    /// Returns [`BetConfigError::NonPositiveValue`] if `value <= 0` (or is
    /// not a finite number).
    pub fn new(value: f64, participants: Participants) -> Result<Self, BetConfigError> {
        if !(value > 0.0) || !value.is_finite() {
            return Err(BetConfigError::NonPositiveValue { value });
        }
        Ok(Self {
            value,
            started: false,
            participants,
        })
    }

    /// Mark the bet as started
    pub fn start(&mut self) {
        self.started = true;
    }

    /// Per-hole stake value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether the bet is live
    pub fn started(&self) -> bool {
        self.started
    }

    /// Participant selection
    pub fn participants(&self) -> &Participants {
        &self.participants
    }
}

/// Nassau bet configuration (same shape as skins, separate stake)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NassauConfig {
    /// Stake per segment (front 9 / back 9 / overall), MRTZ
    value: f64,

    /// Whether the bet has been started
    started: bool,

    /// Who is in on the bet
    participants: Participants,
}

impl NassauConfig {
    /// Create a nassau configuration
    ///
    /// # Errors
    /// Returns [`BetConfigError::NonPositiveValue`] if `value <= 0`.
    pub fn new(value: f64, participants: Participants) -> Result<Self, BetConfigError> {
        if !(value > 0.0) || !value.is_finite() {
            return Err(BetConfigError::NonPositiveValue { value });
        }
        Ok(Self {
            value,
            started: false,
            participants,
        })
    }

    /// Mark the bet as started
    pub fn start(&mut self) {
        self.started = true;
    }

    /// Per-segment stake value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether the bet is live
    pub fn started(&self) -> bool {
        self.started
    }

    /// Participant selection
    pub fn participants(&self) -> &Participants {
        &self.participants
    }
}

/// The optional standing bets attached to a round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBets {
    pub skins: Option<SkinsConfig>,
    pub nassau: Option<NassauConfig>,
}

/// Outcome state of a fundatory (proposition) bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundatoryStatus {
    /// Not yet decided; contributes nothing to the net
    Pending,

    /// The target pulled it off: challenger pays the target
    Success,

    /// The target failed: target pays the challenger
    Fail,
}

/// An ad-hoc proposition bet between two named players
///
/// Polarity is load-bearing: `Success` means the **target** succeeded and is
/// paid `amount` by the challenger; `Fail` means the target pays the
/// challenger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundatoryBet {
    /// Unique bet identifier
    id: String,

    /// Player who issued the challenge (pays on success)
    challenger_id: PlayerId,

    /// Player being challenged (paid on success)
    target_id: PlayerId,

    /// Stake (MRTZ, always positive)
    amount: f64,

    /// Human description of the challenge ("park it from the drop zone")
    gap_description: String,

    /// Outcome state
    status: FundatoryStatus,

    /// Hole the challenge is tied to
    hole_number: HoleNumber,
}

impl FundatoryBet {
    /// Create a pending fundatory bet
    ///
    /// # Errors
    /// Returns [`BetConfigError::NonPositiveValue`] if `amount <= 0`.
    pub fn new(
        challenger_id: PlayerId,
        target_id: PlayerId,
        amount: f64,
        gap_description: String,
        hole_number: HoleNumber,
    ) -> Result<Self, BetConfigError> {
        if !(amount > 0.0) || !amount.is_finite() {
            return Err(BetConfigError::NonPositiveValue { value: amount });
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            challenger_id,
            target_id,
            amount,
            gap_description,
            status: FundatoryStatus::Pending,
            hole_number,
        })
    }

    /// Record the outcome of the challenge
    pub fn decide(&mut self, status: FundatoryStatus) {
        self.status = status;
    }

    /// Get bet ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get challenger player ID
    pub fn challenger_id(&self) -> &str {
        &self.challenger_id
    }

    /// Get target player ID
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Get the stake
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Get the challenge description
    pub fn gap_description(&self) -> &str {
        &self.gap_description
    }

    /// Get the outcome state
    pub fn status(&self) -> FundatoryStatus {
        self.status
    }

    /// Get the hole the challenge is tied to
    pub fn hole_number(&self) -> HoleNumber {
        self.hole_number
    }
}

/// Per-hole skins outcome
///
/// `winner_id == None` exactly when `is_carry_over == true`: two or more
/// participants tied for the lowest score on the hole and the pot rolls
/// forward. `value` is the accumulated pot contested on this hole, not the
/// base stake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinResult {
    pub hole_number: HoleNumber,
    pub winner_id: Option<PlayerId>,
    pub value: f64,
    pub is_carry_over: bool,
}

/// Nassau outcome across the three segments
///
/// A segment winner is `None` iff two or more participants tie for the
/// minimum summed score in that segment. The score maps cover every
/// participant (missing holes contribute 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NassauResult {
    pub front9_winner_id: Option<PlayerId>,
    pub back9_winner_id: Option<PlayerId>,
    pub overall_winner_id: Option<PlayerId>,
    pub front9_scores: std::collections::HashMap<PlayerId, i32>,
    pub back9_scores: std::collections::HashMap<PlayerId, i32>,
    pub overall_scores: std::collections::HashMap<PlayerId, i32>,
}
