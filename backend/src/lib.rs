//! MRTZ Betting Core - Rust Engine
//!
//! Betting settlement and ledger reconciliation for a disc-golf
//! scorekeeping app: per-hole and per-segment winners, tie carry-overs,
//! signed currency deltas, an append-only transaction ledger with derived
//! balances, and minimal-transfer debt settlement.
//!
//! # Architecture
//!
//! - **models**: Domain types (scores, rounds, bet configuration)
//! - **engines**: Pure bet calculators (Skins, Nassau, Fundatory)
//! - **resolution**: End-of-round tie policies
//! - **aggregator**: Per-round signed MRTZ map
//! - **ledger**: Append-only transaction log and derived balances
//! - **settlement**: Greedy debtor/creditor transfer matching
//! - **carryover**: Deferred tied pots
//! - **orchestrator**: The round-ending flow
//!
//! # Critical Invariants
//!
//! 1. MRTZ amounts are f64 magnitudes; ledger direction is encoded by
//!    from/to, never by sign
//! 2. Balances are incrementally maintained but always reconstructible by
//!    replaying the full entry list
//! 3. Transaction IDs are generated exactly once; retries are idempotent at
//!    the storage layer
//! 4. Missing score data means "not yet played", never an error

// Module declarations
pub mod aggregator;
pub mod carryover;
pub mod engines;
pub mod ledger;
pub mod models;
pub mod orchestrator;
pub mod resolution;
pub mod settlement;

// Re-exports for convenience
pub use aggregator::calculate_round_mrtz;
pub use carryover::{
    CarryOver, CarryOverBetType, CarryOverDetails, CarryOverError, CarryOverResolutionType,
    CarryOverStatus, CarryOverTracker,
};
pub use engines::{calculate_fundatory, calculate_nassau, calculate_skins, Segment};
pub use ledger::{
    Balance, EntryDraft, EntryStatus, EntryType, Ledger, LedgerEntry, LedgerError, LedgerFilter,
};
pub use models::{
    bets::{
        ActiveBets, BetConfigError, FundatoryBet, FundatoryStatus, NassauConfig, NassauResult,
        Participants, SkinResult, SkinsConfig,
    },
    score::{HoleNumber, PlayerId, Round, ScoreError, ScoreGrid},
};
pub use orchestrator::{end_round, RoundEndOptions, RoundError, RoundOutcome, SettlementChoice};
pub use resolution::{
    resolve_nassau, resolve_skins, NassauResolution, NassauSegmentTie, ResolutionError,
    RoundResolution, SkinsCarryOver, SkinsResolution,
};
pub use settlement::{
    compute_transfers, round_mrtz, PartyRole, Settlement, SettlementError, SettlementParty,
    SettlementPlan, SettlementStatus, Transfer, EPSILON,
};
