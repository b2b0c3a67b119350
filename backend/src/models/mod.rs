//! Domain models
//!
//! - `score`: per-hole, per-player relative-to-par scores and the round
//! - `bets`: bet configuration, participants, and engine result types

pub mod bets;
pub mod score;
