//! Bet calculation engines
//!
//! Pure functions over in-memory score and bet data: no I/O, no suspension
//! points, no shared mutable state. Missing score data is "not yet played",
//! never an error.

pub mod fundatory;
pub mod nassau;
pub mod skins;

// Re-export public API
pub use fundatory::calculate_fundatory;
pub use nassau::{calculate_nassau, Segment};
pub use skins::calculate_skins;
