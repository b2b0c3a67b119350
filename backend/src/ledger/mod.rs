//! MRTZ ledger
//!
//! Append-only transaction log with derived per-player balances. The ledger
//! and balance records are the durable system of record; rounds come and go,
//! these outlive them.

pub mod balance;
pub mod entry;
pub mod store;

// Re-export public API
pub use balance::Balance;
pub use entry::{EntryDraft, EntryStatus, EntryType, LedgerEntry, LedgerError};
pub use store::{Ledger, LedgerFilter};
