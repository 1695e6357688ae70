//! Store collaborators
//!
//! # Components
//!
//! - `traits` - The account and ledger store seams the engine consumes
//! - `memory` - Thread-safe in-memory reference implementations

pub mod memory;
pub mod traits;

pub use memory::{MemoryAccountStore, MemoryLedgerStore};
pub use traits::{AccountStore, DebitOutcome, LedgerStore};
