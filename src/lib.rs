//! Canteen Balance Engine Library
//! # Overview
//!
//! This library provides the balance engine behind a cashless campus
//! canteen: prepaid student accounts debited at point-of-sale terminals,
//! credited by admin top-ups, with every movement recorded in a ledger.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, CartLine, LedgerEntry, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Debit/credit orchestration, history and ledger queries
//!   - [`core::config`] - Engine policy (top-up ceiling, timeouts, retries)
//! - [`store`] - Account and ledger storage traits with in-memory backends
//! - [`io`] - CSV parsing and output for the replay pipeline
//! - [`replay`] - Batch replay of operation files through the engine
//!
//! # Operations
//!
//! The engine supports four operations:
//!
//! - **Debit**: Charge a cart against an account (requires sufficient balance)
//! - **Credit**: Top up an account (positive amount, at most the configured ceiling)
//! - **History**: Recent ledger entries for one account, newest first
//! - **Ledger**: Filtered, name-enriched ledger view across accounts
//!
//! # Guarantees
//!
//! - A balance never goes negative: the store applies the debit only if
//!   the balance still covers it at write time
//! - Every successful debit or credit leaves exactly one ledger entry
//! - A deducted balance whose ledger write ultimately fails surfaces as a
//!   loud partial-write error instead of vanishing

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod replay;
pub mod store;
pub mod types;

pub use crate::core::{BalanceEngine, EngineConfig, Receipt};
pub use io::write_accounts_csv;
pub use store::{AccountStore, DebitOutcome, LedgerStore, MemoryAccountStore, MemoryLedgerStore};
pub use types::{
    Account, AccountUid, CallerIdentity, CartLine, EntryId, LedgerEntry, LedgerFilter, LedgerKind,
    LedgerQuery, LedgerRecord, PosError, Role, SalesPeriod, StoreError,
};
