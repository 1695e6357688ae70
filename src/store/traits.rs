//! Store traits consumed by the balance engine
//!
//! The engine talks to two collaborators through these seams: an account
//! store holding balance-bearing records keyed by uid, and an append-only
//! ledger store. Both are assumed network-backed, fallible, and
//! latency-bearing; implementations report infrastructure faults as
//! [`StoreError`] and the engine owns deadlines and translation.
//!
//! The account store exposes two atomic mutation primitives in addition to
//! plain get/upsert. `debit_if_sufficient` is the conditional-update form
//! (check and deduct under one store-side lock, the moral equivalent of
//! `UPDATE accounts SET balance = balance - :amt WHERE uid = :uid AND
//! balance >= :amt`): it is what keeps two terminals from driving the same
//! account negative, and it is why retrying a failed debit cannot
//! double-charge.

use crate::types::{Account, LedgerEntry, LedgerFilter, StoreError};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Outcome of a conditional debit
///
/// Distinguishes "the deduction was applied" from the two conditions the
/// store checks atomically at write time.
#[derive(Debug, Clone, PartialEq)]
pub enum DebitOutcome {
    /// Sufficiency held at write time; carries the updated account
    Applied(Account),

    /// Balance was below the requested amount at write time
    Insufficient {
        /// Balance observed under the store-side lock
        available: Decimal,
    },

    /// No account exists for the uid
    NotFound,
}

/// Account records keyed by uid
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetch an account by uid, `None` when it does not exist
    async fn get(&self, uid: &str) -> Result<Option<Account>, StoreError>;

    /// Insert or replace an account record
    async fn upsert(&self, account: Account) -> Result<Account, StoreError>;

    /// Atomically deduct `amount` if the balance covers it
    ///
    /// The sufficiency check and the write happen under a single
    /// store-side lock; callers must not pre-deduct or re-check.
    async fn debit_if_sufficient(
        &self,
        uid: &str,
        amount: Decimal,
    ) -> Result<DebitOutcome, StoreError>;

    /// Atomically add `amount` to the balance
    ///
    /// Returns `None` when no account exists for the uid.
    async fn credit(&self, uid: &str, amount: Decimal) -> Result<Option<Account>, StoreError>;
}

/// Append-only store of ledger entries
///
/// Entries are never mutated or deleted. Because there is no
/// update-in-place, the ledger is safe for concurrent writers without
/// extra coordination.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append one entry
    ///
    /// Implementations reject a duplicate `entry_id` with
    /// `StoreError::Conflict`.
    async fn insert(&self, entry: LedgerEntry) -> Result<LedgerEntry, StoreError>;

    /// Return all entries matching the filter, in insertion order
    async fn query(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, StoreError>;
}
