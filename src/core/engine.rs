//! Balance operation engine
//!
//! Orchestrates the two meaningful business transactions of the system:
//! debit-and-record for point-of-sale purchases and credit-and-record for
//! admin top-ups, plus the read-side queries (per-account history, filtered
//! ledger, sales summaries).
//!
//! The engine enforces business rules such as:
//! - Precondition ordering on debit (empty cart, account resolves,
//!   sufficient balance; first failure wins)
//! - The top-up ceiling policy
//! - Store deadlines on every round-trip
//!
//! Correctness under concurrency does not rest on the engine's pre-read:
//! the balance deduction is the account store's conditional update, which
//! re-checks sufficiency under the store-side lock at write time. Two
//! terminals debiting one account therefore serialize at the store, and
//! the losing call comes back as an insufficient-balance rejection rather
//! than a negative balance.
//!
//! If the ledger write fails after the balance write succeeded, the engine
//! retries it a bounded number of times and then surfaces a partial-write
//! error carrying the orphaned entry id, so the inconsistency is loud
//! instead of silent.

use crate::core::config::EngineConfig;
use crate::store::traits::{AccountStore, DebitOutcome, LedgerStore};
use crate::types::{
    cart_total, Account, CallerIdentity, CartLine, LedgerEntry, LedgerFilter, LedgerKind,
    LedgerQuery, LedgerRecord, PosError, SalesPeriod, StoreError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;

/// Result of a successful debit or credit
///
/// Carries the updated account for UI refresh and the created ledger entry
/// for receipt display.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    /// Account state after the balance write
    pub account: Account,

    /// The ledger entry recorded for this operation
    pub entry: LedgerEntry,
}

/// Balance operation engine
///
/// Generic over the two store seams so production backends and in-memory
/// test stores are interchangeable. All operations take `&self`; the
/// engine holds no per-operation state and can be shared behind an `Arc`
/// across tasks.
pub struct BalanceEngine<A: AccountStore, L: LedgerStore> {
    accounts: Arc<A>,
    ledger: Arc<L>,
    config: EngineConfig,
}

impl<A: AccountStore, L: LedgerStore> BalanceEngine<A, L> {
    /// Create an engine over the given stores
    pub fn new(accounts: Arc<A>, ledger: Arc<L>, config: EngineConfig) -> Self {
        Self {
            accounts,
            ledger,
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Debit an account for a purchase and record the matching ledger entry
    ///
    /// Preconditions are checked in order, first failure wins:
    /// 1. `cart` is non-empty
    /// 2. `uid` resolves to an account
    /// 3. the balance covers the cart total
    ///
    /// The deduction itself is the store's conditional update; the
    /// pre-read only exists so rejections carry accurate amounts. On
    /// success the purchase entry snapshots the cart and records the
    /// vendor's name from `caller`.
    ///
    /// # Errors
    ///
    /// - `EmptyCart`, `AccountNotFound`, `InsufficientBalance` - business
    ///   rejections, no state change
    /// - `ArithmeticOverflow` - cart total cannot be represented
    /// - `StoreTimeout`, `StoreUnavailable` - infrastructure faults, safe
    ///   to retry the whole call
    /// - `PartialWrite` - balance updated but the ledger entry could not
    ///   be written; reconciliation required
    pub async fn debit(
        &self,
        caller: &CallerIdentity,
        uid: &str,
        cart: &[CartLine],
    ) -> Result<Receipt, PosError> {
        if cart.is_empty() {
            return Err(PosError::empty_cart(uid));
        }
        let total = cart_total(cart)?;

        let account = self
            .store_call("account get", self.accounts.get(uid))
            .await?
            .ok_or_else(|| PosError::account_not_found(uid))?;

        if account.balance < total {
            return Err(PosError::insufficient_balance(uid, total, account.balance));
        }

        // The conditional update is the authority; it re-checks
        // sufficiency under the store-side lock and may still reject if a
        // concurrent debit won the race since the pre-read.
        let outcome = self
            .store_call(
                "account debit",
                self.accounts.debit_if_sufficient(uid, total),
            )
            .await?;

        let updated = match outcome {
            DebitOutcome::Applied(updated) => updated,
            DebitOutcome::Insufficient { available } => {
                return Err(PosError::insufficient_balance(uid, total, available));
            }
            DebitOutcome::NotFound => return Err(PosError::account_not_found(uid)),
        };

        let entry = LedgerEntry::purchase(uid, total, &caller.name, cart.to_vec());
        let entry = self.append_with_retry(uid, entry).await?;

        tracing::debug!(
            uid,
            amount = %total,
            entry_id = %entry.entry_id,
            vendor = %caller.name,
            "purchase recorded"
        );

        Ok(Receipt {
            account: updated,
            entry,
        })
    }

    /// Credit an account for a top-up and record the matching ledger entry
    ///
    /// `amount` must be strictly positive and at most the configured
    /// ceiling. The credit is an atomic store-side addition; the top-up
    /// entry records the admin's name from `caller`.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount`, `AccountNotFound` - business rejections, no
    ///   state change
    /// - `StoreTimeout`, `StoreUnavailable` - infrastructure faults
    /// - `PartialWrite` - balance updated but the ledger entry could not
    ///   be written
    pub async fn credit(
        &self,
        caller: &CallerIdentity,
        uid: &str,
        amount: Decimal,
    ) -> Result<Receipt, PosError> {
        if amount <= Decimal::ZERO || amount > self.config.topup_ceiling {
            return Err(PosError::invalid_amount(amount, self.config.topup_ceiling));
        }

        let updated = self
            .store_call("account credit", self.accounts.credit(uid, amount))
            .await?
            .ok_or_else(|| PosError::account_not_found(uid))?;

        let entry = LedgerEntry::topup(uid, amount, &caller.name);
        let entry = self.append_with_retry(uid, entry).await?;

        tracing::debug!(
            uid,
            amount = %amount,
            entry_id = %entry.entry_id,
            admin = %caller.name,
            "top-up recorded"
        );

        Ok(Receipt {
            account: updated,
            entry,
        })
    }

    /// The most recent `limit` ledger entries for one account
    ///
    /// Purchases and top-ups are merged and sorted by timestamp
    /// descending; the sort is stable, so entries sharing a timestamp keep
    /// their insertion order. Read-only.
    pub async fn history(&self, uid: &str, limit: usize) -> Result<Vec<LedgerEntry>, PosError> {
        let filter = LedgerFilter::for_account(uid);
        let mut entries = self
            .store_call("ledger query", self.ledger.query(&filter))
            .await?;

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        Ok(entries)
    }

    /// All ledger entries matching a caller-facing query
    ///
    /// Entries are enriched with the account display name at query time;
    /// lookups are cached per call so a uid appearing in many entries
    /// costs one store round-trip. An unresolvable uid enriches as
    /// `"Unknown"`. `text_search` matches case-insensitively against the
    /// uid or the display name. Sorted by timestamp descending.
    pub async fn ledger(&self, query: &LedgerQuery) -> Result<Vec<LedgerRecord>, PosError> {
        let filter = LedgerFilter {
            kind: query.kind,
            account_uid: None,
            since: query.since,
        };
        let mut entries = self
            .store_call("ledger query", self.ledger.query(&filter))
            .await?;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut names: HashMap<String, String> = HashMap::new();
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let account_name = match names.get(&entry.account_uid) {
                Some(name) => name.clone(),
                None => {
                    let resolved = self
                        .store_call("account get", self.accounts.get(&entry.account_uid))
                        .await?
                        .map(|account| account.name)
                        .unwrap_or_else(|| "Unknown".to_string());
                    names.insert(entry.account_uid.clone(), resolved.clone());
                    resolved
                }
            };
            records.push(LedgerRecord {
                entry,
                account_name,
            });
        }

        if let Some(term) = &query.text_search {
            let needle = term.to_lowercase();
            records.retain(|record| {
                record.entry.account_uid.to_lowercase().contains(&needle)
                    || record.account_name.to_lowercase().contains(&needle)
            });
        }

        Ok(records)
    }

    /// Total purchase volume for the period containing the current instant
    pub async fn sales_summary(&self, period: SalesPeriod) -> Result<Decimal, PosError> {
        self.sales_summary_at(period, Utc::now()).await
    }

    /// Total purchase volume for the period containing `now`
    ///
    /// Split out from [`sales_summary`](Self::sales_summary) so tests
    /// control the clock.
    pub async fn sales_summary_at(
        &self,
        period: SalesPeriod,
        now: DateTime<Utc>,
    ) -> Result<Decimal, PosError> {
        let (start, end) = period.bounds(now);
        let filter = LedgerFilter {
            kind: Some(LedgerKind::Purchase),
            account_uid: None,
            since: Some(start),
        };
        let entries = self
            .store_call("ledger query", self.ledger.query(&filter))
            .await?;

        let mut total = Decimal::ZERO;
        for entry in entries.iter().filter(|entry| entry.timestamp < end) {
            total = total.checked_add(entry.amount).ok_or_else(|| {
                PosError::arithmetic_overflow("sales summary", &entry.account_uid)
            })?;
        }
        Ok(total)
    }

    /// Run one store call under the configured deadline
    async fn store_call<T, F>(&self, operation: &str, call: F) -> Result<T, PosError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match timeout(self.config.store_timeout, call).await {
            Ok(result) => result.map_err(PosError::from),
            Err(_) => Err(PosError::store_timeout(operation)),
        }
    }

    /// Append a ledger entry, retrying up to the configured budget
    ///
    /// Called only after the balance write has succeeded; exhausting the
    /// budget therefore surfaces a partial write, never a silent loss.
    async fn append_with_retry(
        &self,
        uid: &str,
        entry: LedgerEntry,
    ) -> Result<LedgerEntry, PosError> {
        let attempts = self.config.ledger_write_attempts;
        let mut last_failure = None;

        for attempt in 1..=attempts {
            match timeout(self.config.store_timeout, self.ledger.insert(entry.clone())).await {
                Ok(Ok(inserted)) => return Ok(inserted),
                Ok(Err(error)) => {
                    tracing::warn!(
                        uid,
                        entry_id = %entry.entry_id,
                        attempt,
                        attempts,
                        error = %error,
                        "ledger insert failed"
                    );
                    last_failure = Some(error.to_string());
                }
                Err(_) => {
                    tracing::warn!(
                        uid,
                        entry_id = %entry.entry_id,
                        attempt,
                        attempts,
                        "ledger insert timed out"
                    );
                    last_failure = Some("ledger insert timed out".to_string());
                }
            }
        }

        let message = last_failure.unwrap_or_else(|| "unknown store failure".to_string());
        tracing::error!(
            uid,
            entry_id = %entry.entry_id,
            attempts,
            "balance updated but ledger entry was not written; reconciliation required"
        );
        Err(PosError::partial_write(uid, &entry.entry_id, attempts, &message))
    }
}
