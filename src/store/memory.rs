//! In-memory reference stores
//!
//! These implementations back the replay binary and the test suite. The
//! account store uses `DashMap` so the conditional debit holds the entry
//! lock across its check-and-write, giving the same guarantee a
//! conditional `UPDATE` gives against a relational backend: concurrent
//! debits against one account serialize, and sufficiency is re-checked at
//! write time.

use crate::store::traits::{AccountStore, DebitOutcome, LedgerStore};
use crate::types::{Account, EntryId, LedgerEntry, LedgerFilter, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Thread-safe in-memory account store
///
/// `DashMap` provides fine-grained per-entry locking: operations on
/// different accounts do not block each other, while operations on the
/// same account are serialized.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: DashMap<String, Account>,
}

impl MemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all accounts, in arbitrary order
    pub fn all(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get(&self, uid: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(uid).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, account: Account) -> Result<Account, StoreError> {
        self.accounts.insert(account.uid.clone(), account.clone());
        Ok(account)
    }

    async fn debit_if_sufficient(
        &self,
        uid: &str,
        amount: Decimal,
    ) -> Result<DebitOutcome, StoreError> {
        // The entry lock is held across check and write; a concurrent
        // debit on the same uid waits here and re-checks against the
        // updated balance.
        match self.accounts.get_mut(uid) {
            Some(mut entry) => {
                let account = entry.value_mut();
                if account.balance >= amount {
                    account.balance -= amount;
                    Ok(DebitOutcome::Applied(account.clone()))
                } else {
                    Ok(DebitOutcome::Insufficient {
                        available: account.balance,
                    })
                }
            }
            None => Ok(DebitOutcome::NotFound),
        }
    }

    async fn credit(&self, uid: &str, amount: Decimal) -> Result<Option<Account>, StoreError> {
        match self.accounts.get_mut(uid) {
            Some(mut entry) => {
                let account = entry.value_mut();
                account.balance = account.balance.checked_add(amount).ok_or_else(|| {
                    StoreError::unavailable(&format!("balance overflow for account {}", uid))
                })?;
                Ok(Some(account.clone()))
            }
            None => Ok(None),
        }
    }
}

#[derive(Debug, Default)]
struct LedgerInner {
    entries: Vec<LedgerEntry>,
    ids: HashSet<EntryId>,
}

/// Thread-safe in-memory ledger store
///
/// Entries live in a single insertion-ordered vector behind an async
/// `RwLock`; queries clone matches so readers never hold the lock past the
/// call. Duplicate entry ids are rejected at insert.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    inner: RwLock<LedgerInner>,
}

impl MemoryLedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries appended so far
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Whether no entries have been appended
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn insert(&self, entry: LedgerEntry) -> Result<LedgerEntry, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.ids.insert(entry.entry_id.clone()) {
            return Err(StoreError::conflict(&format!(
                "duplicate ledger entry id {}",
                entry.entry_id
            )));
        }
        inner.entries.push(entry.clone());
        Ok(entry)
    }

    async fn query(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LedgerKind;
    use std::sync::Arc;

    fn account(uid: &str, balance: Decimal) -> Account {
        Account::new(uid, "Test Student", balance).unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_account_returns_none() {
        let store = MemoryAccountStore::new();
        assert_eq!(store.get("04A1B2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let store = MemoryAccountStore::new();
        store
            .upsert(account("04A1B2", Decimal::new(50000, 2)))
            .await
            .unwrap();

        let fetched = store.get("04A1B2").await.unwrap().unwrap();
        assert_eq!(fetched.balance, Decimal::new(50000, 2));
        assert_eq!(fetched.name, "Test Student");
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_record() {
        let store = MemoryAccountStore::new();
        store
            .upsert(account("04A1B2", Decimal::new(1000, 2)))
            .await
            .unwrap();
        store
            .upsert(account("04A1B2", Decimal::new(2000, 2)))
            .await
            .unwrap();

        let fetched = store.get("04A1B2").await.unwrap().unwrap();
        assert_eq!(fetched.balance, Decimal::new(2000, 2));
        assert_eq!(store.all().len(), 1);
    }

    #[tokio::test]
    async fn test_debit_if_sufficient_applies() {
        let store = MemoryAccountStore::new();
        store
            .upsert(account("04A1B2", Decimal::new(10000, 2)))
            .await
            .unwrap();

        let outcome = store
            .debit_if_sufficient("04A1B2", Decimal::new(4500, 2))
            .await
            .unwrap();

        match outcome {
            DebitOutcome::Applied(updated) => {
                assert_eq!(updated.balance, Decimal::new(5500, 2));
            }
            other => panic!("expected Applied, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_debit_if_sufficient_rejects_when_short() {
        let store = MemoryAccountStore::new();
        store
            .upsert(account("04A1B2", Decimal::new(1000, 2)))
            .await
            .unwrap();

        let outcome = store
            .debit_if_sufficient("04A1B2", Decimal::new(5000, 2))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DebitOutcome::Insufficient {
                available: Decimal::new(1000, 2)
            }
        );

        // Re-read: balance unchanged.
        let fetched = store.get("04A1B2").await.unwrap().unwrap();
        assert_eq!(fetched.balance, Decimal::new(1000, 2));
    }

    #[tokio::test]
    async fn test_debit_exact_balance_to_zero() {
        let store = MemoryAccountStore::new();
        store
            .upsert(account("04A1B2", Decimal::new(5000, 2)))
            .await
            .unwrap();

        let outcome = store
            .debit_if_sufficient("04A1B2", Decimal::new(5000, 2))
            .await
            .unwrap();

        match outcome {
            DebitOutcome::Applied(updated) => assert_eq!(updated.balance, Decimal::ZERO),
            other => panic!("expected Applied, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_debit_unknown_uid() {
        let store = MemoryAccountStore::new();
        let outcome = store
            .debit_if_sufficient("ZZZ", Decimal::ONE)
            .await
            .unwrap();
        assert_eq!(outcome, DebitOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_credit_adds_to_balance() {
        let store = MemoryAccountStore::new();
        store
            .upsert(account("04A1B2", Decimal::new(1000, 2)))
            .await
            .unwrap();

        let updated = store
            .credit("04A1B2", Decimal::new(500, 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.balance, Decimal::new(1500, 2));
    }

    #[tokio::test]
    async fn test_credit_unknown_uid() {
        let store = MemoryAccountStore::new();
        let result = store.credit("ZZZ", Decimal::ONE).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_credit_overflow_is_a_store_fault() {
        let store = MemoryAccountStore::new();
        store.upsert(account("04A1B2", Decimal::MAX)).await.unwrap();

        let result = store.credit("04A1B2", Decimal::MAX).await;
        assert!(matches!(result, Err(StoreError::Unavailable { .. })));
    }

    // Concurrent access tests
    // These verify the conditional debit serializes check-and-write per
    // account: a pool of tasks draining one account can never overdraw it.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_debits_never_overdraw() {
        let store = Arc::new(MemoryAccountStore::new());
        store
            .upsert(account("04A1B2", Decimal::new(10000, 2))) // 100.00
            .await
            .unwrap();

        let mut handles = vec![];
        for _ in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .debit_if_sufficient("04A1B2", Decimal::new(6000, 2)) // 60.00
                    .await
                    .unwrap()
            }));
        }

        let mut applied = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                DebitOutcome::Applied(_) => applied += 1,
                DebitOutcome::Insufficient { .. } => rejected += 1,
                DebitOutcome::NotFound => panic!("account vanished"),
            }
        }

        // 100.00 covers exactly one 60.00 debit.
        assert_eq!(applied, 1);
        assert_eq!(rejected, 9);

        let final_balance = store.get("04A1B2").await.unwrap().unwrap().balance;
        assert_eq!(final_balance, Decimal::new(4000, 2));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_credits_all_apply() {
        let store = Arc::new(MemoryAccountStore::new());
        store.upsert(account("04A1B2", Decimal::ZERO)).await.unwrap();

        let mut handles = vec![];
        for _ in 0..100 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.credit("04A1B2", Decimal::new(100, 2)).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let final_balance = store.get("04A1B2").await.unwrap().unwrap().balance;
        assert_eq!(final_balance, Decimal::new(10000, 2));
    }

    #[tokio::test]
    async fn test_ledger_insert_and_query() {
        let store = MemoryLedgerStore::new();
        let entry = LedgerEntry::topup("04A1B2", Decimal::new(10000, 2), "Admin Reyes");
        store.insert(entry.clone()).await.unwrap();

        let all = store.query(&LedgerFilter::default()).await.unwrap();
        assert_eq!(all, vec![entry]);
    }

    #[tokio::test]
    async fn test_ledger_rejects_duplicate_entry_id() {
        let store = MemoryLedgerStore::new();
        let entry = LedgerEntry::topup("04A1B2", Decimal::new(10000, 2), "Admin Reyes");
        store.insert(entry.clone()).await.unwrap();

        let result = store.insert(entry).await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_ledger_query_filters_by_kind_and_account() {
        let store = MemoryLedgerStore::new();
        store
            .insert(LedgerEntry::topup("A1", Decimal::ONE, "Admin Reyes"))
            .await
            .unwrap();
        store
            .insert(LedgerEntry::purchase(
                "A1",
                Decimal::ONE,
                "North Canteen",
                vec![],
            ))
            .await
            .unwrap();
        store
            .insert(LedgerEntry::topup("B2", Decimal::ONE, "Admin Reyes"))
            .await
            .unwrap();

        let topups = store
            .query(&LedgerFilter {
                kind: Some(LedgerKind::Topup),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(topups.len(), 2);

        let for_a1 = store.query(&LedgerFilter::for_account("A1")).await.unwrap();
        assert_eq!(for_a1.len(), 2);
    }

    #[tokio::test]
    async fn test_ledger_query_preserves_insertion_order() {
        let store = MemoryLedgerStore::new();
        for i in 0..5 {
            store
                .insert(LedgerEntry::topup(
                    "A1",
                    Decimal::new(i + 1, 0),
                    "Admin Reyes",
                ))
                .await
                .unwrap();
        }

        let all = store.query(&LedgerFilter::default()).await.unwrap();
        let amounts: Vec<Decimal> = all.iter().map(|e| e.amount).collect();
        assert_eq!(
            amounts,
            (1..=5).map(|i| Decimal::new(i, 0)).collect::<Vec<_>>()
        );
    }
}
