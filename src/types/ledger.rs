//! Ledger types for the canteen balance engine
//!
//! The ledger is an append-only record of monetary events. Entries are
//! written once by the engine and never mutated or deleted; enrichment
//! (account display names) happens at query time, not by rewriting
//! entries.

use crate::types::{AccountUid, CartLine};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique ledger entry identifier, generated by the initiating side
pub type EntryId = String;

/// Kind of monetary event recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    /// A point-of-sale purchase debited from an account
    Purchase,

    /// An admin top-up credited to an account
    Topup,
}

/// An immutable record of one monetary event
///
/// `amount` is a positive magnitude for both kinds; direction is implied
/// by `kind`. `attribution` is the acting party's display name (vendor for
/// purchases, admin for top-ups), denormalized at write time and never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Collision-resistant id (UUIDv4), unique across the store
    pub entry_id: EntryId,

    /// Purchase or top-up
    pub kind: LedgerKind,

    /// Account this event applies to
    pub account_uid: AccountUid,

    /// Debited or credited magnitude, always positive
    pub amount: Decimal,

    /// Instant the entry was created
    pub timestamp: DateTime<Utc>,

    /// Acting party's display name, denormalized at write time
    pub attribution: String,

    /// Immutable copy of the cart for purchases; empty for top-ups
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<CartLine>,
}

impl LedgerEntry {
    /// Create a purchase entry with a fresh id and the current instant
    ///
    /// `items` is snapshotted by value; the live cart in the caller is not
    /// referenced after this call.
    pub fn purchase(
        account_uid: &str,
        amount: Decimal,
        attribution: &str,
        items: Vec<CartLine>,
    ) -> Self {
        LedgerEntry {
            entry_id: Uuid::new_v4().to_string(),
            kind: LedgerKind::Purchase,
            account_uid: account_uid.to_string(),
            amount,
            timestamp: Utc::now(),
            attribution: attribution.to_string(),
            items,
        }
    }

    /// Create a top-up entry with a fresh id and the current instant
    pub fn topup(account_uid: &str, amount: Decimal, attribution: &str) -> Self {
        LedgerEntry {
            entry_id: Uuid::new_v4().to_string(),
            kind: LedgerKind::Topup,
            account_uid: account_uid.to_string(),
            amount,
            timestamp: Utc::now(),
            attribution: attribution.to_string(),
            items: Vec::new(),
        }
    }
}

/// Store-level ledger filter
///
/// All criteria are conjunctive; `None` means "match any". The store
/// returns matches in insertion order, leaving sorting to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerFilter {
    /// Restrict to one entry kind
    pub kind: Option<LedgerKind>,

    /// Restrict to one account
    pub account_uid: Option<AccountUid>,

    /// Only entries at or after this instant
    pub since: Option<DateTime<Utc>>,
}

impl LedgerFilter {
    /// Filter matching all entries for one account
    pub fn for_account(uid: &str) -> Self {
        LedgerFilter {
            account_uid: Some(uid.to_string()),
            ..Default::default()
        }
    }

    /// Whether an entry satisfies every criterion of this filter
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        if let Some(uid) = &self.account_uid {
            if &entry.account_uid != uid {
                return false;
            }
        }
        if let Some(since) = self.since {
            if entry.timestamp < since {
                return false;
            }
        }
        true
    }
}

/// Caller-facing ledger query
///
/// Unlike [`LedgerFilter`], `text_search` needs the account display name,
/// so the engine resolves it with a per-call lookup cache rather than
/// pushing it down to the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerQuery {
    /// Restrict to one entry kind
    pub kind: Option<LedgerKind>,

    /// Only entries at or after this instant
    pub since: Option<DateTime<Utc>>,

    /// Case-insensitive match against account uid or display name
    pub text_search: Option<String>,
}

/// A ledger entry enriched with the account display name at query time
///
/// `account_name` falls back to `"Unknown"` when the uid no longer
/// resolves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRecord {
    /// The underlying immutable entry
    pub entry: LedgerEntry,

    /// Display name resolved at query time
    pub account_name: String,
}

/// Calendar period for sales summaries
///
/// Weeks start on Sunday, matching the admin dashboard's reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesPeriod {
    /// The current calendar day
    Day,

    /// The current week, Sunday through Saturday
    Week,

    /// The current calendar month
    Month,
}

impl SalesPeriod {
    /// Half-open `[start, end)` bounds of the period containing `now`
    ///
    /// Pure over the supplied instant so callers and tests control the
    /// clock.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let day_start = today.and_time(NaiveTime::MIN).and_utc();

        match self {
            SalesPeriod::Day => (day_start, day_start + Duration::days(1)),
            SalesPeriod::Week => {
                let start =
                    day_start - Duration::days(i64::from(now.weekday().num_days_from_sunday()));
                (start, start + Duration::days(7))
            }
            SalesPeriod::Month => {
                // Day 1 exists in every month; fall back to today defensively
                // rather than panicking on a hypothetical calendar bug.
                let first = today.with_day(1).unwrap_or(today);
                let next_month = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                }
                .unwrap_or(today);

                (
                    first.and_time(NaiveTime::MIN).and_utc(),
                    next_month.and_time(NaiveTime::MIN).and_utc(),
                )
            }
        }
    }
}
