//! Core data types for the canteen balance engine
//!
//! # Components
//!
//! - `account` - Account record and uid alias
//! - `cart` - Cart line items and checked cart math
//! - `ledger` - Ledger entries, filters, queries, sales periods
//! - `identity` - Caller identity (role + display name)
//! - `error` - Caller-facing and store-adapter error types

pub mod account;
pub mod cart;
pub mod error;
pub mod identity;
pub mod ledger;

pub use account::{Account, AccountUid};
pub use cart::{cart_total, CartLine};
pub use error::{PosError, StoreError};
pub use identity::{CallerIdentity, Role};
pub use ledger::{
    EntryId, LedgerEntry, LedgerFilter, LedgerKind, LedgerQuery, LedgerRecord, SalesPeriod,
};
