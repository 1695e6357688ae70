//! Account types for the canteen balance engine
//!
//! This module defines the Account record and its validating constructor.
//! Accounts are created out-of-band (registration/import); the engine only
//! mutates `balance`, and only through the store's atomic primitives.

use crate::types::PosError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unique, immutable account identifier (card/badge id)
pub type AccountUid = String;

/// A person with a spendable balance
///
/// The invariant `balance >= 0` holds after every engine operation; the
/// validating constructor enforces it at creation time and the store's
/// conditional debit enforces it at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Card/badge id, unique and immutable
    pub uid: AccountUid,

    /// Display name, passed through unchanged on balance writes
    pub name: String,

    /// Spendable balance, two-decimal monetary semantics, never negative
    pub balance: Decimal,

    /// External asset reference for the account photo, untouched by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

impl Account {
    /// Create an account, rejecting malformed input at the boundary
    ///
    /// # Errors
    ///
    /// Returns `PosError::InvalidRecord` if the uid is empty or the
    /// opening balance is negative.
    pub fn new(uid: &str, name: &str, balance: Decimal) -> Result<Self, PosError> {
        if uid.trim().is_empty() {
            return Err(PosError::invalid_record("account uid must not be empty"));
        }
        if balance < Decimal::ZERO {
            return Err(PosError::invalid_record(
                "account balance must not be negative",
            ));
        }

        Ok(Account {
            uid: uid.trim().to_string(),
            name: name.to_string(),
            balance,
            picture_url: None,
        })
    }

    /// Attach a picture reference
    pub fn with_picture_url(mut self, url: &str) -> Self {
        self.picture_url = Some(url.to_string());
        self
    }
}
